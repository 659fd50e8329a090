//! # ETL Metrics Testing Utils
//!
//! In-memory doubles for the job catalog and metric sink ports, plus
//! builders for job runs.
//!
//! ```toml
//! [dev-dependencies]
//! etl-metrics-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use mocks::*;
