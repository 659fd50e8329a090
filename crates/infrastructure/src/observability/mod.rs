//! Observability module
//!
//! Logging bootstrap, the Prometheus exporter for the publisher's own
//! health metrics, and structured log events.

pub mod metrics_collector;
pub mod structured_logger;
pub mod telemetry_setup;

pub use metrics_collector::PublisherMetrics;
pub use structured_logger::StructuredLogger;
pub use telemetry_setup::{init_logging, init_metrics};
