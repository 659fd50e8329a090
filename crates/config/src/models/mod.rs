pub mod app_config;
pub mod collector;
pub mod endpoints;
pub mod logging;
pub mod observability;

pub use app_config::*;
pub use collector::*;
pub use endpoints::*;
pub use logging::*;
pub use observability::*;
