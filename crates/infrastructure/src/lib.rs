pub mod http;
pub mod observability;

pub use http::{HttpJobCatalog, HttpMetricSink};
pub use observability::{init_logging, init_metrics, PublisherMetrics, StructuredLogger};
