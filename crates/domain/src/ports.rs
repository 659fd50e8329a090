pub mod job_catalog;
pub mod metric_sink;

pub use job_catalog::JobCatalog;
pub use metric_sink::MetricSink;
