use async_trait::async_trait;

use crate::value_objects::MetricRecord;
use etl_metrics_errors::MetricsResult;

/// Interface for the metrics ingestion backend
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Submits one batch in a single call, so consumers never see a partial batch.
    async fn put_metric_data(&self, namespace: &str, records: &[MetricRecord])
        -> MetricsResult<()>;
}
