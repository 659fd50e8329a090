use metrics::{counter, histogram, Counter, Histogram};

/// Health metrics of the publisher itself, exported through the global
/// `metrics` recorder when one is installed
pub struct PublisherMetrics {
    batches_published_total: Counter,
    batch_failures_total: Counter,
    history_fetch_failures_total: Counter,
    jobs_processed_total: Counter,
    invocation_duration: Histogram,
}

impl Default for PublisherMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PublisherMetrics {
    pub fn new() -> Self {
        Self {
            batches_published_total: counter!("etl_metrics_batches_published_total"),
            batch_failures_total: counter!("etl_metrics_batch_failures_total"),
            history_fetch_failures_total: counter!("etl_metrics_history_fetch_failures_total"),
            jobs_processed_total: counter!("etl_metrics_jobs_processed_total"),
            invocation_duration: histogram!("etl_metrics_invocation_duration_seconds"),
        }
    }

    pub fn record_batch_published(&self) {
        self.batches_published_total.increment(1);
    }

    pub fn record_batch_failure(&self) {
        self.batch_failures_total.increment(1);
    }

    pub fn record_history_fetch_failure(&self) {
        self.history_fetch_failures_total.increment(1);
    }

    pub fn record_job_processed(&self) {
        self.jobs_processed_total.increment(1);
    }

    pub fn record_invocation_duration(&self, duration_seconds: f64) {
        self.invocation_duration.record(duration_seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = PublisherMetrics::new();
        metrics.record_batch_published();
        metrics.record_batch_failure();
        metrics.record_history_fetch_failure();
        metrics.record_job_processed();
        metrics.record_invocation_duration(0.25);
    }
}
