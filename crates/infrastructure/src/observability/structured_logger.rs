//! Structured log events emitted during a publishing invocation

use tracing::{debug, error, info, warn};

/// Structured logging utilities
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_invocation_start(invocation_id: &str, namespace: &str) {
        info!(
            event = "invocation_start",
            invocation.id = invocation_id,
            metrics.namespace = namespace,
            "Metrics invocation started"
        );
    }

    pub fn log_jobs_discovered(invocation_id: &str, job_count: usize) {
        info!(
            event = "jobs_discovered",
            invocation.id = invocation_id,
            jobs.count = job_count,
            "Job listing complete"
        );
    }

    pub fn log_history_fetched(job_name: &str, run_count: usize, eligible_runs: usize) {
        debug!(
            event = "history_fetched",
            job.name = job_name,
            job.run_count = run_count,
            job.eligible_runs = eligible_runs,
            "Run history fetched"
        );
    }

    pub fn log_history_fetch_failed(job_name: &str, error: &str) {
        warn!(
            event = "history_fetch_failed",
            job.name = job_name,
            error = error,
            "Run history unavailable, job skipped"
        );
    }

    pub fn log_batch_published(job_name: &str, run_id: &str, record_count: usize) {
        debug!(
            event = "batch_published",
            job.name = job_name,
            job_run.id = run_id,
            batch.records = record_count,
            "Metric batch published"
        );
    }

    pub fn log_batch_failed(job_name: &str, run_id: &str, error: &str) {
        error!(
            event = "batch_failed",
            job.name = job_name,
            job_run.id = run_id,
            error = error,
            "Metric batch failed"
        );
    }

    pub fn log_invocation_complete(
        invocation_id: &str,
        jobs: usize,
        batches: usize,
        failures: usize,
        duration_ms: u64,
    ) {
        if failures == 0 {
            info!(
                event = "invocation_complete",
                invocation.id = invocation_id,
                invocation.jobs = jobs,
                invocation.batches = batches,
                invocation.duration_ms = duration_ms,
                "Metrics invocation completed"
            );
        } else {
            warn!(
                event = "invocation_complete",
                invocation.id = invocation_id,
                invocation.jobs = jobs,
                invocation.batches = batches,
                invocation.failures = failures,
                invocation.duration_ms = duration_ms,
                "Metrics invocation completed with failures"
            );
        }
    }

    pub fn log_invocation_aborted(invocation_id: &str, error: &str) {
        error!(
            event = "invocation_aborted",
            invocation.id = invocation_id,
            error = error,
            "Metrics invocation aborted"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_logging_does_not_panic_without_subscriber() {
        StructuredLogger::log_invocation_start("inv-1", "Broadcom/AwsCustomMetric");
        StructuredLogger::log_jobs_discovered("inv-1", 3);
        StructuredLogger::log_history_fetched("etl-daily", 3, 2);
        StructuredLogger::log_history_fetch_failed("broken", "HTTP 500");
        StructuredLogger::log_batch_published("etl-daily", "ALL", 7);
        StructuredLogger::log_batch_failed("etl-daily", "jr_1", "HTTP 400");
        StructuredLogger::log_invocation_complete("inv-1", 3, 4, 0, 120);
        StructuredLogger::log_invocation_complete("inv-1", 3, 4, 1, 120);
        StructuredLogger::log_invocation_aborted("inv-2", "listing failed");
    }
}
