use async_trait::async_trait;

use crate::entities::{JobPage, JobRun};
use etl_metrics_errors::MetricsResult;

/// Interface for the job orchestration service
#[async_trait]
pub trait JobCatalog: Send + Sync {
    /// One page of job names; `next_token` is `None` for the first page.
    async fn list_jobs(&self, next_token: Option<&str>) -> MetricsResult<JobPage>;

    /// Complete run history of one job, most recent first.
    async fn get_job_runs(&self, job_name: &str) -> MetricsResult<Vec<JobRun>>;
}
