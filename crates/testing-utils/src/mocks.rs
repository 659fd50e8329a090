//! In-memory implementations of the job catalog and metric sink ports
//!
//! Both mocks are cheap to clone and share state between clones, so a test
//! can hand one copy to the publisher and inspect the other afterwards.

use async_trait::async_trait;
use etl_metrics_domain::entities::{JobPage, JobRun};
use etl_metrics_domain::ports::{JobCatalog, MetricSink};
use etl_metrics_domain::value_objects::{MetricRecord, DIMENSION_JOB_NAME, DIMENSION_JOB_RUN_ID};
use etl_metrics_errors::{MetricsError, MetricsResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

const PAGE_TOKEN_PREFIX: &str = "page-";

/// Mock implementation of JobCatalog for testing
///
/// Job names are served in the pages they were registered with; the
/// continuation token for page `n` is `page-n`.
#[derive(Debug, Clone, Default)]
pub struct MockJobCatalog {
    pages: Arc<Mutex<Vec<Vec<String>>>>,
    runs: Arc<Mutex<HashMap<String, Vec<JobRun>>>>,
    failing_histories: Arc<Mutex<HashSet<String>>>,
    listing_error: Arc<Mutex<Option<String>>>,
    cycling_pages: Arc<Mutex<bool>>,
    list_calls: Arc<Mutex<Vec<Option<String>>>>,
    history_calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockJobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job with its history and appends it to the last page
    pub fn with_job(self, job_name: &str, runs: Vec<JobRun>) -> Self {
        {
            let mut pages = self.pages.lock().unwrap();
            match pages.last_mut() {
                Some(page) => page.push(job_name.to_string()),
                None => pages.push(vec![job_name.to_string()]),
            }
        }
        self.runs
            .lock()
            .unwrap()
            .insert(job_name.to_string(), runs);
        self
    }

    /// Starts a new page; later `with_job` calls land on it
    pub fn with_page_break(self) -> Self {
        self.pages.lock().unwrap().push(Vec::new());
        self
    }

    /// Makes the history fetch for `job_name` fail
    pub fn with_failing_history(self, job_name: &str) -> Self {
        self.failing_histories
            .lock()
            .unwrap()
            .insert(job_name.to_string());
        self
    }

    /// Makes every listing call fail
    pub fn with_listing_error(self, message: &str) -> Self {
        *self.listing_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// The last page points back to `page-1` instead of ending the listing
    pub fn with_cycling_pages(self) -> Self {
        *self.cycling_pages.lock().unwrap() = true;
        self
    }

    /// Tokens passed to `list_jobs`, in call order
    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn history_calls(&self, job_name: &str) -> usize {
        self.history_calls
            .lock()
            .unwrap()
            .get(job_name)
            .copied()
            .unwrap_or(0)
    }

    fn page_index(token: Option<&str>) -> MetricsResult<usize> {
        match token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix(PAGE_TOKEN_PREFIX)
                .and_then(|index| index.parse().ok())
                .ok_or_else(|| MetricsError::job_listing(format!("invalid next token: {token}"))),
        }
    }
}

#[async_trait]
impl JobCatalog for MockJobCatalog {
    async fn list_jobs(&self, next_token: Option<&str>) -> MetricsResult<JobPage> {
        self.list_calls
            .lock()
            .unwrap()
            .push(next_token.map(str::to_string));

        if let Some(message) = self.listing_error.lock().unwrap().clone() {
            return Err(MetricsError::job_listing(message));
        }

        let index = Self::page_index(next_token)?;
        let pages = self.pages.lock().unwrap();
        let job_names = pages.get(index).cloned().unwrap_or_default();
        let next_token = if index + 1 < pages.len() {
            Some(format!("{PAGE_TOKEN_PREFIX}{}", index + 1))
        } else if *self.cycling_pages.lock().unwrap() && pages.len() > 1 {
            Some(format!("{PAGE_TOKEN_PREFIX}1"))
        } else {
            None
        };

        Ok(JobPage {
            job_names,
            next_token,
        })
    }

    async fn get_job_runs(&self, job_name: &str) -> MetricsResult<Vec<JobRun>> {
        *self
            .history_calls
            .lock()
            .unwrap()
            .entry(job_name.to_string())
            .or_insert(0) += 1;

        if self.failing_histories.lock().unwrap().contains(job_name) {
            return Err(MetricsError::history_fetch(job_name, "mock history failure"));
        }

        Ok(self
            .runs
            .lock()
            .unwrap()
            .get(job_name)
            .cloned()
            .unwrap_or_default())
    }
}

/// A batch accepted by [`MockMetricSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBatch {
    pub namespace: String,
    pub records: Vec<MetricRecord>,
}

impl RecordedBatch {
    pub fn job_name(&self) -> Option<&str> {
        self.records
            .first()
            .and_then(|record| record.dimension(DIMENSION_JOB_NAME))
    }

    pub fn run_id(&self) -> Option<&str> {
        self.records
            .first()
            .and_then(|record| record.dimension(DIMENSION_JOB_RUN_ID))
    }
}

/// Mock implementation of MetricSink for testing
///
/// Batches are matched against the failure list by the `JobName` and
/// `JobRunId` dimensions of their first record.
#[derive(Debug, Clone, Default)]
pub struct MockMetricSink {
    batches: Arc<Mutex<Vec<RecordedBatch>>>,
    failures: Arc<Mutex<HashSet<(String, String)>>>,
}

impl MockMetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every batch for the given job and run id
    pub fn with_failure(self, job_name: &str, run_id: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((job_name.to_string(), run_id.to_string()));
        self
    }

    pub fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batches_for(&self, job_name: &str) -> Vec<RecordedBatch> {
        self.batches()
            .into_iter()
            .filter(|batch| batch.job_name() == Some(job_name))
            .collect()
    }

    pub fn batch(&self, job_name: &str, run_id: &str) -> Option<RecordedBatch> {
        self.batches()
            .into_iter()
            .find(|batch| batch.job_name() == Some(job_name) && batch.run_id() == Some(run_id))
    }

    pub fn total_records(&self) -> usize {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|batch| batch.records.len())
            .sum()
    }

    pub fn clear(&self) {
        self.batches.lock().unwrap().clear();
    }
}

#[async_trait]
impl MetricSink for MockMetricSink {
    async fn put_metric_data(
        &self,
        namespace: &str,
        records: &[MetricRecord],
    ) -> MetricsResult<()> {
        let batch = RecordedBatch {
            namespace: namespace.to_string(),
            records: records.to_vec(),
        };

        let job_name = batch.job_name().unwrap_or_default().to_string();
        let run_id = batch.run_id().unwrap_or_default().to_string();
        if self
            .failures
            .lock()
            .unwrap()
            .contains(&(job_name.clone(), run_id.clone()))
        {
            return Err(MetricsError::submission(
                job_name,
                run_id,
                "mock ingestion failure",
            ));
        }

        self.batches.lock().unwrap().push(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::JobRunBuilder;

    #[tokio::test]
    async fn test_catalog_pagination() {
        let catalog = MockJobCatalog::new()
            .with_job("a", vec![])
            .with_job("b", vec![])
            .with_page_break()
            .with_job("c", vec![]);

        let first = catalog.list_jobs(None).await.unwrap();
        assert_eq!(first.job_names, vec!["a", "b"]);
        assert_eq!(first.next_token.as_deref(), Some("page-1"));

        let second = catalog.list_jobs(first.next_token.as_deref()).await.unwrap();
        assert_eq!(second.job_names, vec!["c"]);
        assert!(second.next_token.is_none());
        assert_eq!(catalog.list_calls(), vec![None, Some("page-1".to_string())]);
    }

    #[tokio::test]
    async fn test_catalog_history_failure_and_counts() {
        let catalog = MockJobCatalog::new()
            .with_job("ok", vec![JobRunBuilder::new("jr_1").build()])
            .with_job("broken", vec![])
            .with_failing_history("broken");

        assert_eq!(catalog.get_job_runs("ok").await.unwrap().len(), 1);
        assert!(catalog.get_job_runs("broken").await.is_err());
        assert_eq!(catalog.history_calls("ok"), 1);
        assert_eq!(catalog.history_calls("broken"), 1);
        assert_eq!(catalog.history_calls("absent"), 0);
    }

    #[tokio::test]
    async fn test_sink_records_and_fails() {
        use etl_metrics_domain::services::MetricAssembler;
        use etl_metrics_domain::value_objects::{MetricName, MetricSet, MetricUnit};

        let metrics = MetricSet::new()
            .with(MetricName::RunErrorState, 0.0, MetricUnit::None)
            .unwrap();
        let assembler = MetricAssembler::default();
        let sink = MockMetricSink::new().with_failure("job", "jr_bad");

        let good = assembler.assemble_now("job", &metrics, "jr_good", None);
        let bad = assembler.assemble_now("job", &metrics, "jr_bad", None);

        sink.put_metric_data("ns", &good).await.unwrap();
        let err = sink.put_metric_data("ns", &bad).await.unwrap_err();
        assert!(matches!(err, MetricsError::MetricSubmission { .. }));

        assert_eq!(sink.batches().len(), 1);
        assert!(sink.batch("job", "jr_good").is_some());
        assert!(sink.batch("job", "jr_bad").is_none());
        assert_eq!(sink.total_records(), 1);
    }
}
