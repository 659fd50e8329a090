use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::report::{FailureStage, InvocationFailure, InvocationReport};
use etl_metrics_config::{models::DEFAULT_METRIC_NAMESPACE, AppConfig};
use etl_metrics_domain::entities::RunHistory;
use etl_metrics_domain::ports::{JobCatalog, MetricSink};
use etl_metrics_domain::services::{EligibilityFilter, MetricAssembler, RunAggregator};
use etl_metrics_domain::value_objects::{MetricRecord, JOB_RUN_ID_ALL};
use etl_metrics_errors::{MetricsError, MetricsResult};
use etl_metrics_infrastructure::{PublisherMetrics, StructuredLogger};

#[derive(Debug, Clone, PartialEq)]
pub struct PublisherSettings {
    pub namespace: String,
    pub eligibility_window_seconds: i64,
    pub max_concurrent_jobs: usize,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_METRIC_NAMESPACE.to_string(),
            eligibility_window_seconds: etl_metrics_domain::DEFAULT_ELIGIBILITY_WINDOW_SECONDS,
            max_concurrent_jobs: 4,
        }
    }
}

impl From<&AppConfig> for PublisherSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            namespace: config.ingestion.namespace.clone(),
            eligibility_window_seconds: config.collector.eligibility_window_seconds,
            max_concurrent_jobs: config.collector.max_concurrent_jobs,
        }
    }
}

/// 单个作业的处理结果，在所有作业完成后合并进报告
#[derive(Debug, Default)]
struct JobOutcome {
    job_batches: usize,
    run_batches: usize,
    records: usize,
    failures: Vec<InvocationFailure>,
}

/// 一次调用内的编排器：列出作业，为每个作业发布作业级批次和当前运行批次
pub struct MetricsPublisher {
    catalog: Arc<dyn JobCatalog>,
    sink: Arc<dyn MetricSink>,
    settings: PublisherSettings,
    aggregator: RunAggregator,
    filter: EligibilityFilter,
    assembler: MetricAssembler,
    metrics: PublisherMetrics,
}

impl MetricsPublisher {
    pub fn new(
        catalog: Arc<dyn JobCatalog>,
        sink: Arc<dyn MetricSink>,
        settings: PublisherSettings,
    ) -> Self {
        Self {
            catalog,
            sink,
            filter: EligibilityFilter::new(settings.eligibility_window_seconds),
            settings,
            aggregator: RunAggregator::new(),
            assembler: MetricAssembler::default(),
            metrics: PublisherMetrics::new(),
        }
    }

    pub fn settings(&self) -> &PublisherSettings {
        &self.settings
    }

    pub async fn run_once(&self) -> MetricsResult<InvocationReport> {
        self.run_at(Utc::now()).await
    }

    /// 以 `now` 作为时间窗口参考点和指标时间戳执行一次调用
    ///
    /// 只有作业列表失败会中止调用；单个作业的失败记录在报告中。
    #[instrument(skip(self), fields(namespace = %self.settings.namespace))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> MetricsResult<InvocationReport> {
        let timer = Instant::now();
        let invocation_id = Uuid::new_v4();
        let invocation = invocation_id.to_string();
        let mut report = InvocationReport::new(invocation_id, Utc::now());

        StructuredLogger::log_invocation_start(&invocation, &self.settings.namespace);

        let job_names = match self.list_all_job_names().await {
            Ok(job_names) => job_names,
            Err(e) => {
                StructuredLogger::log_invocation_aborted(&invocation, &e.to_string());
                return Err(e);
            }
        };
        report.jobs_discovered = job_names.len();
        StructuredLogger::log_jobs_discovered(&invocation, job_names.len());

        let max_concurrent = self.settings.max_concurrent_jobs.max(1);
        let outcomes: Vec<JobOutcome> = stream::iter(job_names)
            .map(|job_name| self.process_job(job_name, now))
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

        for outcome in outcomes {
            report.job_batches_published += outcome.job_batches;
            report.run_batches_published += outcome.run_batches;
            report.records_published += outcome.records;
            report.failures.extend(outcome.failures);
        }
        report.finish(Utc::now());

        let elapsed = timer.elapsed();
        self.metrics
            .record_invocation_duration(elapsed.as_secs_f64());
        StructuredLogger::log_invocation_complete(
            &invocation,
            report.jobs_discovered,
            report.batches_published(),
            report.failures.len(),
            elapsed.as_millis() as u64,
        );

        Ok(report)
    }

    /// 跟随 next_token 翻页，直到取完所有作业名
    pub async fn list_all_job_names(&self) -> MetricsResult<Vec<String>> {
        let mut job_names = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = self.catalog.list_jobs(next_token.as_deref()).await?;
            pages += 1;
            job_names.extend(page.job_names);

            match page.next_token {
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    return Err(MetricsError::job_listing(format!(
                        "分页令牌重复: {token}"
                    )));
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(jobs = job_names.len(), pages, "Job listing finished");
        Ok(job_names)
    }

    async fn process_job(&self, job_name: String, now: DateTime<Utc>) -> JobOutcome {
        let mut outcome = JobOutcome::default();

        // 运行历史只获取一次，作业级和运行级指标共用
        let runs = match self.catalog.get_job_runs(&job_name).await {
            Ok(runs) => runs,
            Err(e) => {
                let message = e.to_string();
                self.metrics.record_history_fetch_failure();
                StructuredLogger::log_history_fetch_failed(&job_name, &message);
                outcome.failures.push(InvocationFailure::new(
                    FailureStage::HistoryFetch,
                    &job_name,
                    None,
                    message,
                ));
                return outcome;
            }
        };
        let history = RunHistory::new(job_name.clone(), runs);
        let eligible = self.filter.select(history.runs(), now);
        StructuredLogger::log_history_fetched(&job_name, history.len(), eligible.len());

        let job_batch = self.aggregator.aggregate_job(&history).map(|aggregate| {
            self.assembler.assemble(
                &job_name,
                &aggregate.metrics,
                JOB_RUN_ID_ALL,
                aggregate.latest_error_message.as_deref(),
                now,
            )
        });
        match self
            .publish_batch(&job_name, JOB_RUN_ID_ALL, FailureStage::JobBatch, job_batch)
            .await
        {
            Ok(records) => {
                outcome.job_batches += 1;
                outcome.records += records;
            }
            Err(failure) => outcome.failures.push(failure),
        }

        for run in eligible {
            let run_batch = self.aggregator.aggregate_run(run).map(|metrics| {
                self.assembler.assemble(
                    &job_name,
                    &metrics,
                    &run.id,
                    run.error_message.as_deref(),
                    now,
                )
            });
            match self
                .publish_batch(&job_name, &run.id, FailureStage::RunBatch, run_batch)
                .await
            {
                Ok(records) => {
                    outcome.run_batches += 1;
                    outcome.records += records;
                }
                Err(failure) => outcome.failures.push(failure),
            }
        }

        self.metrics.record_job_processed();
        outcome
    }

    async fn publish_batch(
        &self,
        job_name: &str,
        run_id: &str,
        stage: FailureStage,
        batch: MetricsResult<Vec<MetricRecord>>,
    ) -> Result<usize, InvocationFailure> {
        let result = match batch {
            Ok(records) => self
                .sink
                .put_metric_data(&self.settings.namespace, &records)
                .await
                .map(|()| records.len()),
            Err(e) => Err(e),
        };

        match result {
            Ok(count) => {
                self.metrics.record_batch_published();
                StructuredLogger::log_batch_published(job_name, run_id, count);
                Ok(count)
            }
            Err(e) => {
                let message = e.to_string();
                self.metrics.record_batch_failure();
                StructuredLogger::log_batch_failed(job_name, run_id, &message);
                Err(InvocationFailure::new(stage, job_name, Some(run_id), message))
            }
        }
    }
}
