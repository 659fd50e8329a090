use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 失败发生的阶段，排序顺序即处理顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    HistoryFetch,
    JobBatch,
    RunBatch,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::HistoryFetch => write!(f, "history_fetch"),
            FailureStage::JobBatch => write!(f, "job_batch"),
            FailureStage::RunBatch => write!(f, "run_batch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationFailure {
    pub stage: FailureStage,
    pub job_name: String,
    /// 作业级批次为 "ALL"，运行历史获取失败时为空
    pub run_id: Option<String>,
    pub message: String,
}

impl InvocationFailure {
    pub fn new(
        stage: FailureStage,
        job_name: impl Into<String>,
        run_id: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            job_name: job_name.into(),
            run_id: run_id.map(str::to_string),
            message: message.into(),
        }
    }

    fn sort_key(&self) -> (&str, FailureStage, Option<&str>) {
        (self.job_name.as_str(), self.stage, self.run_id.as_deref())
    }
}

/// 单次调用的汇总结果
///
/// 失败按 (job_name, stage, run_id) 排序，与作业并发完成的先后无关。
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub invocation_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub jobs_discovered: usize,
    pub job_batches_published: usize,
    pub run_batches_published: usize,
    pub records_published: usize,
    pub failures: Vec<InvocationFailure>,
}

impl InvocationReport {
    pub fn new(invocation_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            invocation_id,
            started_at,
            finished_at: started_at,
            jobs_discovered: 0,
            job_batches_published: 0,
            run_batches_published: 0,
            records_published: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn batches_published(&self) -> usize {
        self.job_batches_published + self.run_batches_published
    }

    pub fn failures_for(&self, job_name: &str) -> Vec<&InvocationFailure> {
        self.failures
            .iter()
            .filter(|failure| failure.job_name == job_name)
            .collect()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub(crate) fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.failures
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.finished_at = finished_at;
    }
}
