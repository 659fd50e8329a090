use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("获取作业列表失败: {0}")]
    JobListing(String),
    #[error("获取作业 '{job_name}' 运行历史失败: {message}")]
    RunHistoryFetch { job_name: String, message: String },
    #[error("发布作业 '{job_name}' (运行ID: {run_id}) 的指标失败: {message}")]
    MetricSubmission {
        job_name: String,
        run_id: String,
        message: String,
    },
    #[error("重复的指标名称: {0}")]
    DuplicateMetric(String),
    #[error("指标批次过大: {size} 条记录，上限 {limit}")]
    BatchTooLarge { size: usize, limit: usize },
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;

impl MetricsError {
    pub fn job_listing<S: Into<String>>(msg: S) -> Self {
        Self::JobListing(msg.into())
    }
    pub fn history_fetch<J: Into<String>, S: Into<String>>(job_name: J, msg: S) -> Self {
        Self::RunHistoryFetch {
            job_name: job_name.into(),
            message: msg.into(),
        }
    }
    pub fn submission<J, R, S>(job_name: J, run_id: R, msg: S) -> Self
    where
        J: Into<String>,
        R: Into<String>,
        S: Into<String>,
    {
        Self::MetricSubmission {
            job_name: job_name.into(),
            run_id: run_id.into(),
            message: msg.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MetricsError::JobListing(_)
                | MetricsError::Configuration(_)
                | MetricsError::Internal(_)
        )
    }
    /// 仅用于诊断输出，本系统自身从不重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MetricsError::RunHistoryFetch { .. }
                | MetricsError::MetricSubmission { .. }
        )
    }
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for MetricsError {
    fn from(err: anyhow::Error) -> Self {
        MetricsError::Internal(err.to_string())
    }
}
