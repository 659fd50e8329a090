use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 作业运行的生命周期状态
///
/// 状态码顺序是对外契约（仪表盘按状态码取值），任何时候都不能重新编号。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobRunState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Succeeded,
    Failed,
    Timeout,
    Error,
    Waiting,
    Expired,
    /// 编排服务返回的未知状态，原样保留
    Unrecognized(String),
}

/// 未识别状态对应的状态码
pub const UNKNOWN_STATE_CODE: i32 = -1;

impl JobRunState {
    pub fn from_label(label: &str) -> Self {
        match label {
            "STARTING" => JobRunState::Starting,
            "RUNNING" => JobRunState::Running,
            "STOPPING" => JobRunState::Stopping,
            "STOPPED" => JobRunState::Stopped,
            "SUCCEEDED" => JobRunState::Succeeded,
            "FAILED" => JobRunState::Failed,
            "TIMEOUT" => JobRunState::Timeout,
            "ERROR" => JobRunState::Error,
            "WAITING" => JobRunState::Waiting,
            "EXPIRED" => JobRunState::Expired,
            other => JobRunState::Unrecognized(other.to_string()),
        }
    }

    pub fn as_label(&self) -> &str {
        match self {
            JobRunState::Starting => "STARTING",
            JobRunState::Running => "RUNNING",
            JobRunState::Stopping => "STOPPING",
            JobRunState::Stopped => "STOPPED",
            JobRunState::Succeeded => "SUCCEEDED",
            JobRunState::Failed => "FAILED",
            JobRunState::Timeout => "TIMEOUT",
            JobRunState::Error => "ERROR",
            JobRunState::Waiting => "WAITING",
            JobRunState::Expired => "EXPIRED",
            JobRunState::Unrecognized(label) => label,
        }
    }

    /// 状态码: STARTING=0 ... EXPIRED=9，未知状态为 -1
    pub fn code(&self) -> i32 {
        match self {
            JobRunState::Starting => 0,
            JobRunState::Running => 1,
            JobRunState::Stopping => 2,
            JobRunState::Stopped => 3,
            JobRunState::Succeeded => 4,
            JobRunState::Failed => 5,
            JobRunState::Timeout => 6,
            JobRunState::Error => 7,
            JobRunState::Waiting => 8,
            JobRunState::Expired => 9,
            JobRunState::Unrecognized(_) => UNKNOWN_STATE_CODE,
        }
    }

    /// 仅 STARTING、RUNNING、STOPPING、WAITING 视为活跃
    pub fn is_active(&self) -> bool {
        matches!(self.code(), 0 | 1 | 2 | 8)
    }
}

impl From<String> for JobRunState {
    fn from(label: String) -> Self {
        JobRunState::from_label(&label)
    }
}

impl From<JobRunState> for String {
    fn from(state: JobRunState) -> Self {
        match state {
            JobRunState::Unrecognized(label) => label,
            known => known.as_label().to_string(),
        }
    }
}

impl std::fmt::Display for JobRunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// 按原始状态字符串计算状态码
pub fn state_code(label: &str) -> i32 {
    JobRunState::from_label(label).code()
}

/// 按原始状态字符串判断运行是否活跃
pub fn is_active_state(label: &str) -> bool {
    JobRunState::from_label(label).is_active()
}

/// 作业的一次执行记录，由编排服务提供，本系统只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    pub id: String,
    #[serde(rename = "job_run_state")]
    pub state: JobRunState,
    pub started_on: DateTime<Utc>,
    #[serde(default)]
    pub completed_on: Option<DateTime<Utc>>,
    /// 执行时长（秒）
    #[serde(default)]
    pub execution_time: i64,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobRun {
    /// 是否发生过错误，只由错误信息是否存在决定
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn entity_description(&self) -> String {
        format!("作业运行 (ID: {}, 状态: {})", self.id, self.state)
    }
}

/// 单个作业的运行历史，保证索引 0 为最近一次运行
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    job_name: String,
    runs: Vec<JobRun>,
}

impl RunHistory {
    /// 构造时按开始时间降序排序（稳定排序），不信任编排服务的返回顺序
    pub fn new(job_name: impl Into<String>, mut runs: Vec<JobRun>) -> Self {
        let job_name = job_name.into();
        let ordered = runs
            .windows(2)
            .all(|pair| pair[0].started_on >= pair[1].started_on);
        if !ordered {
            tracing::warn!(
                job.name = %job_name,
                run.count = runs.len(),
                "Run history is not ordered most-recent-first, reordering by start time"
            );
            runs.sort_by(|a, b| b.started_on.cmp(&a.started_on));
        }
        Self { job_name, runs }
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn runs(&self) -> &[JobRun] {
        &self.runs
    }

    pub fn latest(&self) -> Option<&JobRun> {
        self.runs.first()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// 作业列表分页结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPage {
    pub job_names: Vec<String>,
    #[serde(default)]
    pub next_token: Option<String>,
}
