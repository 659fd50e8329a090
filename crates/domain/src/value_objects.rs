use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use etl_metrics_errors::{MetricsError, MetricsResult};

/// namespace 维度的固定取值
pub const NAMESPACE_DIMENSION_VALUE: &str = "Glue";
/// 作业级聚合指标使用的 JobRunId 维度值
pub const JOB_RUN_ID_ALL: &str = "ALL";
/// 没有错误信息时 Error Message 维度的取值
pub const NO_ERROR_SENTINEL: &str = "No error";

pub const DIMENSION_JOB_NAME: &str = "JobName";
pub const DIMENSION_JOB_RUN_ID: &str = "JobRunId";
pub const DIMENSION_ERROR_MESSAGE: &str = "Error Message";
pub const DIMENSION_NAMESPACE: &str = "namespace";

/// 指标名称词表
///
/// 名称字符串是下游仪表盘使用的版本化契约，改名属于破坏性变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum MetricName {
    ExecutionCount,
    AverageExecutionDuration,
    LatestRunState,
    LatestRunExecutionDuration,
    LatestRunStartTime,
    LatestRunCompletionTime,
    LatestRunErrorState,
    CurrentRunState,
    RunStartTime,
    RunCompletionTime,
    RunExecutionDuration,
    RunErrorState,
}

impl MetricName {
    pub const ALL: [MetricName; 12] = [
        MetricName::ExecutionCount,
        MetricName::AverageExecutionDuration,
        MetricName::LatestRunState,
        MetricName::LatestRunExecutionDuration,
        MetricName::LatestRunStartTime,
        MetricName::LatestRunCompletionTime,
        MetricName::LatestRunErrorState,
        MetricName::CurrentRunState,
        MetricName::RunStartTime,
        MetricName::RunCompletionTime,
        MetricName::RunExecutionDuration,
        MetricName::RunErrorState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ExecutionCount => "Execution Count",
            MetricName::AverageExecutionDuration => "Average Execution Duration (Sec)",
            MetricName::LatestRunState => "Latest Run State",
            MetricName::LatestRunExecutionDuration => "Latest Run Execution Duration (Sec)",
            MetricName::LatestRunStartTime => "Latest Run Start Time (Epoch)",
            MetricName::LatestRunCompletionTime => "Latest Run Completion Time (Epoch)",
            MetricName::LatestRunErrorState => "Latest Run Error State",
            MetricName::CurrentRunState => "Current Run State",
            MetricName::RunStartTime => "Run Start Time (Epoch)",
            MetricName::RunCompletionTime => "Run Completion Time (Epoch)",
            MetricName::RunExecutionDuration => "Run Execution Duration (Sec)",
            MetricName::RunErrorState => "Run Error State",
        }
    }
}

impl std::str::FromStr for MetricName {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| MetricsError::Serialization(format!("未知的指标名称: {s}")))
    }
}

impl TryFrom<String> for MetricName {
    type Error = MetricsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MetricName> for &'static str {
    fn from(name: MetricName) -> Self {
        name.as_str()
    }
}

impl std::fmt::Display for MetricName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 指标单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricUnit {
    Count,
    Seconds,
    None,
}

/// 单个指标取值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub name: MetricName,
    pub value: f64,
    pub unit: MetricUnit,
}

/// 有序且名称不重复的指标集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    entries: Vec<MetricEntry>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加指标，名称重复时返回错误
    pub fn push(&mut self, name: MetricName, value: f64, unit: MetricUnit) -> MetricsResult<()> {
        if self.contains(name) {
            return Err(MetricsError::DuplicateMetric(name.as_str().to_string()));
        }
        self.entries.push(MetricEntry { name, value, unit });
        Ok(())
    }

    pub fn with(mut self, name: MetricName, value: f64, unit: MetricUnit) -> MetricsResult<Self> {
        self.push(name, value, unit)?;
        Ok(self)
    }

    pub fn contains(&self, name: MetricName) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn get(&self, name: MetricName) -> Option<&MetricEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn value_of(&self, name: MetricName) -> Option<f64> {
        self.get(name).map(|entry| entry.value)
    }

    pub fn entries(&self) -> &[MetricEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<MetricName> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetricSet {
    type Item = &'a MetricEntry;
    type IntoIter = std::slice::Iter<'a, MetricEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 可直接提交给指标后端的一条指标记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    pub metric_name: MetricName,
    pub value: f64,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
    pub dimensions: Vec<Dimension>,
}

impl MetricRecord {
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.name == name)
            .map(|dimension| dimension.value.as_str())
    }
}
