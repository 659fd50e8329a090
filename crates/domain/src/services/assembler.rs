use chrono::{DateTime, Utc};

use crate::value_objects::{
    Dimension, MetricRecord, MetricSet, DIMENSION_ERROR_MESSAGE, DIMENSION_JOB_NAME,
    DIMENSION_JOB_RUN_ID, DIMENSION_NAMESPACE, NAMESPACE_DIMENSION_VALUE, NO_ERROR_SENTINEL,
};

/// 将指标集合组装为带维度的指标记录批次
///
/// 同一批次中的每条记录携带完全相同的维度和时间戳，批次由调用方一次性提交。
#[derive(Debug, Clone)]
pub struct MetricAssembler {
    namespace_dimension: String,
}

impl Default for MetricAssembler {
    fn default() -> Self {
        Self::new(NAMESPACE_DIMENSION_VALUE)
    }
}

impl MetricAssembler {
    pub fn new(namespace_dimension: impl Into<String>) -> Self {
        Self {
            namespace_dimension: namespace_dimension.into(),
        }
    }

    pub fn dimensions(
        &self,
        job_name: &str,
        run_id: &str,
        error_message: Option<&str>,
    ) -> Vec<Dimension> {
        vec![
            Dimension::new(DIMENSION_JOB_NAME, job_name),
            Dimension::new(DIMENSION_JOB_RUN_ID, run_id),
            Dimension::new(
                DIMENSION_ERROR_MESSAGE,
                error_message.unwrap_or(NO_ERROR_SENTINEL),
            ),
            Dimension::new(DIMENSION_NAMESPACE, self.namespace_dimension.as_str()),
        ]
    }

    pub fn assemble(
        &self,
        job_name: &str,
        metrics: &MetricSet,
        run_id: &str,
        error_message: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Vec<MetricRecord> {
        let dimensions = self.dimensions(job_name, run_id, error_message);
        metrics
            .into_iter()
            .map(|entry| MetricRecord {
                metric_name: entry.name,
                value: entry.value,
                unit: entry.unit,
                timestamp,
                dimensions: dimensions.clone(),
            })
            .collect()
    }

    /// 使用当前时间作为时间戳
    pub fn assemble_now(
        &self,
        job_name: &str,
        metrics: &MetricSet,
        run_id: &str,
        error_message: Option<&str>,
    ) -> Vec<MetricRecord> {
        self.assemble(job_name, metrics, run_id, error_message, Utc::now())
    }
}
