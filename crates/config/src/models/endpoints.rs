use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

/// 所有指标提交使用的默认命名空间
pub const DEFAULT_METRIC_NAMESPACE: &str = "Broadcom/AwsCustomMetric";

/// 作业编排服务（作业目录、运行历史）的连接配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrchestrationConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub auth_token: Option<String>,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_seconds: 30,
            auth_token: None,
        }
    }
}

impl ConfigValidator for OrchestrationConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_http_url(&self.base_url, "orchestration.base_url")?;
        ValidationUtils::validate_timeout_seconds(
            self.request_timeout_seconds,
            "orchestration.request_timeout_seconds",
        )?;
        if let Some(token) = &self.auth_token {
            ValidationUtils::validate_not_empty(token, "orchestration.auth_token")?;
        }
        Ok(())
    }
}

/// 指标接收服务的连接配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestionConfig {
    pub base_url: String,
    pub namespace: String,
    pub request_timeout_seconds: u64,
    /// 单次提交允许的最大记录数，超出时整批拒绝
    pub max_batch_size: usize,
    pub auth_token: Option<String>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            namespace: DEFAULT_METRIC_NAMESPACE.to_string(),
            request_timeout_seconds: 30,
            max_batch_size: 1000,
            auth_token: None,
        }
    }
}

impl ConfigValidator for IngestionConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_http_url(&self.base_url, "ingestion.base_url")?;
        ValidationUtils::validate_not_empty(&self.namespace, "ingestion.namespace")?;
        ValidationUtils::validate_timeout_seconds(
            self.request_timeout_seconds,
            "ingestion.request_timeout_seconds",
        )?;
        // 作业级批次固定 7 条记录，上限不能低于它
        if self.max_batch_size < 7 {
            return Err(crate::ConfigError::Validation(
                "ingestion.max_batch_size must be at least 7".to_string(),
            ));
        }
        ValidationUtils::validate_count(self.max_batch_size, "ingestion.max_batch_size", 10_000)?;
        if let Some(token) = &self.auth_token {
            ValidationUtils::validate_not_empty(token, "ingestion.auth_token")?;
        }
        Ok(())
    }
}
