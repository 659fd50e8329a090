use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectorConfig {
    /// 已完成运行仍被视为"当前"运行的时间窗口
    pub eligibility_window_seconds: i64,
    pub max_concurrent_jobs: usize,
    /// daemon 模式下两次调用之间的间隔
    pub interval_seconds: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            eligibility_window_seconds: 900,
            max_concurrent_jobs: 4,
            interval_seconds: 300,
        }
    }
}

impl ConfigValidator for CollectorConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.eligibility_window_seconds <= 0 {
            return Err(crate::ConfigError::Validation(
                "collector.eligibility_window_seconds must be greater than 0".to_string(),
            ));
        }
        ValidationUtils::validate_count(
            self.max_concurrent_jobs,
            "collector.max_concurrent_jobs",
            64,
        )?;
        if self.interval_seconds == 0 {
            return Err(crate::ConfigError::Validation(
                "collector.interval_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
