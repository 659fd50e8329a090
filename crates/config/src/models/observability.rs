use serde::{Deserialize, Serialize};

use super::logging::{LogLevel, OutputFormat};
use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: LogLevel,
    pub log_format: OutputFormat,
    pub metrics_enabled: bool,
    pub prometheus_listen_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: OutputFormat::Json,
            metrics_enabled: false,
            prometheus_listen_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.metrics_enabled {
            ValidationUtils::validate_socket_address(
                &self.prometheus_listen_address,
                "observability.prometheus_listen_address",
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_address_checked_only_when_metrics_enabled() {
        let mut config = ObservabilityConfig {
            prometheus_listen_address: "nowhere".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.metrics_enabled = true;
        assert!(config.validate().is_err());

        config.prometheus_listen_address = "127.0.0.1:9464".to_string();
        assert!(config.validate().is_ok());
    }
}
