use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    collector::CollectorConfig,
    endpoints::{IngestionConfig, OrchestrationConfig},
    observability::ObservabilityConfig,
};
use crate::validation::ConfigValidator;

/// 未指定配置文件时依次查找的路径
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/etl-metrics.toml",
    "etl-metrics.toml",
    "/etc/etl-metrics/config.toml",
];

/// 环境变量前缀，例如 `ETL_METRICS_INGESTION__NAMESPACE`
pub const ENV_PREFIX: &str = "ETL_METRICS";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub orchestration: OrchestrationConfig,
    pub ingestion: IngestionConfig,
    pub collector: CollectorConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 按 默认值 < 配置文件 < 环境变量 的优先级加载配置
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("orchestration.base_url", defaults.orchestration.base_url)?
            .set_default(
                "orchestration.request_timeout_seconds",
                defaults.orchestration.request_timeout_seconds,
            )?
            .set_default("ingestion.base_url", defaults.ingestion.base_url)?
            .set_default("ingestion.namespace", defaults.ingestion.namespace)?
            .set_default(
                "ingestion.request_timeout_seconds",
                defaults.ingestion.request_timeout_seconds,
            )?
            .set_default(
                "ingestion.max_batch_size",
                defaults.ingestion.max_batch_size as u64,
            )?
            .set_default(
                "collector.eligibility_window_seconds",
                defaults.collector.eligibility_window_seconds,
            )?
            .set_default(
                "collector.max_concurrent_jobs",
                defaults.collector.max_concurrent_jobs as u64,
            )?
            .set_default(
                "collector.interval_seconds",
                defaults.collector.interval_seconds,
            )?
            .set_default(
                "observability.log_level",
                defaults.observability.log_level.to_string(),
            )?
            .set_default(
                "observability.log_format",
                defaults.observability.log_format.to_string(),
            )?
            .set_default(
                "observability.metrics_enabled",
                defaults.observability.metrics_enabled,
            )?
            .set_default(
                "observability.prometheus_listen_address",
                defaults.observability.prometheus_listen_address,
            )?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.orchestration.validate()?;
        self.ingestion.validate()?;
        self.collector.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
