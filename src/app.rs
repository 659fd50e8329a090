use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use etl_metrics_collector::{InvocationReport, MetricsPublisher, PublisherSettings};
use etl_metrics_config::AppConfig;
use etl_metrics_domain::ports::{JobCatalog, MetricSink};
use etl_metrics_infrastructure::{HttpJobCatalog, HttpMetricSink};
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// 应用运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// 执行一次调用后退出
    Once,
    /// 按 `collector.interval_seconds` 周期执行，直到收到关闭信号
    Daemon,
}

impl std::str::FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(AppMode::Once),
            "daemon" => Ok(AppMode::Daemon),
            _ => Err(anyhow::anyhow!("不支持的运行模式: {s}")),
        }
    }
}

/// 主应用程序
pub struct Application {
    config: AppConfig,
    publisher: Arc<MetricsPublisher>,
}

impl Application {
    /// 使用 HTTP 适配器创建应用实例
    pub fn new(config: AppConfig) -> Result<Self> {
        let catalog = HttpJobCatalog::new(&config.orchestration)
            .context("创建作业编排服务客户端失败")?;
        let sink =
            HttpMetricSink::new(&config.ingestion).context("创建指标接收服务客户端失败")?;

        info!(
            orchestration = %catalog.base_url(),
            ingestion = %sink.endpoint(),
            namespace = %config.ingestion.namespace,
            "应用程序初始化完成"
        );

        Ok(Self::with_ports(config, Arc::new(catalog), Arc::new(sink)))
    }

    /// 使用给定的端口实现创建应用实例
    pub fn with_ports(
        config: AppConfig,
        catalog: Arc<dyn JobCatalog>,
        sink: Arc<dyn MetricSink>,
    ) -> Self {
        let settings = PublisherSettings::from(&config);
        Self {
            config,
            publisher: Arc::new(MetricsPublisher::new(catalog, sink, settings)),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn run_once(&self) -> Result<InvocationReport> {
        let report = self.publisher.run_once().await.context("指标发布调用失败")?;

        for failure in &report.failures {
            warn!(
                stage = %failure.stage,
                job.name = %failure.job_name,
                job_run.id = failure.run_id.as_deref().unwrap_or("-"),
                "{}",
                failure.message
            );
        }

        Ok(report)
    }

    /// 周期执行调用，直到收到关闭信号
    ///
    /// 单次调用失败只记录日志，不终止循环。
    pub async fn run_daemon(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let period = Duration::from_secs(self.config.collector.interval_seconds);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_seconds = period.as_secs(), "进入守护模式");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) => info!(
                            invocation.id = %report.invocation_id,
                            invocation.failures = report.failures.len(),
                            "调用完成"
                        ),
                        Err(e) => error!("调用失败: {e:#}"),
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("守护模式收到关闭信号");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("once".parse::<AppMode>().unwrap(), AppMode::Once);
        assert_eq!("daemon".parse::<AppMode>().unwrap(), AppMode::Daemon);
        assert!("all".parse::<AppMode>().is_err());
    }

    #[test]
    fn test_new_rejects_unusable_endpoint() {
        let mut config = AppConfig::default();
        config.orchestration.base_url = "mailto:ops@example.com".to_string();
        assert!(Application::new(config).is_err());
    }
}
