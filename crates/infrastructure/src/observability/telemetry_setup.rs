use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use etl_metrics_config::{LogLevel, OutputFormat};

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: LogLevel, format: OutputFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        OutputFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true);
            registry
                .with(fmt_layer)
                .try_init()
                .context("初始化日志系统失败")?;
        }
        OutputFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer().pretty().with_target(false);
            registry
                .with(fmt_layer)
                .try_init()
                .context("初始化日志系统失败")?;
        }
    }

    info!(
        logging.format = %format,
        logging.level = %level,
        "Logging initialized"
    );
    Ok(())
}

/// Install the Prometheus recorder and its HTTP listener
pub fn init_metrics(listen_address: &str) -> Result<()> {
    let address: SocketAddr = listen_address
        .parse()
        .with_context(|| format!("无效的监听地址: {listen_address}"))?;

    let (recorder, exporter) = metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(address)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus exporter: {}", e))?;

    metrics::set_global_recorder(recorder)
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    tokio::spawn(exporter);

    info!("Prometheus exporter listening on {}", address);
    Ok(())
}
