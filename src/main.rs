use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use etl_metrics::{AppMode, Application, ShutdownManager};
use etl_metrics_config::{AppConfig, LogLevel, OutputFormat};
use etl_metrics_infrastructure::{init_logging, init_metrics};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = Command::new("etl-metrics")
        .version("1.0.0")
        .about("ETL作业运行指标采集与发布服务")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时按默认路径查找"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("运行模式")
                .value_parser(["once", "daemon"])
                .default_value("once"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mode: AppMode = matches
        .get_one::<String>("mode")
        .map(String::as_str)
        .unwrap_or("once")
        .parse()?;

    // 加载配置
    let config = AppConfig::load(config_path).with_context(|| match config_path {
        Some(path) => format!("加载配置文件失败: {path}"),
        None => "加载默认配置失败".to_string(),
    })?;

    // 初始化日志系统，命令行参数优先
    let log_level = match matches.get_one::<String>("log-level") {
        Some(level) => level.parse::<LogLevel>().map_err(anyhow::Error::msg)?,
        None => config.observability.log_level,
    };
    let log_format = match matches.get_one::<String>("log-format") {
        Some(format) => format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?,
        None => config.observability.log_format,
    };
    init_logging(log_level, log_format)?;

    info!("启动ETL作业指标发布服务");
    info!("运行模式: {:?}", mode);

    // 导出端点只在 daemon 模式启动
    if mode == AppMode::Daemon && config.observability.metrics_enabled {
        init_metrics(&config.observability.prometheus_listen_address)
            .context("初始化Prometheus指标导出失败")?;
    }

    let app = Application::new(config)?;

    match mode {
        AppMode::Once => run_once(&app).await,
        AppMode::Daemon => run_daemon(app).await,
    }
}

async fn run_once(app: &Application) -> Result<ExitCode> {
    let report = app.run_once().await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("序列化调用报告失败")?
    );

    if report.is_success() {
        info!(
            invocation.id = %report.invocation_id,
            records = report.records_published,
            "调用成功完成"
        );
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            invocation.id = %report.invocation_id,
            failures = report.failures.len(),
            "调用完成但存在失败"
        );
        Ok(ExitCode::FAILURE)
    }
}

async fn run_daemon(app: Application) -> Result<ExitCode> {
    let shutdown_manager = ShutdownManager::new();

    let app_handle = {
        let app = Arc::new(app);
        let shutdown_rx = shutdown_manager.subscribe().await;

        tokio::spawn(async move {
            if let Err(e) = app.run_daemon(shutdown_rx).await {
                error!("应用运行失败: {e:#}");
            }
        })
    };

    wait_for_shutdown_signal().await;

    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown().await;

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => error!("应用关闭时发生错误: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("ETL作业指标发布服务已退出");
    Ok(ExitCode::SUCCESS)
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
