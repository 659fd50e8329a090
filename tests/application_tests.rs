use std::sync::Arc;
use std::time::Duration;

use etl_metrics::{Application, ShutdownManager};
use etl_metrics_config::AppConfig;
use etl_metrics_testing_utils::{JobRunBuilder, MockJobCatalog, MockMetricSink};

fn application(catalog: &MockJobCatalog, sink: &MockMetricSink) -> Application {
    let mut config = AppConfig::default();
    config.ingestion.namespace = "Test/Etl".to_string();
    config.collector.interval_seconds = 3600;
    Application::with_ports(config, Arc::new(catalog.clone()), Arc::new(sink.clone()))
}

#[tokio::test]
async fn test_run_once_publishes_with_configured_namespace() {
    let catalog = MockJobCatalog::new()
        .with_job("nightly", vec![JobRunBuilder::new("jr_1").running().build()]);
    let sink = MockMetricSink::new();

    let report = application(&catalog, &sink).run_once().await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.job_batches_published, 1);
    assert_eq!(report.run_batches_published, 1);
    assert!(sink.batches().iter().all(|b| b.namespace == "Test/Etl"));
}

#[tokio::test]
async fn test_run_once_surfaces_listing_failure() {
    let catalog = MockJobCatalog::new().with_listing_error("down");
    let sink = MockMetricSink::new();

    assert!(application(&catalog, &sink).run_once().await.is_err());
}

#[tokio::test]
async fn test_daemon_runs_until_shutdown() {
    let catalog = MockJobCatalog::new().with_job("nightly", vec![]);
    let sink = MockMetricSink::new();
    let app = Arc::new(application(&catalog, &sink));

    let shutdown = ShutdownManager::new();
    let shutdown_rx = shutdown.subscribe().await;
    let handle = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.run_daemon(shutdown_rx).await })
    };

    // 首次 tick 立即触发
    let published = tokio::time::timeout(Duration::from_secs(5), async {
        while sink.batches().is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(published.is_ok(), "daemon did not publish");

    shutdown.shutdown().await;
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("daemon did not stop")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(catalog.history_calls("nightly"), 1);
}

#[tokio::test]
async fn test_daemon_survives_failed_invocations() {
    let catalog = MockJobCatalog::new().with_listing_error("down");
    let sink = MockMetricSink::new();
    let app = Arc::new(application(&catalog, &sink));

    let shutdown = ShutdownManager::new();
    let shutdown_rx = shutdown.subscribe().await;
    let handle = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.run_daemon(shutdown_rx).await })
    };

    let attempted = tokio::time::timeout(Duration::from_secs(5), async {
        while catalog.list_calls().is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(attempted.is_ok());

    shutdown.shutdown().await;
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("daemon did not stop")
        .unwrap();
    assert!(result.is_ok());
}
