use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};
use url::Url;

use super::{build_client, endpoint, error_body, parse_base_url, with_auth};
use etl_metrics_config::IngestionConfig;
use etl_metrics_domain::ports::MetricSink;
use etl_metrics_domain::value_objects::{MetricRecord, DIMENSION_JOB_NAME, DIMENSION_JOB_RUN_ID};
use etl_metrics_errors::{MetricsError, MetricsResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutMetricDataRequest<'a> {
    namespace: &'a str,
    metric_data: &'a [MetricRecord],
}

/// 通过 `POST {base}/metrics` 提交指标批次
///
/// 一个批次对应一次请求。超过 `max_batch_size` 的批次直接拒绝，不做拆分。
pub struct HttpMetricSink {
    endpoint: Url,
    auth_token: Option<String>,
    max_batch_size: usize,
    http_client: reqwest::Client,
}

impl HttpMetricSink {
    pub fn new(config: &IngestionConfig) -> MetricsResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self {
            endpoint: endpoint(&base_url, &["metrics"])?,
            auth_token: config.auth_token.clone(),
            max_batch_size: config.max_batch_size,
            http_client: build_client(config.request_timeout_seconds)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// 从批次的第一条记录中取出作业名和运行 ID，用于错误上下文
fn batch_context(records: &[MetricRecord]) -> (String, String) {
    let first = records.first();
    let dimension = |name: &str| {
        first
            .and_then(|record| record.dimension(name))
            .unwrap_or_default()
            .to_string()
    };
    (dimension(DIMENSION_JOB_NAME), dimension(DIMENSION_JOB_RUN_ID))
}

#[async_trait]
impl MetricSink for HttpMetricSink {
    async fn put_metric_data(
        &self,
        namespace: &str,
        records: &[MetricRecord],
    ) -> MetricsResult<()> {
        if records.len() > self.max_batch_size {
            return Err(MetricsError::BatchTooLarge {
                size: records.len(),
                limit: self.max_batch_size,
            });
        }
        if records.is_empty() {
            debug!("Skipping empty metric batch");
            return Ok(());
        }

        let (job_name, run_id) = batch_context(records);
        let body = PutMetricDataRequest {
            namespace,
            metric_data: records,
        };

        let request = with_auth(
            self.http_client.post(self.endpoint.clone()).json(&body),
            self.auth_token.as_deref(),
        );

        match request.send().await {
            Ok(response) => {
                if response.status().is_success() {
                    debug!(
                        job.name = %job_name,
                        job_run.id = %run_id,
                        records = records.len(),
                        "Metric batch accepted"
                    );
                    Ok(())
                } else {
                    let message = error_body(response).await;
                    error!(
                        job.name = %job_name,
                        job_run.id = %run_id,
                        "Metric batch rejected: {}",
                        message
                    );
                    Err(MetricsError::submission(job_name, run_id, message))
                }
            }
            Err(e) => {
                error!(
                    job.name = %job_name,
                    job_run.id = %run_id,
                    "Failed to reach ingestion service: {}",
                    e
                );
                let message = if e.is_timeout() {
                    format!("请求超时: {e}")
                } else {
                    format!("连接失败: {e}")
                };
                Err(MetricsError::submission(job_name, run_id, message))
            }
        }
    }
}
