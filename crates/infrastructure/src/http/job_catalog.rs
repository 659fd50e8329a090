use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{build_client, endpoint, error_body, parse_base_url, with_auth};
use etl_metrics_config::OrchestrationConfig;
use etl_metrics_domain::entities::{JobPage, JobRun};
use etl_metrics_domain::ports::JobCatalog;
use etl_metrics_errors::{MetricsError, MetricsResult};

#[derive(Debug, Deserialize)]
struct RunPage {
    job_runs: Vec<JobRun>,
    #[serde(default)]
    next_token: Option<String>,
}

/// 通过 HTTP 访问作业编排服务
///
/// - `GET {base}/jobs[?next_token=T]`
/// - `GET {base}/jobs/{job_name}/runs[?next_token=T]`，自动翻页直到没有 next_token
pub struct HttpJobCatalog {
    base_url: Url,
    auth_token: Option<String>,
    http_client: reqwest::Client,
}

impl HttpJobCatalog {
    pub fn new(config: &OrchestrationConfig) -> MetricsResult<Self> {
        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            auth_token: config.auth_token.clone(),
            http_client: build_client(config.request_timeout_seconds)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_page<T>(&self, url: Url, next_token: Option<&str>) -> Result<T, String>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self.http_client.get(url);
        if let Some(token) = next_token {
            request = request.query(&[("next_token", token)]);
        }
        let request = with_auth(request, self.auth_token.as_deref());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                format!("请求超时: {e}")
            } else {
                format!("连接失败: {e}")
            }
        })?;

        if !response.status().is_success() {
            return Err(error_body(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| format!("响应解析失败: {e}"))
    }
}

#[async_trait]
impl JobCatalog for HttpJobCatalog {
    async fn list_jobs(&self, next_token: Option<&str>) -> MetricsResult<JobPage> {
        let url = endpoint(&self.base_url, &["jobs"])?;
        debug!(next_token = ?next_token, "Listing jobs from {}", url);

        self.get_page::<JobPage>(url, next_token)
            .await
            .map_err(|message| {
                warn!("Failed to list jobs: {}", message);
                MetricsError::job_listing(message)
            })
    }

    async fn get_job_runs(&self, job_name: &str) -> MetricsResult<Vec<JobRun>> {
        let url = endpoint(&self.base_url, &["jobs", job_name, "runs"])?;
        let mut runs = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let page: RunPage = self
                .get_page(url.clone(), next_token.as_deref())
                .await
                .map_err(|message| {
                    warn!(job.name = job_name, "Failed to fetch run history: {}", message);
                    MetricsError::history_fetch(job_name, message)
                })?;

            runs.extend(page.job_runs);

            match page.next_token {
                Some(token) if !seen_tokens.insert(token.clone()) => {
                    return Err(MetricsError::history_fetch(
                        job_name,
                        format!("分页令牌重复: {token}"),
                    ));
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(job.name = job_name, runs = runs.len(), "Fetched run history");
        Ok(runs)
    }
}
