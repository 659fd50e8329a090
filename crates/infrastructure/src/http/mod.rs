//! reqwest 实现的作业编排服务与指标接收服务适配器

pub mod job_catalog;
pub mod metric_sink;

pub use job_catalog::HttpJobCatalog;
pub use metric_sink::HttpMetricSink;

use etl_metrics_errors::{MetricsError, MetricsResult};
use std::time::Duration;
use url::Url;

pub(crate) fn build_client(timeout_seconds: u64) -> MetricsResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| MetricsError::config_error(format!("创建HTTP客户端失败: {e}")))
}

pub(crate) fn parse_base_url(base_url: &str) -> MetricsResult<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| MetricsError::config_error(format!("无效的服务地址 {base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(MetricsError::config_error(format!(
            "无效的服务地址 {base_url}: 不能作为基础地址"
        )));
    }
    Ok(url)
}

/// 在基础地址后追加路径段，每段单独做百分号编码
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> MetricsResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| MetricsError::config_error(format!("无效的服务地址: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn with_auth(
    request: reqwest::RequestBuilder,
    auth_token: Option<&str>,
) -> reqwest::RequestBuilder {
    match auth_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// 非 2xx 响应转为错误信息
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("HTTP {status} - {body}")
}
