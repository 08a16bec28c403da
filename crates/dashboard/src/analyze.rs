use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use protocol::{AnalysisRequest, AnalysisResult};

use crate::config::AnalyzeConfig;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// One round trip to the scoring service. The HTTP status is not
/// inspected: any JSON body counts as a result, and the renderer
/// degrades on missing fields.
pub(crate) async fn request_analysis(
    config: &AnalyzeConfig,
    base_url: &str,
    request: &AnalysisRequest,
) -> Result<AnalysisResult, String> {
    let url = join_base_path(base_url, &config.analyze_path)?;
    let client = http_client().map_err(|err| err.to_string())?;
    let response = client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .timeout(config.request_timeout)
        .json(request)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|err| err.to_string())?;
    tracing::info!(status = status, body_len = body.len(), "analysis response received");
    let value: Value = serde_json::from_str(&body).map_err(|err| err.to_string())?;
    Ok(AnalysisResult::from_value(&value))
}

pub(crate) fn join_base_path(base: &str, path: &str) -> Result<String, String> {
    if base.trim().is_empty() {
        return Err("base_url is empty".to_string());
    }
    let normalized_base = base.trim_end_matches('/');
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Ok(format!("{normalized_base}{normalized_path}"))
}

fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .build()
}

fn http_client() -> Result<&'static Client, reqwest::Error> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client);
    }
    let client = build_http_client()?;
    let _ = HTTP_CLIENT.set(client);
    Ok(HTTP_CLIENT
        .get()
        .expect("http client should be initialized"))
}
