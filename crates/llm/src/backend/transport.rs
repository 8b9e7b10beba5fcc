//! Shared HTTP plumbing: client construction, status mapping, and retry

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::HttpBackendConfig;
use crate::LlmError;

pub(crate) fn build_client(config: &HttpBackendConfig) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Attach the bearer token when one is configured
pub(crate) fn authorize(request: RequestBuilder, config: &HttpBackendConfig) -> RequestBuilder {
    match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

/// Send once and decode the JSON body
///
/// 5xx responses become `Network` (retried), other failures `Api` (not retried).
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, LlmError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = format!("HTTP {}: {}", status, body);
        return Err(if status.is_server_error() {
            LlmError::Network(message)
        } else {
            LlmError::Api(message)
        });
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

fn is_transient(error: &LlmError) -> bool {
    matches!(error, LlmError::Network(_) | LlmError::Timeout)
}

/// Call `attempt` up to `1 + max_retries` times with exponential backoff
pub(crate) async fn with_retries<T, F, Fut>(
    max_retries: u32,
    initial_backoff: Duration,
    mut attempt: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut backoff = initial_backoff;
    let mut retries = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) && retries < max_retries => {
                retries += 1;
                tracing::warn!(
                    error = %e,
                    retry = retries,
                    max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "Transient LLM failure, backing off"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
