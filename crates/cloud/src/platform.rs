//! Remote GPU platform client.
//!
//! Functions are spawned asynchronously and identified by a call handle.
//! Polling a handle never blocks: it reports pending, a result, or the
//! remote error. Functions write their artifacts to an output volume that
//! is read back by filename.

use std::time::Duration;

use async_trait::async_trait;
use creatorify_core::lifecycle::CallOutcome;
use serde::Deserialize;

/// Errors from the platform HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform returned a non-2xx status code.
    #[error("GPU platform API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The platform answered with a body we could not interpret.
    #[error("Unexpected GPU platform response: {0}")]
    Decode(String),
}

/// The operations the API needs from the GPU platform.
#[async_trait]
pub trait GpuPlatform: Send + Sync {
    /// Spawn `function` with `payload` and return its call handle.
    async fn spawn(&self, function: &str, payload: serde_json::Value)
        -> Result<String, PlatformError>;

    /// Non-blocking status of a previously spawned call.
    async fn poll(&self, call_id: &str) -> Result<CallOutcome, PlatformError>;

    /// Read a file from the output volume. `Ok(None)` when it does not exist.
    async fn fetch_output(&self, filename: &str) -> Result<Option<Vec<u8>>, PlatformError>;
}

/// Connection settings for [`HttpGpuPlatform`].
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL, e.g. `https://gpu.example.com/v1`.
    pub base_url: String,
    /// Namespace the functions are deployed under.
    pub app_name: String,
    /// Bearer token, if the platform requires one.
    pub token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SpawnResponse {
    call_id: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum CallState {
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Deserialize)]
struct CallStatusResponse {
    status: CallState,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// What a call's result turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum Resolved {
    Outcome(CallOutcome),
    /// The function spawned another function and returned its handle.
    Nested(String),
}

fn resolve(status: CallStatusResponse) -> Resolved {
    match status.status {
        CallState::Pending => Resolved::Outcome(CallOutcome::Pending),
        CallState::Failure => Resolved::Outcome(CallOutcome::Failed(
            status.error.unwrap_or_else(|| "unknown error".to_string()),
        )),
        CallState::Success => match status.result {
            serde_json::Value::String(filename) => {
                Resolved::Outcome(CallOutcome::Succeeded(Some(filename)))
            }
            serde_json::Value::Object(map) => {
                if let Some(call_id) = map.get("call_id").and_then(|v| v.as_str()) {
                    Resolved::Nested(call_id.to_string())
                } else {
                    let filename = map
                        .get("filename")
                        .and_then(|v| v.as_str())
                        .map(str::to_string);
                    Resolved::Outcome(CallOutcome::Succeeded(filename))
                }
            }
            _ => Resolved::Outcome(CallOutcome::Succeeded(None)),
        },
    }
}

/// [`GpuPlatform`] over the platform's REST API.
pub struct HttpGpuPlatform {
    client: reqwest::Client,
    config: PlatformConfig,
}

impl HttpGpuPlatform {
    pub fn new(config: PlatformConfig) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn call_status(&self, call_id: &str) -> Result<CallStatusResponse, PlatformError> {
        let request = self.client.get(self.url(&format!("/calls/{call_id}")));
        let response = self.authorize(request).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PlatformError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PlatformError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        let response = Self::ensure_success(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GpuPlatform for HttpGpuPlatform {
    async fn spawn(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<String, PlatformError> {
        let url = self.url(&format!(
            "/apps/{}/functions/{function}/spawn",
            self.config.app_name
        ));
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "args": payload }));
        let response = self.authorize(request).send().await?;
        let spawned: SpawnResponse = Self::parse_response(response).await?;
        tracing::debug!(function, call_id = %spawned.call_id, "Spawned remote function");
        Ok(spawned.call_id)
    }

    async fn poll(&self, call_id: &str) -> Result<CallOutcome, PlatformError> {
        match resolve(self.call_status(call_id).await?) {
            Resolved::Outcome(outcome) => Ok(outcome),
            Resolved::Nested(inner) => {
                tracing::debug!(call_id, inner_call_id = %inner, "Following nested call handle");
                match resolve(self.call_status(&inner).await?) {
                    Resolved::Outcome(outcome) => Ok(outcome),
                    Resolved::Nested(deeper) => Err(PlatformError::Decode(format!(
                        "call {inner} returned another call handle {deeper}"
                    ))),
                }
            }
        }
    }

    async fn fetch_output(&self, filename: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        let url = self.url(&format!(
            "/apps/{}/volumes/outputs/{filename}",
            self.config.app_name
        ));
        let response = self.authorize(self.client.get(url)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::ensure_success(response).await?;
        Ok(Some(response.bytes().await?.to_vec()))
    }
}
