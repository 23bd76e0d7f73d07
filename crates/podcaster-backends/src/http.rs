//! HTTP backend abstraction for OpenAI-compatible servers.
//!
//! The adapters only describe *what* to post; [`HttpBackend`] decides how.
//! The production implementation uses reqwest with automatic retry logic for
//! transient errors, and tests swap in a canned backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::OpenAiConfig;
use crate::error::{BackendError, BackendResult};

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// Requests
// ============================================================================

/// A file upload plus plain form fields.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub file_field: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub fields: Vec<(&'static str, String)>,
}

/// Body of an API request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartUpload),
}

/// A POST against a path under the configured API base.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: &'static str,
    pub body: RequestBody,
}

impl ApiRequest {
    pub const fn json(path: &'static str, body: Value) -> Self {
        Self {
            path,
            body: RequestBody::Json(body),
        }
    }

    pub const fn multipart(path: &'static str, upload: MultipartUpload) -> Self {
        Self {
            path,
            body: RequestBody::Multipart(upload),
        }
    }
}

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can post API requests.
///
/// This is an implementation detail - external code should use the core
/// ports implemented by the adapters.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Post a request and return the raw response body of a 2xx answer.
    async fn post(&self, request: &ApiRequest) -> BackendResult<Vec<u8>>;

    /// Post a request and decode a JSON response.
    async fn post_json(&self, request: &ApiRequest) -> BackendResult<Value> {
        let body = self.post(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Implements exponential backoff for transient server errors (5xx)
/// and network errors.
pub struct ReqwestBackend {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &OpenAiConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// Build a request with optional authentication.
    ///
    /// Multipart forms are consumed by sending, so this runs once per attempt.
    fn build_request(
        &self,
        url: &str,
        body: &RequestBody,
    ) -> BackendResult<reqwest::RequestBuilder> {
        let mut request = self.client.post(url);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let request = match body {
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(upload) => {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.content_type)?;
                let form = upload
                    .fields
                    .iter()
                    .fold(Form::new().part(upload.file_field, part), |form, (k, v)| {
                        form.text(*k, v.clone())
                    });
                request.multipart(form)
            }
        };
        Ok(request)
    }

    /// Post with automatic retry for transient errors.
    async fn post_with_retry(&self, request: &ApiRequest) -> BackendResult<Vec<u8>> {
        let url = self.url(request.path);
        let mut last_error: Option<BackendError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt) - 1);
                debug!(%url, attempt, ?delay, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.build_request(&url, &request.body)?.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.bytes().await?.to_vec());
                    }

                    let mut message = response.text().await.unwrap_or_default();
                    message.truncate(floor_char_boundary(&message, MAX_ERROR_BODY));
                    let error = BackendError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.clone(),
                        message,
                    };

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        warn!(%url, status = status.as_u16(), attempt, "Server error, will retry");
                        last_error = Some(error);
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    return Err(error);
                }
                Err(e) => {
                    // Network errors are retryable
                    if attempt < self.max_retries {
                        warn!(%url, error = %e, attempt, "Network error, will retry");
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| BackendError::invalid("unknown error during request")))
    }
}

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post(&self, request: &ApiRequest) -> BackendResult<Vec<u8>> {
        self.post_with_retry(request).await
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
