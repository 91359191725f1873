//! Transport wrapper around [`reqwest`].
//!
//! Every request goes to `base_url + path`. JSON calls carry
//! `Content-Type: application/json`; multipart uploads leave the header to
//! the transport so the boundary is set correctly.

use std::future::Future;

use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::upload::{ProgressFn, UploadForm};

/// HTTP client for one subtitle service deployment.
///
/// Cheap to clone; clones share the connection pool and cancellation token.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    upload_chunk_bytes: usize,
    cancel: Option<CancellationToken>,
}

/// A binary response body (exported subtitle file or rendered video).
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    /// File name suggested by `Content-Disposition`, if any.
    pub file_name: Option<String>,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_chunk_bytes: config.upload_chunk_bytes,
            cancel: None,
        })
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for sharing a connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_chunk_bytes: crate::config::DEFAULT_UPLOAD_CHUNK_BYTES,
            cancel: None,
        }
    }

    /// Abandon every in-flight and future call once `token` is cancelled.
    ///
    /// Abandoned calls fail with [`ApiError::Cancelled`]; dropping the
    /// request future aborts the underlying connection.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a JSON request and parse the JSON response body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        self.cancellable(async {
            let response = self.send_json(method, path, body).await?;
            let bytes = response.bytes().await?;
            parse_json(&bytes)
        })
        .await
    }

    /// Issue a JSON request whose response body is irrelevant (e.g. a
    /// `204 No Content` delete).
    pub async fn call_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        self.cancellable(async {
            self.send_json(method, path, body).await?;
            Ok(())
        })
        .await
    }

    /// Issue a JSON request and return the raw response body.
    pub async fn call_bytes(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Artifact, ApiError> {
        self.cancellable(async {
            let response = self.send_json(method, path, body).await?;
            let headers = response.headers();
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let file_name = headers
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(disposition_file_name);
            let bytes = response.bytes().await?;
            Ok(Artifact {
                bytes,
                content_type,
                file_name,
            })
        })
        .await
    }

    /// `POST` a multipart form, reporting upload progress through
    /// `on_progress`, and parse the JSON response body.
    pub async fn upload_with_progress<T: DeserializeOwned>(
        &self,
        path: &str,
        form: UploadForm,
        on_progress: Option<ProgressFn>,
    ) -> Result<T, ApiError> {
        let multipart = form.into_multipart(self.upload_chunk_bytes, on_progress)?;
        self.cancellable(async {
            let response = self
                .client
                .post(self.url(path))
                .multipart(multipart)
                .send()
                .await?;
            let response = ensure_success(response).await?;
            let bytes = response.bytes().await?;
            parse_json(&bytes)
        })
        .await
    }

    // ---- private helpers ----

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        tracing::debug!(method = %method, path, "Calling subtitle API");

        let mut request = self
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body).map_err(ApiError::Encode)?);
        }

        let response = request.send().await?;
        ensure_success(response).await
    }

    /// Race `fut` against the cancellation token, if one is configured.
    async fn cancellable<T, F>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ApiError::Cancelled),
                    result = fut => result,
                }
            }
            None => fut.await,
        }
    }
}

/// Return the response unchanged on success, or an [`ApiError::Http`]
/// carrying the status, reason phrase and body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(ApiError::Http {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(ApiError::MalformedResponse)
}

/// Extract `filename` from a `Content-Disposition` header value.
fn disposition_file_name(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
