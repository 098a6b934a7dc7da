// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Network client seam.
//
// Method bodies never touch reqwest directly; they see these traits, the
// production `ReqwestClient` behind them, and fakes in tests. Bodies stream
// responses chunk by chunk so a large download never sits in memory.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, instrument};

use sparkling_core::error::{Result, SparklingError};

/// Convert a `reqwest::Error` into a `SparklingError::Http`.
fn http_err(e: reqwest::Error) -> SparklingError {
    SparklingError::Http(e.to_string())
}

/// One outbound GET.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response head plus a consumable body stream.
pub struct HttpResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    pub body: Box<dyn ByteStream>,
}

/// One multipart file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: String,
    /// Form field name the file is posted under.
    pub field: String,
    pub file_name: String,
    pub file_path: PathBuf,
    pub mime: Option<String>,
    pub headers: Vec<(String, String)>,
}

/// Upload outcome. The status is surfaced as-is; callers decide what a
/// non-2xx means for them.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

/// Pull-based response body.
#[async_trait]
pub trait ByteStream: Send {
    /// Next chunk, or `None` once the body is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// HTTP operations the media methods need.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse>;
    async fn post_file(&self, request: UploadRequest) -> Result<UploadResponse>;
}

// ---------------------------------------------------------------------------
// Production implementation
// ---------------------------------------------------------------------------

/// `NetworkClient` backed by a shared reqwest client.
///
/// Only the connect phase carries a client-level timeout; download bodies
/// are open-ended and get per-chunk deadlines from the consumer instead.
pub struct ReqwestClient {
    client: reqwest::Client,
    upload_timeout: Duration,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(http_err)?;
        Ok(Self {
            client,
            upload_timeout: timeout,
        })
    }
}

#[async_trait]
impl NetworkClient for ReqwestClient {
    #[instrument(skip(self), fields(url = %request.url))]
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.send().await.map_err(http_err)?;
        let status = response.status().as_u16();
        let content_length = response.content_length();
        debug!(status, ?content_length, "response headers received");
        Ok(HttpResponse {
            status,
            content_length,
            body: Box::new(ReqwestBody { inner: response }),
        })
    }

    #[instrument(skip(self), fields(url = %request.url, file = %request.file_path.display()))]
    async fn post_file(&self, request: UploadRequest) -> Result<UploadResponse> {
        let bytes = tokio::fs::read(&request.file_path).await?;
        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(request.file_name.clone());
        if let Some(mime) = &request.mime {
            part = part.mime_str(mime).map_err(http_err)?;
        }
        let form = reqwest::multipart::Form::new().part(request.field.clone(), part);

        let mut builder = self
            .client
            .post(&request.url)
            .timeout(self.upload_timeout)
            .multipart(form);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.send().await.map_err(http_err)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(http_err)?;
        debug!(status, body_len = body.len(), "upload response received");
        Ok(UploadResponse { status, body })
    }
}

struct ReqwestBody {
    inner: reqwest::Response,
}

#[async_trait]
impl ByteStream for ReqwestBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        self.inner.chunk().await.map_err(http_err)
    }
}
