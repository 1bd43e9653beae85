//! Client for the PDF processing service.
//!
//! [`PdfBackend`] is the seam the workflows call through; [`HttpBackend`] is
//! the reqwest implementation that talks to the real service. Tests swap in
//! an in-memory backend without touching the workflow code.
//!
//! ## Wire format
//!
//! | Route | Body | 2xx | non-2xx |
//! |-------|------|-----|---------|
//! | `POST /api/convert-pdf-to-jpg` | multipart `file` | JPEG bytes | `{"detail": "…"}` |
//! | `POST /api/merge-pdfs` | multipart `files` (repeated, ordered) | PDF bytes | `{"detail": "…"}` |
//! | `GET /health` | – | `{"status": "healthy"}` | – |
//! | `GET /` | – | service info JSON | – |

use crate::config::ClientConfig;
use crate::error::{ErrorBody, WorkflowError};
use crate::file::SelectedFile;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const CONVERT_ROUTE: &str = "convert-pdf-to-jpg";
pub const MERGE_ROUTE: &str = "merge-pdfs";

/// Operations the workflows need from the processing service.
#[async_trait]
pub trait PdfBackend: Send + Sync {
    /// Render the first page of `file` to a JPEG.
    async fn convert_to_jpg(&self, file: &SelectedFile) -> Result<Bytes, WorkflowError>;

    /// Concatenate `files` in order into one PDF.
    async fn merge_pdfs(&self, files: &[SelectedFile]) -> Result<Bytes, WorkflowError>;

    /// Liveness check.
    async fn health(&self) -> Result<HealthStatus, WorkflowError>;
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// [`PdfBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, WorkflowError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| WorkflowError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the service description from `GET /`.
    pub async fn service_info(&self) -> Result<ServiceInfo, WorkflowError> {
        let url = format!("{}/", self.config.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(decode_error)
    }

    async fn post_form(&self, route: &str, form: Form) -> Result<Bytes, WorkflowError> {
        let url = self.config.api_url(route);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let body = response.bytes().await.map_err(transport_error)?;
        info!("POST {} → {} bytes", url, body.len());
        Ok(body)
    }
}

#[async_trait]
impl PdfBackend for HttpBackend {
    async fn convert_to_jpg(&self, file: &SelectedFile) -> Result<Bytes, WorkflowError> {
        let form = Form::new().part("file", file_part(file)?);
        self.post_form(CONVERT_ROUTE, form).await
    }

    async fn merge_pdfs(&self, files: &[SelectedFile]) -> Result<Bytes, WorkflowError> {
        let mut form = Form::new();
        for file in files {
            form = form.part("files", file_part(file)?);
        }
        self.post_form(MERGE_ROUTE, form).await
    }

    async fn health(&self) -> Result<HealthStatus, WorkflowError> {
        let url = format!("{}/health", self.config.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        let response = ensure_success(response).await?;
        response.json().await.map_err(decode_error)
    }
}

fn file_part(file: &SelectedFile) -> Result<Part, WorkflowError> {
    Part::bytes(file.data().to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.media_type)
        .map_err(|e| {
            warn!("Cannot encode {} as {}: {}", file.name, file.media_type, e);
            WorkflowError::NetworkOrServer {
                status: None,
                detail: None,
                reason: format!("Invalid media type for {}: {e}", file.name),
            }
        })
}

/// Turn a non-2xx response into `NetworkOrServer`, pulling `detail` out of
/// the JSON body when there is one.
async fn ensure_success(response: Response) -> Result<Response, WorkflowError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.detail);
    warn!("Backend returned HTTP {}: {}", status, text);

    Err(WorkflowError::NetworkOrServer {
        status: Some(status.as_u16()),
        detail,
        reason: format!("HTTP {status}"),
    })
}

fn transport_error(e: reqwest::Error) -> WorkflowError {
    warn!("Request failed: {}", e);
    WorkflowError::NetworkOrServer {
        status: e.status().map(|s| s.as_u16()),
        detail: None,
        reason: if e.is_timeout() {
            "Request timed out".to_string()
        } else {
            e.to_string()
        },
    }
}

fn decode_error(e: reqwest::Error) -> WorkflowError {
    WorkflowError::NetworkOrServer {
        status: None,
        detail: None,
        reason: format!("Unexpected response body: {e}"),
    }
}
