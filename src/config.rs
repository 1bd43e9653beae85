//! Client configuration.
//!
//! All tunable behaviour lives in [`ClientConfig`], built through
//! [`ClientConfigBuilder`] or read from the environment with
//! [`ClientConfig::from_env`]. Apart from the backend URL every field has a
//! default matching the hosted converter service.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest file accepted by either workflow: 10 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// How long a notification stays visible before it clears itself.
pub const DEFAULT_NOTIFICATION_LIFETIME_MS: u64 = 5000;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration shared by both workflows.
///
/// # Example
/// ```rust
/// use pdfdrop::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://pdf.example.com/")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "https://pdf.example.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the conversion service, without a trailing slash.
    /// Endpoints live under `{base_url}/api/`.
    pub base_url: String,

    /// Per-file size limit enforced before any upload. Default: 10 MiB.
    pub max_file_bytes: u64,

    /// Visible lifetime of a notification in milliseconds. Default: 5000.
    pub notification_lifetime_ms: u64,

    /// Optional whole-request timeout. Default: none.
    ///
    /// With no timeout a hung backend leaves the workflow in `Submitting`
    /// until the connection drops.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            notification_lifetime_ms: DEFAULT_NOTIFICATION_LIFETIME_MS,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build from `PDFDROP_API_URL`, `PDFDROP_REQUEST_TIMEOUT` and
    /// `PDFDROP_NOTIFY_MS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, WorkflowError> {
        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("PDFDROP_API_URL") {
            if !url.is_empty() {
                builder = builder.base_url(url);
            }
        }
        if let Ok(secs) = std::env::var("PDFDROP_REQUEST_TIMEOUT") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                WorkflowError::InvalidConfig(format!(
                    "PDFDROP_REQUEST_TIMEOUT must be a number of seconds, got '{secs}'"
                ))
            })?;
            builder = builder.request_timeout_secs(secs);
        }
        if let Ok(ms) = std::env::var("PDFDROP_NOTIFY_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                WorkflowError::InvalidConfig(format!(
                    "PDFDROP_NOTIFY_MS must be a number of milliseconds, got '{ms}'"
                ))
            })?;
            builder = builder.notification_lifetime_ms(ms);
        }

        builder.build()
    }

    /// Full URL of an API route, e.g. `api_url("merge-pdfs")`.
    pub fn api_url(&self, route: &str) -> String {
        format!("{}/api/{}", self.base_url, route.trim_start_matches('/'))
    }

    /// Interactive API documentation served by the backend.
    pub fn docs_url(&self) -> String {
        format!("{}/docs", self.base_url)
    }

    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_millis(self.notification_lifetime_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_bytes = bytes;
        self
    }

    pub fn notification_lifetime_ms(mut self, ms: u64) -> Self {
        self.config.notification_lifetime_ms = ms.max(1);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, WorkflowError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(WorkflowError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.max_file_bytes == 0 {
            return Err(WorkflowError::InvalidConfig(
                "max file size must be > 0".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(WorkflowError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
