//! The unit of selection: a named, typed blob supplied by the user.

use crate::error::WorkflowError;
use bytes::Bytes;
use std::path::Path;
use tracing::debug;

/// A file the user picked or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
    data: Bytes,
}

impl SelectedFile {
    /// Wrap an in-memory blob. `size_bytes` is taken from the data length.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            size_bytes: data.len() as u64,
            media_type: media_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, WorkflowError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| WorkflowError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let media_type = media_type_for(path);
        debug!("Read {} ({} bytes, {})", name, data.len(), media_type);

        Ok(Self::new(name, media_type, data))
    }

    /// Whether the media type indicates a PDF.
    ///
    /// Matches any type containing `pdf`, so `application/pdf` and
    /// `application/x-pdf` both qualify.
    pub fn is_pdf(&self) -> bool {
        self.media_type.to_ascii_lowercase().contains("pdf")
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Media type for a path based on its extension.
pub fn media_type_for(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
///
/// Base 1024, at most two decimals, trailing zeros dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}
