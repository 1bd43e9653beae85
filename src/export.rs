//! Saving workflow results to disk.
//!
//! Results are written under a timestamp-qualified name
//! (`converted-1718000000000.jpg`, `merged-1718000000000.pdf`) so repeated
//! exports never overwrite each other. Writes go to a temp file that is
//! renamed into place, so a crash never leaves a half-written result behind.

use crate::error::WorkflowError;
use crate::workflow::WorkflowResult;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix and extension of an exported file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilenameTemplate {
    pub prefix: &'static str,
    pub extension: &'static str,
}

impl FilenameTemplate {
    pub const CONVERTED: Self = Self {
        prefix: "converted",
        extension: "jpg",
    };

    pub const MERGED: Self = Self {
        prefix: "merged",
        extension: "pdf",
    };

    /// `<prefix>-<epoch_ms>.<extension>`
    pub fn render(&self, epoch_ms: i64) -> String {
        format!("{}-{}.{}", self.prefix, epoch_ms, self.extension)
    }
}

/// Write `result` into `dir` and return the path written.
///
/// Fails with [`WorkflowError::NoResultAvailable`] when `result` is `None`.
pub async fn export(
    result: Option<&WorkflowResult>,
    template: FilenameTemplate,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, WorkflowError> {
    let result = result.ok_or(WorkflowError::NoResultAvailable)?;
    let dir = dir.as_ref();
    let path = dir.join(template.render(chrono::Utc::now().timestamp_millis()));

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| WorkflowError::ExportWriteFailed {
            path: path.clone(),
            source,
        })?;

    // Atomic write: write to temp, then rename
    let tmp_path = path.with_extension(format!("{}.tmp", template.extension));
    tokio::fs::write(&tmp_path, result.data())
        .await
        .map_err(|source| WorkflowError::ExportWriteFailed {
            path: path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|source| WorkflowError::ExportWriteFailed {
            path: path.clone(),
            source,
        })?;

    info!("Exported {} bytes to {}", result.size_bytes(), path.display());
    Ok(path)
}
