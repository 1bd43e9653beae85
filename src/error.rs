//! Error types for the pdfdrop library.
//!
//! Every failure a user action can produce is a [`WorkflowError`]. The
//! `Display` text is what the user sees: workflows hand `to_string()` to the
//! error notification slot before returning the error to the caller, so the
//! messages here are written for people, not for logs.
//!
//! [`WorkflowError::NetworkOrServer`] is the one variant whose user text is
//! not its `Display`: the workflow picks between the server-supplied detail
//! and a per-operation fallback (see [`WorkflowError::user_message`]).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by selection, submission and export operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// The candidate's media type does not indicate a PDF.
    #[error("File {name} is not a PDF file")]
    Validation { name: String, media_type: String },

    /// The candidate is larger than the configured per-file limit.
    #[error("File {name} exceeds {} limit", crate::file::format_file_size(*.limit))]
    SizeLimitExceeded { name: String, size: u64, limit: u64 },

    /// `remove_at` was called with an index past the end of the selection.
    #[error("No file at position {index} (selection has {len} files)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A local file could not be read into a selection.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Submission errors ─────────────────────────────────────────────────
    /// Convert was submitted with an empty selection.
    #[error("Please select a PDF file")]
    NoFileSelected,

    /// Merge was submitted with fewer than two files.
    #[error("Please select at least 2 PDF files")]
    InsufficientFiles { count: usize },

    /// A submission for this workflow is already waiting on the backend.
    #[error("A request is already in progress")]
    SubmissionInFlight,

    /// Transport failure or non-2xx response from the backend.
    ///
    /// `status` is `None` when no response arrived at all. `detail` carries
    /// the `detail` field of the JSON error body when the server sent one.
    #[error("{reason}")]
    NetworkOrServer {
        status: Option<u16>,
        detail: Option<String>,
        reason: String,
    },

    // ── Export errors ─────────────────────────────────────────────────────
    /// Export was requested before any result arrived.
    #[error("No result available to export")]
    NoResultAvailable,

    /// The result could not be written to disk.
    #[error("Failed to write '{path}': {source}")]
    ExportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl WorkflowError {
    /// Text for the error notification.
    ///
    /// Server detail wins when present. Otherwise a response without detail
    /// gets `rejected_fallback` and a request that never got a response gets
    /// `transport_fallback`. Every other variant uses its `Display`.
    pub fn user_message(&self, rejected_fallback: &str, transport_fallback: &str) -> String {
        match self {
            WorkflowError::NetworkOrServer {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            WorkflowError::NetworkOrServer {
                status: Some(_), ..
            } => rejected_fallback.to_string(),
            WorkflowError::NetworkOrServer { status: None, .. } => transport_fallback.to_string(),
            other => other.to_string(),
        }
    }
}

/// Body of a non-2xx backend response.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_display_names_file() {
        let e = WorkflowError::SizeLimitExceeded {
            name: "big.pdf".into(),
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(e.to_string(), "File big.pdf exceeds 10 MB limit");
    }

    #[test]
    fn small_limit_is_not_rounded_to_zero() {
        let e = WorkflowError::SizeLimitExceeded {
            name: "a.pdf".into(),
            size: 600 * 1024,
            limit: 512 * 1024,
        };
        assert_eq!(e.to_string(), "File a.pdf exceeds 512 KB limit");
    }

    #[test]
    fn validation_display_names_file() {
        let e = WorkflowError::Validation {
            name: "c.txt".into(),
            media_type: "text/plain".into(),
        };
        assert!(e.to_string().contains("c.txt"));
    }

    #[test]
    fn server_detail_preferred() {
        let e = WorkflowError::NetworkOrServer {
            status: Some(400),
            detail: Some("X".into()),
            reason: "HTTP 400".into(),
        };
        assert_eq!(e.user_message("Conversion failed", "Failed to convert PDF"), "X");
    }

    #[test]
    fn rejected_without_detail_uses_rejected_fallback() {
        let e = WorkflowError::NetworkOrServer {
            status: Some(500),
            detail: None,
            reason: "HTTP 500".into(),
        };
        assert_eq!(
            e.user_message("Merge failed", "Failed to merge PDFs"),
            "Merge failed"
        );
    }

    #[test]
    fn transport_failure_uses_transport_fallback() {
        let e = WorkflowError::NetworkOrServer {
            status: None,
            detail: None,
            reason: "connection refused".into(),
        };
        assert_eq!(
            e.user_message("Merge failed", "Failed to merge PDFs"),
            "Failed to merge PDFs"
        );
        assert_eq!(e.to_string(), "connection refused");
    }

    #[test]
    fn non_network_errors_use_display() {
        let e = WorkflowError::InsufficientFiles { count: 1 };
        assert_eq!(
            e.user_message("Merge failed", "Failed to merge PDFs"),
            "Please select at least 2 PDF files"
        );
    }
}
