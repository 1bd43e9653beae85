//! Rendering seam between the workflows and whatever draws them.
//!
//! Workflows never touch a UI directly. They report every visible change to
//! an [`Arc<dyn Presenter>`]: the selection list, the submit trigger, the
//! progress indicator, the result panel and the two notification slots. A
//! terminal, a web front-end or a test recorder all plug in the same way.
//!
//! # Example
//!
//! ```rust
//! use pdfdrop::{Presenter, WorkflowKind, WorkflowState};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct StateLog(Mutex<Vec<(WorkflowKind, WorkflowState)>>);
//!
//! impl Presenter for StateLog {
//!     fn on_state_changed(&self, workflow: WorkflowKind, state: WorkflowState) {
//!         self.0.lock().unwrap().push((workflow, state));
//!     }
//! }
//! ```

use crate::file::{format_file_size, SelectedFile};
use crate::notify::NotificationKind;
use crate::workflow::{ResultHandle, WorkflowKind, WorkflowState};
use std::sync::Arc;

/// Display metadata for one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: u64,
    /// Pre-formatted size, e.g. `"2 MB"`.
    pub size_label: String,
}

impl From<&SelectedFile> for FileSummary {
    fn from(file: &SelectedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            size_label: format_file_size(file.size_bytes),
        }
    }
}

/// What the result panel shows after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub handle: ResultHandle,
    pub size_bytes: u64,
    /// One-line description, e.g. `"Merged 2 PDF files • Size: 4 MB"`.
    pub info: String,
    /// Whether the payload can be previewed inline (convert images only).
    pub previewable: bool,
}

/// Receives every UI-visible change from the workflows.
///
/// All methods default to no-ops so implementations only override what they
/// draw. Convert and merge may run at the same time, so calls can arrive
/// from different tasks; implementations guard shared state themselves.
pub trait Presenter: Send + Sync {
    /// The selection list or the submit trigger's availability changed.
    fn on_selection_changed(&self, workflow: WorkflowKind, files: &[FileSummary], can_submit: bool) {
        let _ = (workflow, files, can_submit);
    }

    /// The workflow moved to a new state. `Submitting` means the trigger is
    /// disabled and progress is visible; every other state re-enables it.
    fn on_state_changed(&self, workflow: WorkflowKind, state: WorkflowState) {
        let _ = (workflow, state);
    }

    /// A new result is available for preview and export.
    fn on_result_ready(&self, workflow: WorkflowKind, result: &ResultSummary) {
        let _ = (workflow, result);
    }

    /// A result is no longer displayed; release anything tied to `handle`.
    fn on_result_released(&self, workflow: WorkflowKind, handle: ResultHandle) {
        let _ = (workflow, handle);
    }

    /// A notification slot now shows `text`.
    fn on_notification_shown(&self, kind: NotificationKind, text: &str) {
        let _ = (kind, text);
    }

    /// A notification slot was emptied (timer expiry or dismissal).
    fn on_notification_cleared(&self, kind: NotificationKind) {
        let _ = kind;
    }
}

/// Presenter that draws nothing.
pub struct NoopPresenter;

impl Presenter for NoopPresenter {}

/// Shared handle type stored by workflows and the notifier.
pub type SharedPresenter = Arc<dyn Presenter>;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_presenter_does_not_panic() {
        let p = NoopPresenter;
        p.on_selection_changed(WorkflowKind::Merge, &[], false);
        p.on_state_changed(WorkflowKind::Convert, WorkflowState::Submitting);
        p.on_notification_shown(NotificationKind::Error, "oops");
        p.on_notification_cleared(NotificationKind::Error);
    }

    #[test]
    fn file_summary_formats_size() {
        let f = SelectedFile::new("a.pdf", "application/pdf", vec![0u8; 2 * 1024 * 1024]);
        let s = FileSummary::from(&f);
        assert_eq!(s.name, "a.pdf");
        assert_eq!(s.size_label, "2 MB");
    }

    #[test]
    fn arc_dyn_presenter_works() {
        let p: SharedPresenter = Arc::new(NoopPresenter);
        p.on_result_released(WorkflowKind::Convert, ResultHandle::next());
    }
}
