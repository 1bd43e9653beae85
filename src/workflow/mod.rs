//! Upload workflows: selection, submission and result lifecycle.
//!
//! Both workflows share one state machine:
//!
//! ```text
//!          submit()            2xx
//!   Idle ───────────▶ Submitting ──────▶ Success
//!    ▲                    │                 │
//!    │                    └──────▶ Failed   │
//!    │        reset()              │        │
//!    └─────────────────────────────┴────────┘
//! ```
//!
//! [`Controller`] implements it once, generic over the selection type;
//! [`convert`] and [`merge`] add the workflow-specific selection operations,
//! request and messages on top.
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await` or while calling the presenter. A second `submit()` while one is
//! in flight is refused, so each workflow has at most one outstanding
//! request. The two workflows share nothing and can be in flight together.

pub mod convert;
pub mod merge;

use crate::backend::PdfBackend;
use crate::error::WorkflowError;
use crate::export::{self, FilenameTemplate};
use crate::notify::Notifier;
use crate::presenter::{ResultSummary, SharedPresenter};
use crate::selection::Selection;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub use convert::ConvertWorkflow;
pub use merge::MergeWorkflow;

/// Which of the two workflows an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowKind {
    Convert,
    Merge,
}

impl WorkflowKind {
    pub fn template(self) -> FilenameTemplate {
        match self {
            WorkflowKind::Convert => FilenameTemplate::CONVERTED,
            WorkflowKind::Merge => FilenameTemplate::MERGED,
        }
    }

    /// Error text when the server rejects a request without saying why.
    fn rejected_fallback(self) -> &'static str {
        match self {
            WorkflowKind::Convert => "Conversion failed",
            WorkflowKind::Merge => "Merge failed",
        }
    }

    /// Error text when no response arrived at all.
    fn transport_fallback(self) -> &'static str {
        match self {
            WorkflowKind::Convert => "Failed to convert PDF",
            WorkflowKind::Merge => "Failed to merge PDFs",
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::Convert => f.write_str("convert"),
            WorkflowKind::Merge => f.write_str("merge"),
        }
    }
}

/// Submission state of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkflowState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

/// Opaque id for a displayed result, released when the result goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

impl ResultHandle {
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Payload returned by the backend for one successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResult {
    handle: ResultHandle,
    data: Bytes,
    source_files: usize,
}

impl WorkflowResult {
    pub fn new(data: Bytes, source_files: usize) -> Self {
        Self {
            handle: ResultHandle::next(),
            data,
            source_files,
        }
    }

    pub fn handle(&self) -> ResultHandle {
        self.handle
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Number of files that went into this result.
    pub fn source_files(&self) -> usize {
        self.source_files
    }
}

/// Text shown for a successful submission.
pub(crate) struct SuccessReport {
    pub notification: String,
    pub info: String,
    pub previewable: bool,
}

struct Inner<S> {
    selection: S,
    state: WorkflowState,
    result: Option<WorkflowResult>,
    /// Bumped by `reset()`; a completion from an older epoch is discarded.
    epoch: u64,
}

/// Shared state machine behind both workflows.
pub(crate) struct Controller<S> {
    kind: WorkflowKind,
    backend: Arc<dyn PdfBackend>,
    presenter: SharedPresenter,
    notifier: Arc<Notifier>,
    inner: Mutex<Inner<S>>,
}

impl<S: Selection> Controller<S> {
    pub fn new(
        kind: WorkflowKind,
        selection: S,
        backend: Arc<dyn PdfBackend>,
        presenter: SharedPresenter,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            kind,
            backend,
            presenter,
            notifier,
            inner: Mutex::new(Inner {
                selection,
                state: WorkflowState::Idle,
                result: None,
                epoch: 0,
            }),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.lock().state
    }

    pub fn result(&self) -> Option<WorkflowResult> {
        self.lock().result.clone()
    }

    pub fn can_submit(&self) -> bool {
        let inner = self.lock();
        inner.state != WorkflowState::Submitting && inner.selection.can_submit()
    }

    /// Read the selection without changing it.
    pub fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().selection)
    }

    /// Apply a selection change and re-render the list on success.
    /// Failures leave the selection as it was and raise an error notification.
    pub fn update_selection<R>(
        &self,
        f: impl FnOnce(&mut S) -> Result<R, WorkflowError>,
    ) -> Result<R, WorkflowError> {
        let outcome = {
            let mut inner = self.lock();
            f(&mut inner.selection).map(|value| {
                let can_submit =
                    inner.state != WorkflowState::Submitting && inner.selection.can_submit();
                (value, inner.selection.summaries(), can_submit)
            })
        };

        match outcome {
            Ok((value, summaries, can_submit)) => {
                self.presenter
                    .on_selection_changed(self.kind, &summaries, can_submit);
                Ok(value)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Run one submission: snapshot the selection, call the backend, record
    /// the outcome.
    ///
    /// Any result from an earlier submission is released as soon as the new
    /// request starts, so a failed resubmission leaves nothing to export.
    /// If `reset()` ran while the request was out, the outcome is not stored
    /// or notified but is still returned.
    ///
    /// `prepare` turns the selection into the request payload or refuses with
    /// a precondition error (no network call is made in that case). `send`
    /// performs the request. `describe` builds the success texts from the
    /// payload and the result.
    pub async fn submit<P, F, Fut>(
        &self,
        prepare: impl FnOnce(&S) -> Result<P, WorkflowError>,
        send: F,
        describe: impl FnOnce(&P, &WorkflowResult) -> SuccessReport,
        source_files: impl FnOnce(&P) -> usize,
    ) -> Result<(), WorkflowError>
    where
        F: FnOnce(Arc<dyn PdfBackend>, P) -> Fut,
        Fut: std::future::Future<Output = (P, Result<Bytes, WorkflowError>)>,
    {
        let (payload, epoch, hidden) = {
            let mut inner = self.lock();
            if inner.state == WorkflowState::Submitting {
                drop(inner);
                return Err(self.report(WorkflowError::SubmissionInFlight));
            }
            let prepared = prepare(&inner.selection);
            match prepared {
                Ok(payload) => {
                    inner.state = WorkflowState::Submitting;
                    let hidden = inner.result.take().map(|r| r.handle());
                    (payload, inner.epoch, hidden)
                }
                Err(e) => {
                    drop(inner);
                    return Err(self.report(e));
                }
            }
        };
        info!("Submitting {} request", self.kind);
        if let Some(handle) = hidden {
            self.presenter.on_result_released(self.kind, handle);
        }
        self.presenter
            .on_state_changed(self.kind, WorkflowState::Submitting);

        let (payload, outcome) = send(Arc::clone(&self.backend), payload).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            // Reset while the request was in flight: nothing is stored or
            // announced, but the caller still learns how the request ended.
            inner.state = WorkflowState::Idle;
            drop(inner);
            debug!("Discarding {} outcome after reset", self.kind);
            self.presenter.on_state_changed(self.kind, WorkflowState::Idle);
            return outcome.map(|_| ());
        }

        match outcome {
            Ok(data) => {
                let result = WorkflowResult::new(data, source_files(&payload));
                let report = describe(&payload, &result);
                let summary = ResultSummary {
                    handle: result.handle(),
                    size_bytes: result.size_bytes(),
                    info: report.info,
                    previewable: report.previewable,
                };
                inner.result = Some(result);
                inner.state = WorkflowState::Success;
                drop(inner);

                info!("{} succeeded: {} bytes", self.kind, summary.size_bytes);
                self.presenter
                    .on_state_changed(self.kind, WorkflowState::Success);
                self.presenter.on_result_ready(self.kind, &summary);
                self.notifier.success(report.notification);
                Ok(())
            }
            Err(e) => {
                inner.state = WorkflowState::Failed;
                drop(inner);

                warn!("{} failed: {}", self.kind, e);
                self.presenter
                    .on_state_changed(self.kind, WorkflowState::Failed);
                Err(self.report(e))
            }
        }
    }

    /// Clear selection and result and return to `Idle`.
    ///
    /// A request already in flight cannot be cancelled; its outcome is
    /// discarded when it lands and the state stays `Submitting` until then.
    pub fn reset(&self) {
        let (released, in_flight) = {
            let mut inner = self.lock();
            inner.selection.clear();
            inner.epoch += 1;
            let in_flight = inner.state == WorkflowState::Submitting;
            if !in_flight {
                inner.state = WorkflowState::Idle;
            }
            (inner.result.take().map(|r| r.handle()), in_flight)
        };

        debug!("Reset {} workflow", self.kind);
        if let Some(handle) = released {
            self.presenter.on_result_released(self.kind, handle);
        }
        self.presenter.on_selection_changed(self.kind, &[], false);
        if !in_flight {
            self.presenter.on_state_changed(self.kind, WorkflowState::Idle);
        }
    }

    /// Write the current result into `dir`.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf, WorkflowError> {
        let result = self.result();
        export::export(result.as_ref(), self.kind.template(), dir)
            .await
            .map_err(|e| self.report(e))
    }

    /// Surface `e` as an error notification and hand it back.
    fn report(&self, e: WorkflowError) -> WorkflowError {
        let text = e.user_message(self.kind.rejected_fallback(), self.kind.transport_fallback());
        self.notifier.error(text);
        e
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
