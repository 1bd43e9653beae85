//! Multi-file PDF merge workflow.

use super::{Controller, SuccessReport, WorkflowKind, WorkflowResult, WorkflowState};
use crate::backend::PdfBackend;
use crate::error::WorkflowError;
use crate::file::{format_file_size, SelectedFile};
use crate::notify::Notifier;
use crate::presenter::SharedPresenter;
use crate::selection::{MergeSelection, Selection, MIN_MERGE_FILES};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Merge two or more PDFs, in selection order, into one document.
pub struct MergeWorkflow {
    controller: Controller<MergeSelection>,
}

impl MergeWorkflow {
    pub fn new(
        max_file_bytes: u64,
        backend: Arc<dyn PdfBackend>,
        presenter: SharedPresenter,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            controller: Controller::new(
                WorkflowKind::Merge,
                MergeSelection::new(max_file_bytes),
                backend,
                presenter,
                notifier,
            ),
        }
    }

    /// Append a batch of files. Any invalid file rejects the whole batch.
    pub fn select_many(
        &self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Result<usize, WorkflowError> {
        self.controller.update_selection(|sel| sel.select_many(files))
    }

    /// Drop the file at `index` (0-based, selection order).
    pub fn remove_at(&self, index: usize) -> Result<SelectedFile, WorkflowError> {
        self.controller.update_selection(|sel| sel.remove_at(index))
    }

    pub fn clear(&self) {
        let _ = self.controller.update_selection(|sel| {
            sel.clear();
            Ok(())
        });
    }

    /// Upload every staged file and store the merged document.
    pub async fn submit(&self) -> Result<(), WorkflowError> {
        self.controller
            .submit(
                |sel| {
                    if sel.len() < MIN_MERGE_FILES {
                        Err(WorkflowError::InsufficientFiles { count: sel.len() })
                    } else {
                        Ok(sel.files().to_vec())
                    }
                },
                |backend, files| async move {
                    let outcome = backend.merge_pdfs(&files).await;
                    (files, outcome)
                },
                |files, result: &WorkflowResult| SuccessReport {
                    notification: format!("Successfully merged {} PDF files!", files.len()),
                    info: format!(
                        "Merged {} PDF files • Size: {}",
                        files.len(),
                        format_file_size(result.size_bytes())
                    ),
                    previewable: false,
                },
                |files| files.len(),
            )
            .await
    }

    pub fn reset(&self) {
        self.controller.reset();
    }

    /// Save the merged document as `merged-<epoch-ms>.pdf` in `dir`.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf, WorkflowError> {
        self.controller.export(dir).await
    }

    pub fn selected(&self) -> Vec<SelectedFile> {
        self.controller.inspect(|sel| sel.files().to_vec())
    }

    pub fn len(&self) -> usize {
        self.controller.inspect(|sel| sel.len())
    }

    pub fn is_empty(&self) -> bool {
        self.controller.inspect(|sel| sel.is_empty())
    }

    pub fn can_submit(&self) -> bool {
        self.controller.can_submit()
    }

    pub fn state(&self) -> WorkflowState {
        self.controller.state()
    }

    pub fn result(&self) -> Option<WorkflowResult> {
        self.controller.result()
    }
}
