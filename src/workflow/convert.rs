//! Single-file PDF → JPG workflow.

use super::{Controller, SuccessReport, WorkflowKind, WorkflowResult, WorkflowState};
use crate::backend::PdfBackend;
use crate::error::WorkflowError;
use crate::file::{format_file_size, SelectedFile};
use crate::notify::Notifier;
use crate::presenter::SharedPresenter;
use crate::selection::{ConvertSelection, Selection};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Convert the first page of one PDF into a JPG.
pub struct ConvertWorkflow {
    controller: Controller<ConvertSelection>,
}

impl ConvertWorkflow {
    pub fn new(
        max_file_bytes: u64,
        backend: Arc<dyn PdfBackend>,
        presenter: SharedPresenter,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            controller: Controller::new(
                WorkflowKind::Convert,
                ConvertSelection::new(max_file_bytes),
                backend,
                presenter,
                notifier,
            ),
        }
    }

    /// Stage `file`, replacing any file already staged.
    pub fn select(&self, file: SelectedFile) -> Result<(), WorkflowError> {
        self.controller.update_selection(|sel| sel.select(file))
    }

    /// Unstage the current file.
    pub fn clear(&self) {
        // Clearing cannot fail.
        let _ = self.controller.update_selection(|sel| {
            sel.clear();
            Ok(())
        });
    }

    /// Upload the staged file and store the returned image.
    pub async fn submit(&self) -> Result<(), WorkflowError> {
        self.controller
            .submit(
                |sel| sel.file().cloned().ok_or(WorkflowError::NoFileSelected),
                |backend, file| async move {
                    let outcome = backend.convert_to_jpg(&file).await;
                    (file, outcome)
                },
                |_file, result: &WorkflowResult| SuccessReport {
                    notification: "PDF converted to JPG successfully!".to_string(),
                    info: format!(
                        "File size: {} • Format: JPG",
                        format_file_size(result.size_bytes())
                    ),
                    previewable: true,
                },
                |_file| 1,
            )
            .await
    }

    pub fn reset(&self) {
        self.controller.reset();
    }

    /// Save the current image as `converted-<epoch-ms>.jpg` in `dir`.
    pub async fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf, WorkflowError> {
        self.controller.export(dir).await
    }

    pub fn selected(&self) -> Option<SelectedFile> {
        self.controller.inspect(|sel| sel.file().cloned())
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
