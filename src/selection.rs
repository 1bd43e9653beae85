//! Per-workflow selection state and candidate validation.
//!
//! Convert holds at most one file; merge holds an ordered list that grows
//! across selection events. Both validate with [`validate`] before touching
//! their state, so a rejected candidate never leaves a partial change behind.

use crate::error::WorkflowError;
use crate::file::SelectedFile;
use crate::presenter::FileSummary;
use tracing::debug;

/// Merge needs at least this many files before it can be submitted.
pub const MIN_MERGE_FILES: usize = 2;

/// Check one candidate against the media-type and size rules.
///
/// The media type must name a PDF and be well-formed enough to go into a
/// multipart header.
pub fn validate(file: &SelectedFile, max_file_bytes: u64) -> Result<(), WorkflowError> {
    if !file.is_pdf() || file.media_type.parse::<mime_guess::Mime>().is_err() {
        return Err(WorkflowError::Validation {
            name: file.name.clone(),
            media_type: file.media_type.clone(),
        });
    }
    if file.size_bytes > max_file_bytes {
        return Err(WorkflowError::SizeLimitExceeded {
            name: file.name.clone(),
            size: file.size_bytes,
            limit: max_file_bytes,
        });
    }
    Ok(())
}

/// What a workflow controller needs from its selection state.
pub trait Selection: Send {
    /// Display rows for the current selection, in order.
    fn summaries(&self) -> Vec<FileSummary>;

    /// Whether the submit trigger should be enabled.
    fn can_submit(&self) -> bool;

    /// Drop every selected file.
    fn clear(&mut self);
}

/// Single-slot selection used by the convert workflow.
#[derive(Debug, Clone)]
pub struct ConvertSelection {
    file: Option<SelectedFile>,
    max_file_bytes: u64,
}

impl ConvertSelection {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            file: None,
            max_file_bytes,
        }
    }

    /// Replace the current file. On error the previous file is kept.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), WorkflowError> {
        validate(&file, self.max_file_bytes)?;
        debug!("Convert selection: {}", file.name);
        self.file = Some(file);
        Ok(())
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }
}

impl Selection for ConvertSelection {
    fn summaries(&self) -> Vec<FileSummary> {
        self.file.iter().map(FileSummary::from).collect()
    }

    fn can_submit(&self) -> bool {
        self.file.is_some()
    }

    fn clear(&mut self) {
        self.file = None;
    }
}

/// Ordered, accumulating selection used by the merge workflow.
///
/// Duplicates are allowed: the same file picked twice is merged twice.
#[derive(Debug, Clone)]
pub struct MergeSelection {
    files: Vec<SelectedFile>,
    max_file_bytes: u64,
}

impl MergeSelection {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            files: Vec::new(),
            max_file_bytes,
        }
    }

    /// Append a batch, all or nothing.
    ///
    /// The first invalid candidate rejects the whole batch. Files admitted by
    /// earlier calls are never affected.
    pub fn select_many(
        &mut self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Result<usize, WorkflowError> {
        let batch: Vec<SelectedFile> = files.into_iter().collect();
        for file in &batch {
            validate(file, self.max_file_bytes)?;
        }
        let added = batch.len();
        self.files.extend(batch);
        debug!("Merge selection: +{} → {} files", added, self.files.len());
        Ok(added)
    }

    /// Remove the entry at `index`, returning it.
    pub fn remove_at(&mut self, index: usize) -> Result<SelectedFile, WorkflowError> {
        if index >= self.files.len() {
            return Err(WorkflowError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(self.files.remove(index))
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Selection for MergeSelection {
    fn summaries(&self) -> Vec<FileSummary> {
        self.files.iter().map(FileSummary::from).collect()
    }

    fn can_submit(&self) -> bool {
        self.files.len() >= MIN_MERGE_FILES
    }

    fn clear(&mut self) {
        self.files.clear();
    }
}
