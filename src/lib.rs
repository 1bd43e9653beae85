//! # pdfdrop
//!
//! Select, validate and upload PDFs to a processing service, then preview
//! and export what comes back.
//!
//! Two workflows share one lifecycle:
//!
//! - **Convert**: one PDF in, a JPG of its first page out.
//! - **Merge**: two or more PDFs in, one concatenated PDF out, in the order
//!   they were selected.
//!
//! ## Flow
//!
//! ```text
//! host input ──▶ AppEvent ──▶ App::dispatch
//!                                 │
//!                                 ├─ 1. Select   validate type (PDF) and size (≤ 10 MB)
//!                                 ├─ 2. Submit   multipart POST via PdfBackend
//!                                 ├─ 3. Result   stored, previewed, exportable
//!                                 └─ 4. Notify   success / error, auto-cleared after 5 s
//!                                 │
//!                          Presenter ◀── every visible change
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfdrop::{App, AppEvent, ClientConfig, NoopPresenter, SelectedFile};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let app = App::connect(config, Arc::new(NoopPresenter))?;
//!
//!     let a = SelectedFile::from_path("a.pdf").await?;
//!     let b = SelectedFile::from_path("b.pdf").await?;
//!     app.dispatch(AppEvent::SelectMerge(vec![a, b])).await?;
//!     app.dispatch(AppEvent::SubmitMerge).await?;
//!     app.dispatch(AppEvent::ExportMerge("out".into())).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfdrop` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfdrop = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod file;
pub mod notify;
pub mod presenter;
pub mod selection;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use app::{App, AppEvent, Dispatched};
pub use backend::{HealthStatus, HttpBackend, PdfBackend, ServiceInfo};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::WorkflowError;
pub use export::{export, FilenameTemplate};
pub use file::{format_file_size, SelectedFile};
pub use notify::{NotificationKind, Notifier};
pub use presenter::{FileSummary, NoopPresenter, Presenter, ResultSummary, SharedPresenter};
pub use selection::{ConvertSelection, MergeSelection, Selection, MIN_MERGE_FILES};
pub use workflow::{
    ConvertWorkflow, MergeWorkflow, ResultHandle, WorkflowKind, WorkflowResult, WorkflowState,
};
