//! Event routing for a host UI.
//!
//! A host turns its input (clicks, drops, key presses, CLI arguments) into
//! [`AppEvent`]s and hands them to [`App::dispatch`]. `App` owns both
//! workflows and the shared [`Notifier`]; everything visible flows back out
//! through the [`Presenter`](crate::presenter::Presenter) it was built with.

use crate::backend::{HttpBackend, PdfBackend};
use crate::config::ClientConfig;
use crate::error::WorkflowError;
use crate::file::SelectedFile;
use crate::notify::Notifier;
use crate::presenter::SharedPresenter;
use crate::workflow::{ConvertWorkflow, MergeWorkflow, WorkflowKind};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// A user action.
#[derive(Debug, Clone)]
pub enum AppEvent {
    SelectConvert(SelectedFile),
    ClearConvert,
    SubmitConvert,
    ResetConvert,
    ExportConvert(PathBuf),

    SelectMerge(Vec<SelectedFile>),
    RemoveMerge(usize),
    ClearMerge,
    SubmitMerge,
    ResetMerge,
    ExportMerge(PathBuf),

    DismissNotifications,
}

impl AppEvent {
    /// Workflow the event targets, if any.
    pub fn workflow(&self) -> Option<WorkflowKind> {
        use AppEvent::*;
        match self {
            SelectConvert(_) | ClearConvert | SubmitConvert | ResetConvert | ExportConvert(_) => {
                Some(WorkflowKind::Convert)
            }
            SelectMerge(_) | RemoveMerge(_) | ClearMerge | SubmitMerge | ResetMerge
            | ExportMerge(_) => Some(WorkflowKind::Merge),
            DismissNotifications => None,
        }
    }
}

/// What a successfully handled event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Done,
    /// Files appended to the merge selection.
    Added(usize),
    /// File dropped from the merge selection.
    Removed(String),
    /// Path an export was written to.
    Exported(PathBuf),
}

/// Both workflows plus the notifier they share.
pub struct App {
    convert: ConvertWorkflow,
    merge: MergeWorkflow,
    notifier: Arc<Notifier>,
}

impl App {
    pub fn new(
        config: &ClientConfig,
        backend: Arc<dyn PdfBackend>,
        presenter: SharedPresenter,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(
            Arc::clone(&presenter),
            config.notification_lifetime(),
        ));
        Self {
            convert: ConvertWorkflow::new(
                config.max_file_bytes,
                Arc::clone(&backend),
                Arc::clone(&presenter),
                Arc::clone(&notifier),
            ),
            merge: MergeWorkflow::new(config.max_file_bytes, backend, presenter, Arc::clone(&notifier)),
            notifier,
        }
    }

    /// Build an `App` talking to the HTTP service described by `config`.
    pub fn connect(config: ClientConfig, presenter: SharedPresenter) -> Result<Self, WorkflowError> {
        let backend = HttpBackend::new(config.clone())?;
        Ok(Self::new(&config, Arc::new(backend), presenter))
    }

    /// Route one event to its workflow.
    ///
    /// Errors have already been shown as notifications by the time they are
    /// returned here.
    pub async fn dispatch(&self, event: AppEvent) -> Result<Dispatched, WorkflowError> {
        debug!("Dispatch {:?}", event.workflow());
        match event {
            AppEvent::SelectConvert(file) => self.convert.select(file).map(|_| Dispatched::Done),
            AppEvent::ClearConvert => {
                self.convert.clear();
                Ok(Dispatched::Done)
            }
            AppEvent::SubmitConvert => self.convert.submit().await.map(|_| Dispatched::Done),
            AppEvent::ResetConvert => {
                self.convert.reset();
                Ok(Dispatched::Done)
            }
            AppEvent::ExportConvert(dir) => self.convert.export(dir).await.map(Dispatched::Exported),

            AppEvent::SelectMerge(files) => self.merge.select_many(files).map(Dispatched::Added),
            AppEvent::RemoveMerge(index) => self
                .merge
                .remove_at(index)
                .map(|file| Dispatched::Removed(file.name)),
            AppEvent::ClearMerge => {
                self.merge.clear();
                Ok(Dispatched::Done)
            }
            AppEvent::SubmitMerge => self.merge.submit().await.map(|_| Dispatched::Done),
            AppEvent::ResetMerge => {
                self.merge.reset();
                Ok(Dispatched::Done)
            }
            AppEvent::ExportMerge(dir) => self.merge.export(dir).await.map(Dispatched::Exported),

            AppEvent::DismissNotifications => {
                self.notifier.dismiss();
                Ok(Dispatched::Done)
            }
        }
    }

    pub fn convert(&self) -> &ConvertWorkflow {
        &self.convert
    }

    pub fn merge(&self) -> &MergeWorkflow {
        &self.merge
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{MockBackend, Reply};
    use crate::notify::NotificationKind;
    use crate::presenter::testing::{Event, RecordingPresenter};
    use crate::workflow::WorkflowState;
    use std::time::Duration;

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(name, "application/pdf", vec![0u8; 64])
    }

    fn app(backend: MockBackend) -> (Arc<RecordingPresenter>, App) {
        let presenter = Arc::new(RecordingPresenter::default());
        let config = ClientConfig::default();
        let app = App::new(&config, Arc::new(backend), presenter.clone());
        (presenter, app)
    }

    #[test]
    fn events_know_their_workflow() {
        assert_eq!(AppEvent::SubmitConvert.workflow(), Some(WorkflowKind::Convert));
        assert_eq!(AppEvent::RemoveMerge(0).workflow(), Some(WorkflowKind::Merge));
        assert_eq!(AppEvent::DismissNotifications.workflow(), None);
    }

    #[tokio::test]
    async fn routes_selection_events() {
        let (_, app) = app(MockBackend::new(Reply::Ok(vec![1]), Reply::Ok(vec![2])));

        let added = app
            .dispatch(AppEvent::SelectMerge(vec![pdf("a.pdf"), pdf("b.pdf")]))
            .await
            .unwrap();
        assert_eq!(added, Dispatched::Added(2));

        let removed = app.dispatch(AppEvent::RemoveMerge(0)).await.unwrap();
        assert_eq!(removed, Dispatched::Removed("a.pdf".into()));
        assert_eq!(app.merge().len(), 1);

        app.dispatch(AppEvent::SelectConvert(pdf("c.pdf"))).await.unwrap();
        assert!(app.convert().can_submit());
        app.dispatch(AppEvent::ClearConvert).await.unwrap();
        assert!(!app.convert().can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn convert_and_merge_run_concurrently() {
        let backend = MockBackend::new(Reply::Ok(vec![0xFF, 0xD8]), Reply::Ok(vec![b'%'; 8]))
            .with_delay(Duration::from_millis(200));
        let (presenter, app) = app(backend);

        app.dispatch(AppEvent::SelectConvert(pdf("one.pdf"))).await.unwrap();
        app.dispatch(AppEvent::SelectMerge(vec![pdf("a.pdf"), pdf("b.pdf")]))
            .await
            .unwrap();

        let (convert, merge) = tokio::join!(
            app.dispatch(AppEvent::SubmitConvert),
            app.dispatch(AppEvent::SubmitMerge)
        );
        convert.unwrap();
        merge.unwrap();

        assert_eq!(app.convert().state(), WorkflowState::Success);
        assert_eq!(app.merge().state(), WorkflowState::Success);
        assert_eq!(app.convert().result().unwrap().size_bytes(), 2);
        assert_eq!(app.merge().result().unwrap().size_bytes(), 8);

        // Both went Submitting before either finished.
        let states: Vec<_> = presenter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::State(w, s) => Some((w, s)),
                _ => None,
            })
            .collect();
        assert_eq!(
            &states[..2],
            &[
                (WorkflowKind::Convert, WorkflowState::Submitting),
                (WorkflowKind::Merge, WorkflowState::Submitting),
            ]
        );
        assert!(app.notifier().current(NotificationKind::Success).is_some());
    }

    #[tokio::test]
    async fn dismiss_clears_both_slots() {
        let (_, app) = app(MockBackend::new(Reply::Ok(vec![1]), Reply::Ok(vec![1])));
        app.dispatch(AppEvent::SubmitConvert).await.unwrap_err();
        app.notifier().success("done");
        assert!(app.notifier().current(NotificationKind::Error).is_some());

        app.dispatch(AppEvent::DismissNotifications).await.unwrap();
        assert!(app.notifier().current(NotificationKind::Error).is_none());
        assert!(app.notifier().current(NotificationKind::Success).is_none());
    }

    #[tokio::test]
    async fn export_routes_to_the_right_template() {
        let (_, app) = app(MockBackend::new(Reply::Ok(vec![1]), Reply::Ok(vec![2, 2])));
        let dir = tempfile::tempdir().unwrap();

        app.dispatch(AppEvent::SelectMerge(vec![pdf("a.pdf"), pdf("b.pdf")]))
            .await
            .unwrap();
        app.dispatch(AppEvent::SubmitMerge).await.unwrap();
        let out = app
            .dispatch(AppEvent::ExportMerge(dir.path().to_path_buf()))
            .await
            .unwrap();
        match out {
            Dispatched::Exported(path) => {
                assert_eq!(path.extension().unwrap(), "pdf");
                assert_eq!(std::fs::read(path).unwrap(), vec![2, 2]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let err = app
            .dispatch(AppEvent::ExportConvert(dir.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoResultAvailable));
    }
}
