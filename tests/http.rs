//! Integration tests against a mock HTTP service.
//!
//! Each test starts a `mockito` server, points an [`App`] at it and drives
//! the workflows through `AppEvent`s, checking both what goes over the wire
//! and what the presenter is told.

use mockito::Matcher;
use pdfdrop::{
    App, AppEvent, ClientConfig, Dispatched, HttpBackend, NotificationKind, PdfBackend, Presenter,
    ResultSummary, SelectedFile, WorkflowError, WorkflowKind, WorkflowState,
};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    states: Mutex<Vec<(WorkflowKind, WorkflowState)>>,
    results: Mutex<Vec<ResultSummary>>,
    shown: Mutex<Vec<(NotificationKind, String)>>,
}

impl Presenter for Recorder {
    fn on_state_changed(&self, workflow: WorkflowKind, state: WorkflowState) {
        self.states.lock().unwrap().push((workflow, state));
    }

    fn on_result_ready(&self, _workflow: WorkflowKind, result: &ResultSummary) {
        self.results.lock().unwrap().push(result.clone());
    }

    fn on_notification_shown(&self, kind: NotificationKind, text: &str) {
        self.shown.lock().unwrap().push((kind, text.to_string()));
    }
}

impl Recorder {
    fn last_shown(&self, kind: NotificationKind) -> Option<String> {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .map(|(_, text)| text.clone())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn app_for(base_url: &str) -> (Arc<Recorder>, App) {
    init_tracing();
    let config = ClientConfig::builder().base_url(base_url).build().unwrap();
    let recorder = Arc::new(Recorder::default());
    let app = App::connect(config, recorder.clone()).unwrap();
    (recorder, app)
}

fn pdf(name: &str, body: &str) -> SelectedFile {
    SelectedFile::new(name, "application/pdf", body.as_bytes().to_vec())
}

/// A local URL nothing is listening on.
fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Convert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_uploads_file_field_and_stores_image() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/convert-pdf-to-jpg")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".into()),
        )
        .match_body(Matcher::Regex(r#"name="file"; filename="a.pdf""#.into()))
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
        .create_async()
        .await;

    let (recorder, app) = app_for(&server.url());
    app.dispatch(AppEvent::SelectConvert(pdf("a.pdf", "%PDF-1.4 one page")))
        .await
        .unwrap();
    app.dispatch(AppEvent::SubmitConvert).await.unwrap();
    mock.assert_async().await;

    assert_eq!(app.convert().state(), WorkflowState::Success);
    assert_eq!(app.convert().result().unwrap().size_bytes(), 6);
    assert_eq!(
        recorder.last_shown(NotificationKind::Success).as_deref(),
        Some("PDF converted to JPG successfully!")
    );
    let results = recorder.results.lock().unwrap().clone();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].info, "File size: 6 Bytes • Format: JPG");
    assert!(results[0].previewable);
}

#[tokio::test]
async fn convert_error_detail_is_shown() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/convert-pdf-to-jpg")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"X"}"#)
        .create_async()
        .await;

    let (recorder, app) = app_for(&server.url());
    app.dispatch(AppEvent::SelectConvert(pdf("a.pdf", "%PDF")))
        .await
        .unwrap();
    let err = app.dispatch(AppEvent::SubmitConvert).await.unwrap_err();

    match err {
        WorkflowError::NetworkOrServer { status, detail, .. } => {
            assert_eq!(status, Some(400));
            assert_eq!(detail.as_deref(), Some("X"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(recorder.last_shown(NotificationKind::Error).as_deref(), Some("X"));
    assert_eq!(app.convert().state(), WorkflowState::Failed);
    assert!(app.convert().can_submit());
}

#[tokio::test]
async fn convert_unreachable_backend_uses_generic_text() {
    let (recorder, app) = app_for(&dead_url());
    app.dispatch(AppEvent::SelectConvert(pdf("a.pdf", "%PDF")))
        .await
        .unwrap();
    app.dispatch(AppEvent::SubmitConvert).await.unwrap_err();

    assert_eq!(
        recorder.last_shown(NotificationKind::Error).as_deref(),
        Some("Failed to convert PDF")
    );
    assert_eq!(
        *recorder.states.lock().unwrap(),
        vec![
            (WorkflowKind::Convert, WorkflowState::Submitting),
            (WorkflowKind::Convert, WorkflowState::Failed),
        ]
    );
}

#[tokio::test]
async fn rejected_file_never_reaches_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/convert-pdf-to-jpg")
        .expect(0)
        .create_async()
        .await;

    let (recorder, app) = app_for(&server.url());
    let big = SelectedFile::new("big.pdf", "application/pdf", vec![0u8; 11 * 1024 * 1024]);
    app.dispatch(AppEvent::SelectConvert(big)).await.unwrap_err();
    app.dispatch(AppEvent::SubmitConvert).await.unwrap_err();
    mock.assert_async().await;

    assert_eq!(
        recorder.last_shown(NotificationKind::Error).as_deref(),
        Some("Please select a PDF file")
    );
}

// ── Merge ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_sends_files_in_selection_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/merge-pdfs")
        .match_body(Matcher::Regex(
            r#"(?s)name="files"; filename="b.pdf".*name="files"; filename="a.pdf".*name="files"; filename="c.pdf""#
                .into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.7 merged")
        .create_async()
        .await;

    let (recorder, app) = app_for(&server.url());
    app.dispatch(AppEvent::SelectMerge(vec![pdf("b.pdf", "%PDF b"), pdf("a.pdf", "%PDF a")]))
        .await
        .unwrap();
    app.dispatch(AppEvent::SelectMerge(vec![pdf("c.pdf", "%PDF c")]))
        .await
        .unwrap();
    app.dispatch(AppEvent::SubmitMerge).await.unwrap();
    mock.assert_async().await;

    let result = app.merge().result().unwrap();
    assert_eq!(&result.data()[..], b"%PDF-1.7 merged");
    assert_eq!(result.source_files(), 3);
    assert_eq!(
        recorder.last_shown(NotificationKind::Success).as_deref(),
        Some("Successfully merged 3 PDF files!")
    );
    let results = recorder.results.lock().unwrap().clone();
    assert_eq!(results[0].info, "Merged 3 PDF files • Size: 15 Bytes");
    assert!(!results[0].previewable);
}

#[tokio::test]
async fn merge_error_without_detail_falls_back() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/merge-pdfs")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let (recorder, app) = app_for(&server.url());
    app.dispatch(AppEvent::SelectMerge(vec![pdf("a.pdf", "%PDF"), pdf("b.pdf", "%PDF")]))
        .await
        .unwrap();
    app.dispatch(AppEvent::SubmitMerge).await.unwrap_err();

    assert_eq!(
        recorder.last_shown(NotificationKind::Error).as_deref(),
        Some("Merge failed")
    );
    assert!(app.merge().can_submit());
}

#[tokio::test]
async fn merged_result_exports_to_disk() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/merge-pdfs")
        .with_status(200)
        .with_body("%PDF-merged")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    std::fs::write(&a, "%PDF a").unwrap();
    std::fs::write(&b, "%PDF b").unwrap();

    let (_, app) = app_for(&server.url());
    let files = vec![
        SelectedFile::from_path(&a).await.unwrap(),
        SelectedFile::from_path(&b).await.unwrap(),
    ];
    assert_eq!(files[0].media_type, "application/pdf");
    app.dispatch(AppEvent::SelectMerge(files)).await.unwrap();
    app.dispatch(AppEvent::SubmitMerge).await.unwrap();

    let out = dir.path().join("out");
    match app.dispatch(AppEvent::ExportMerge(out.clone())).await.unwrap() {
        Dispatched::Exported(path) => {
            assert_eq!(path.parent().unwrap(), out);
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("merged-") && name.ends_with(".pdf"), "{name}");
            assert_eq!(std::fs::read(path).unwrap(), b"%PDF-merged");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

// ── Service endpoints ────────────────────────────────────────────────────────

#[tokio::test]
async fn health_and_service_info() {
    let mut server = mockito::Server::new_async().await;
    let _health = server
        .mock("GET", "/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"healthy"}"#)
        .create_async()
        .await;
    let _info = server
        .mock("GET", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":"PDF Converter API","version":"1.0.0",
                "endpoints":{"convert":"/api/convert-pdf-to-jpg","merge":"/api/merge-pdfs"}}"#,
        )
        .create_async()
        .await;

    let config = ClientConfig::builder()
        .base_url(server.url())
        .build()
        .unwrap();
    let backend = HttpBackend::new(config).unwrap();

    assert!(backend.health().await.unwrap().is_healthy());
    let info = backend.service_info().await.unwrap();
    assert_eq!(info.version, "1.0.0");
    assert_eq!(info.endpoints["merge"], "/api/merge-pdfs");
    assert_eq!(backend.config().docs_url(), format!("{}/docs", server.url()));
}
