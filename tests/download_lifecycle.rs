//! End-to-end row lifecycle through the public controller surface.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use modeldock_lib::adapters::{
    HeadlessShell, InMemoryDownloadedModels, InMemoryThreadService, StaticExtensionRegistry,
    TomlConfigStore,
};
use modeldock_lib::app::{Collaborators, DownloadOutcome, ThreadScreenLayout};
use modeldock_lib::domain::{
    AppConfig, Assistant, DomainError, DownloadKey, DownloadRequest, ImportStage, MainView,
    ModelRecord, ModelRowState, ModelTemplate, RepoData,
};
use modeldock_lib::ports::{
    ConfigStore, DownloadTransport, DownloadedModels, ThreadService, TransportEvent,
    TransportHandle,
};
use modeldock_lib::AppController;

/// Keeps each transfer's event sender so the test can play the server.
#[derive(Default)]
struct ManualTransport {
    transfers: Mutex<Vec<(TransportHandle, UnboundedSender<TransportEvent>)>>,
}

impl ManualTransport {
    fn send(&self, key: &DownloadKey, event: TransportEvent) {
        let transfers = self.transfers.lock();
        let (_, tx) = transfers
            .iter()
            .rev()
            .find(|(h, _)| h.key() == key)
            .expect("no transfer for key");
        tx.send(event).expect("pump gone");
    }

    fn count(&self) -> usize {
        self.transfers.lock().len()
    }
}

impl DownloadTransport for ManualTransport {
    fn start_download(
        &self,
        key: &DownloadKey,
        _url: &str,
        _dest: &Path,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<TransportHandle, DomainError> {
        let handle = TransportHandle::new(key.clone(), CancellationToken::new());
        self.transfers.lock().push((handle.clone(), events));
        Ok(handle)
    }

    fn cancel(&self, handle: &TransportHandle) -> Result<(), DomainError> {
        handle.token().cancel();
        Ok(())
    }
}

struct Harness {
    controller: AppController,
    transport: Arc<ManualTransport>,
    downloaded: Arc<InMemoryDownloadedModels>,
    threads: Arc<InMemoryThreadService>,
    shell: Arc<HeadlessShell>,
    _dir: tempfile::TempDir,
}

fn harness(assistants: Vec<Assistant>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(TomlConfigStore::at(dir.path().to_path_buf()).unwrap());
    let config = store.load().unwrap();

    let transport = Arc::new(ManualTransport::default());
    let downloaded = Arc::new(InMemoryDownloadedModels::new());
    let threads = Arc::new(InMemoryThreadService::new(assistants));
    let shell = Arc::new(HeadlessShell::new());

    let controller = AppController::with_collaborators(
        store,
        config,
        Some(ModelTemplate::default()),
        Collaborators {
            transport: transport.clone(),
            downloaded: downloaded.clone(),
            threads: threads.clone(),
            extensions: Arc::new(StaticExtensionRegistry::default()),
            shell: shell.clone(),
        },
    );

    Harness {
        controller,
        transport,
        downloaded,
        threads,
        shell,
        _dir: dir,
    }
}

fn request() -> DownloadRequest {
    DownloadRequest::new(
        "https://huggingface.co/org/repo/resolve/main/model-7b-q4.gguf",
        "model-7b-q4.gguf",
    )
    .with_size(1000)
}

fn model(h: &Harness) -> ModelRecord {
    h.controller
        .model_for(&RepoData::default(), &request())
        .unwrap()
}

async fn settle_on(h: &Harness, key: &DownloadKey, expected: ModelRowState) {
    for _ in 0..200 {
        if h.controller.model_state(key) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {:?}, got {:?}",
        expected,
        h.controller.model_state(key)
    );
}

fn downloading(percent: f64, transfer_started: bool) -> ModelRowState {
    ModelRowState::Downloading {
        percent,
        transfer_started,
    }
}

#[tokio::test]
async fn progress_then_complete_walks_the_row_states() {
    let h = harness(vec![]);
    let m = model(&h);
    assert_eq!(m.id.as_str(), "model-7b-q4.gguf");
    assert_eq!(h.controller.model_state(&m.id), ModelRowState::NotDownloaded);

    assert_eq!(h.controller.download(&m).unwrap(), DownloadOutcome::Started);
    assert_eq!(h.controller.model_state(&m.id), downloading(0.0, false));

    h.transport.send(
        &m.id,
        TransportEvent::Progress {
            bytes_received: 0,
            bytes_total: 1000,
        },
    );
    settle_on(&h, &m.id, downloading(0.0, false)).await;
    assert_eq!(
        h.controller.download_percent_label(&m.id).as_deref(),
        Some("0%")
    );

    h.transport.send(
        &m.id,
        TransportEvent::Progress {
            bytes_received: 500,
            bytes_total: 1000,
        },
    );
    settle_on(&h, &m.id, downloading(0.5, true)).await;
    assert_eq!(
        h.controller.download_percent_label(&m.id).as_deref(),
        Some("50%")
    );

    h.transport.send(&m.id, TransportEvent::Completed);
    settle_on(&h, &m.id, ModelRowState::Downloaded).await;
    assert!(h.controller.active_downloads().is_empty());
    assert_eq!(h.controller.downloaded_models(), vec![m]);
}

#[tokio::test]
async fn double_start_then_abort_leaves_key_free() {
    let h = harness(vec![]);
    let m = model(&h);

    assert_eq!(h.controller.download(&m).unwrap(), DownloadOutcome::Started);
    assert_eq!(
        h.controller.download(&m).unwrap(),
        DownloadOutcome::AlreadyDownloading
    );
    assert_eq!(h.transport.count(), 1);

    assert!(h.controller.cancel_download(&m.id));
    assert_eq!(h.controller.model_state(&m.id), ModelRowState::NotDownloaded);
    assert!(h.controller.active_downloads().is_empty());

    assert_eq!(h.controller.download(&m).unwrap(), DownloadOutcome::Started);
    assert_eq!(h.transport.count(), 2);
}

#[tokio::test]
async fn failed_transfer_returns_row_to_download() {
    let h = harness(vec![]);
    let m = model(&h);
    h.controller.download(&m).unwrap();

    h.transport.send(
        &m.id,
        TransportEvent::Failed {
            reason: "HTTP 503".to_string(),
        },
    );
    settle_on(&h, &m.id, ModelRowState::NotDownloaded).await;
    assert!(h.shell.notices()[0].contains("HTTP 503"));
}

#[tokio::test]
async fn downloaded_model_cannot_be_restarted() {
    let h = harness(vec![]);
    let m = model(&h);
    h.downloaded.add(m.clone());

    assert_eq!(
        h.controller.download(&m).unwrap(),
        DownloadOutcome::AlreadyDownloaded
    );
    let err = h.controller.downloads().start(&m).unwrap_err();
    assert!(matches!(err, DomainError::AlreadyDownloaded(_)));

    assert_eq!(h.controller.model_state(&m.id), ModelRowState::Downloaded);
    assert_eq!(h.controller.download_percent_label(&m.id), None);
    assert!(h.controller.active_downloads().is_empty());
    assert_eq!(h.transport.count(), 0);
}

#[tokio::test]
async fn use_without_assistant_changes_nothing() {
    let h = harness(vec![]);
    let m = model(&h);
    h.downloaded.add(m.clone());

    assert!(h.controller.use_model(&m).await.unwrap().is_none());
    assert!(h.threads.threads().is_empty());
    assert_eq!(h.shell.notices(), vec!["No assistant available".to_string()]);
    assert_eq!(h.shell.main_view(), MainView::Hub);
}

#[tokio::test]
async fn use_opens_thread_and_conversation_layout() {
    let h = harness(vec![Assistant {
        id: "jan".to_string(),
        name: "Jan".to_string(),
        instructions: None,
    }]);
    let m = model(&h);
    h.downloaded.add(m.clone());

    let thread = h.controller.use_model(&m).await.unwrap().unwrap();
    assert_eq!(thread.model_id, m.id);
    assert_eq!(h.shell.main_view(), MainView::Thread);
    assert_eq!(h.shell.import_stage(), ImportStage::None);
    assert!(matches!(
        h.controller.thread_screen_layout().await,
        ThreadScreenLayout::Conversation
    ));
}

#[tokio::test]
async fn assistant_added_later_is_picked_up() {
    let h = harness(vec![]);
    let m = model(&h);
    h.downloaded.add(m.clone());
    assert!(h.controller.use_model(&m).await.unwrap().is_none());

    h.threads.set_assistants(vec![Assistant {
        id: "helper".to_string(),
        name: "Helper".to_string(),
        instructions: Some("Be brief.".to_string()),
    }]);
    let thread = h.controller.use_model(&m).await.unwrap().unwrap();
    assert_eq!(thread.assistant_id, "helper");
}

#[tokio::test]
async fn rows_hide_without_default_model() {
    let h = harness(vec![]);
    let row = h
        .controller
        .model_row(&RepoData::default(), &request())
        .unwrap();
    assert_eq!(row.state, ModelRowState::NotDownloaded);

    h.controller.set_default_model(None);
    assert!(h
        .controller
        .model_row(&RepoData::default(), &request())
        .is_none());
    assert!(h
        .controller
        .model_for(&RepoData::default(), &request())
        .is_none());
}

#[tokio::test]
async fn saved_config_survives_reload() {
    let h = harness(vec![]);
    let mut config: AppConfig = h.controller.config();
    config.downloads.max_concurrent = 2;
    h.controller.update_config(config).unwrap();

    let store = TomlConfigStore::at(h._dir.path().to_path_buf()).unwrap();
    assert_eq!(store.load().unwrap().downloads.max_concurrent, 2);
}

#[tokio::test]
async fn commands_flatten_to_presentation_values() {
    let h = harness(vec![]);
    let paths = modeldock_lib::commands::get_paths(&h.controller);
    assert!(paths.config_path.ends_with("config.toml"));

    let outcome =
        modeldock_lib::commands::download_model(&h.controller, &RepoData::default(), &request())
            .unwrap();
    assert_eq!(outcome, DownloadOutcome::Started);
    assert!(modeldock_lib::commands::get_model_state(&h.controller, "model-7b-q4.gguf")
        .is_downloading());
    assert_eq!(
        modeldock_lib::commands::list_active_downloads(&h.controller).len(),
        1
    );
    assert!(modeldock_lib::commands::cancel_download(
        &h.controller,
        "model-7b-q4.gguf"
    ));
}
