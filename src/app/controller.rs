use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{
    HeadlessShell, HttpTransport, InMemoryDownloadedModels, InMemoryThreadService,
    StaticExtensionRegistry, TomlConfigStore,
};
use crate::app::catalog::ModelCatalogView;
use crate::app::dispatcher::{ActionDispatcher, DownloadOutcome};
use crate::app::downloads::DownloadController;
use crate::app::registry::DownloadRegistry;
use crate::app::thread_screen::{ThreadScreen, ThreadScreenLayout};
use crate::domain::{
    AppConfig, DomainError, DownloadKey, DownloadRequest, DownloadState, ModelRecord, ModelRow,
    ModelRowState, ModelTemplate, RepoData, Thread,
};
use crate::infrastructure::init_logging;
use crate::ports::{
    AppShell, ConfigStore, DownloadTransport, DownloadedModels, ExtensionRegistry, ThreadService,
};

/// External collaborators the download core talks to.
pub struct Collaborators {
    pub transport: Arc<dyn DownloadTransport>,
    pub downloaded: Arc<dyn DownloadedModels>,
    pub threads: Arc<dyn ThreadService>,
    pub extensions: Arc<dyn ExtensionRegistry>,
    pub shell: Arc<dyn AppShell>,
}

/// Application controller that wires configuration, logging and the download core.
pub struct AppController {
    config: RwLock<AppConfig>,
    config_store: Arc<dyn ConfigStore>,
    registry: Arc<DownloadRegistry>,
    downloads: DownloadController,
    catalog: Arc<ModelCatalogView>,
    dispatcher: ActionDispatcher,
    thread_screen: ThreadScreen,
    downloaded: Arc<dyn DownloadedModels>,
    models_dir: PathBuf,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize with on-disk configuration, logging, the HTTPS transport and
    /// in-memory collaborators.
    pub fn new() -> Result<Self, DomainError> {
        // Step 1: Initialize config store
        let config_store = Arc::new(TomlConfigStore::new()?);

        // Step 2: Load configuration
        let config = config_store.load()?;

        // Step 3: Initialize logging
        let log_guard = init_logging(
            &config_store.logs_dir(),
            &config.logging.level,
            config.logging.file_logging,
        )?;

        info!("ModelDock starting up");

        // Step 4: Default collaborators
        let collaborators = Collaborators {
            transport: Arc::new(HttpTransport::new(&config.network)?),
            downloaded: Arc::new(InMemoryDownloadedModels::new()),
            threads: Arc::new(InMemoryThreadService::new(Vec::new())),
            extensions: Arc::new(StaticExtensionRegistry::default()),
            shell: Arc::new(HeadlessShell::new()),
        };

        let mut controller = Self::with_collaborators(
            config_store,
            config,
            Some(ModelTemplate::default()),
            collaborators,
        );
        controller._log_guard = log_guard;
        Ok(controller)
    }

    /// Assemble the core around caller-provided collaborators. Logging is left
    /// to the caller.
    pub fn with_collaborators(
        config_store: Arc<dyn ConfigStore>,
        config: AppConfig,
        template: Option<ModelTemplate>,
        collaborators: Collaborators,
    ) -> Self {
        let models_dir = config
            .downloads
            .models_dir
            .clone()
            .unwrap_or_else(|| config_store.models_dir());

        let registry = Arc::new(DownloadRegistry::new());
        let downloads = DownloadController::new(
            registry.clone(),
            collaborators.transport,
            collaborators.downloaded.clone(),
            collaborators.shell.clone(),
            models_dir.clone(),
            config.downloads.max_concurrent,
        );
        let catalog = Arc::new(ModelCatalogView::new(
            registry.clone(),
            collaborators.downloaded.clone(),
            template,
            config.downloads.percent_format.clone(),
        ));
        let dispatcher = ActionDispatcher::new(
            downloads.clone(),
            catalog.clone(),
            collaborators.threads.clone(),
            collaborators.shell,
        );
        let thread_screen = ThreadScreen::new(
            collaborators.downloaded.clone(),
            collaborators.threads,
            collaborators.extensions,
        );

        info!(
            models_dir = ?models_dir,
            max_concurrent = config.downloads.max_concurrent,
            "AppController initialized"
        );

        Self {
            config: RwLock::new(config),
            config_store,
            registry,
            downloads,
            catalog,
            dispatcher,
            thread_screen,
            downloaded: collaborators.downloaded,
            models_dir,
            _log_guard: None,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Save a new configuration.
    ///
    /// Download limits and formatting are read at startup; changes to them
    /// apply on the next launch.
    pub fn update_config(&self, config: AppConfig) -> Result<(), DomainError> {
        self.config_store.save(&config)?;
        *self.config.write() = config;

        info!("Configuration updated");
        Ok(())
    }

    pub fn data_dir(&self) -> String {
        self.config_store.data_dir().to_string_lossy().to_string()
    }

    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }

    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }

    pub fn models_dir(&self) -> PathBuf {
        self.models_dir.clone()
    }

    pub fn set_default_model(&self, template: Option<ModelTemplate>) {
        self.catalog.set_template(template);
    }

    pub fn model_for(&self, repo: &RepoData, request: &DownloadRequest) -> Option<ModelRecord> {
        self.catalog.model_for(repo, request)
    }

    pub fn model_row(&self, repo: &RepoData, request: &DownloadRequest) -> Option<ModelRow> {
        self.catalog.row(repo, request)
    }

    pub fn model_state(&self, key: &DownloadKey) -> ModelRowState {
        self.catalog.state(key)
    }

    pub fn download_percent_label(&self, key: &DownloadKey) -> Option<String> {
        self.catalog.percent_label(key)
    }

    pub fn download(&self, model: &ModelRecord) -> Result<DownloadOutcome, DomainError> {
        self.dispatcher.download(model)
    }

    pub fn cancel_download(&self, key: &DownloadKey) -> bool {
        self.dispatcher.cancel(key)
    }

    pub async fn use_model(&self, model: &ModelRecord) -> Result<Option<Thread>, DomainError> {
        self.dispatcher.use_model(model).await
    }

    pub async fn thread_screen_layout(&self) -> ThreadScreenLayout {
        self.thread_screen.layout().await
    }

    /// Every in-flight download, sorted by key.
    pub fn active_downloads(&self) -> Vec<DownloadState> {
        let mut states: Vec<_> = self.registry.snapshot().into_values().collect();
        states.sort_by(|a, b| a.key.cmp(&b.key));
        states
    }

    pub fn downloaded_models(&self) -> Vec<ModelRecord> {
        self.downloaded.list()
    }

    pub fn registry(&self) -> &Arc<DownloadRegistry> {
        &self.registry
    }

    pub fn downloads(&self) -> &DownloadController {
        &self.downloads
    }

    pub fn downloaded(&self) -> &Arc<dyn DownloadedModels> {
        &self.downloaded
    }
}
