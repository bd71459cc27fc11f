//! Entry points for the presentation layer.
//!
//! Each function takes the shared [`AppController`], plain arguments, and
//! returns serializable values with errors flattened to strings.

use serde::Serialize;

use crate::app::{AppController, DownloadOutcome, ThreadScreenLayout};
use crate::domain::{
    AppConfig, DownloadKey, DownloadRequest, DownloadState, ExtensionSettingsEntry, ModelRecord,
    ModelRow, ModelRowState, RepoData, Thread,
};

/// Get the current application configuration.
pub fn get_config(controller: &AppController) -> AppConfig {
    controller.config()
}

/// Update the application configuration.
pub fn update_config(controller: &AppController, config: AppConfig) -> Result<(), String> {
    controller.update_config(config).map_err(|e| e.to_string())
}

/// Get application paths information.
pub fn get_paths(controller: &AppController) -> AppPaths {
    AppPaths {
        data_dir: controller.data_dir(),
        logs_dir: controller.logs_dir(),
        config_path: controller.config_path(),
        models_dir: controller.models_dir().to_string_lossy().to_string(),
    }
}

/// Application paths information.
#[derive(Serialize)]
pub struct AppPaths {
    pub data_dir: String,
    pub logs_dir: String,
    pub config_path: String,
    pub models_dir: String,
}

// ==================== Model Row Commands ====================

/// Row data for one file of a repository. `None` hides the row.
pub fn get_model_row(
    controller: &AppController,
    repo: &RepoData,
    request: &DownloadRequest,
) -> Option<ModelRow> {
    controller.model_row(repo, request)
}

/// Current state of one model key.
pub fn get_model_state(controller: &AppController, model_id: &str) -> ModelRowState {
    controller.model_state(&DownloadKey::new(model_id))
}

/// All in-flight downloads.
pub fn list_active_downloads(controller: &AppController) -> Vec<DownloadState> {
    controller.active_downloads()
}

/// All downloaded models.
pub fn list_downloaded_models(controller: &AppController) -> Vec<ModelRecord> {
    controller.downloaded_models()
}

// ==================== Intent Commands ====================

/// "Download" on a repository row.
pub fn download_model(
    controller: &AppController,
    repo: &RepoData,
    request: &DownloadRequest,
) -> Result<DownloadOutcome, String> {
    let model = controller
        .model_for(repo, request)
        .ok_or_else(|| "No default model available".to_string())?;

    controller.download(&model).map_err(|e| e.to_string())
}

/// "Cancel" on a downloading row. Returns whether anything was cancelled.
pub fn cancel_download(controller: &AppController, model_id: &str) -> bool {
    controller.cancel_download(&DownloadKey::new(model_id))
}

/// "Use" on a downloaded row.
pub async fn use_model(
    controller: &AppController,
    repo: &RepoData,
    request: &DownloadRequest,
) -> Result<Option<Thread>, String> {
    let model = controller
        .model_for(repo, request)
        .ok_or_else(|| "No default model available".to_string())?;

    controller.use_model(&model).await.map_err(|e| e.to_string())
}

// ==================== Thread Screen Commands ====================

/// Layout decision for the thread screen.
#[derive(Debug, Serialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum ThreadScreenView {
    OnDeviceStarter {
        extensions: Vec<ExtensionSettingsEntry>,
    },
    Conversation,
}

/// Decide what the thread screen shows.
pub async fn get_thread_screen(controller: &AppController) -> ThreadScreenView {
    match controller.thread_screen_layout().await {
        ThreadScreenLayout::OnDeviceStarter { extensions } => {
            ThreadScreenView::OnDeviceStarter { extensions }
        }
        ThreadScreenLayout::Conversation => ThreadScreenView::Conversation,
    }
}
