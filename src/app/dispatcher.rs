use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::catalog::ModelCatalogView;
use crate::app::downloads::DownloadController;
use crate::domain::{DomainError, DownloadKey, ImportStage, MainView, ModelRecord, Thread};
use crate::ports::{AppShell, ThreadService};

/// What a Download intent ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadOutcome {
    Started,
    AlreadyDownloading,
    AlreadyDownloaded,
}

/// Turns row button presses into controller calls.
///
/// Every intent can be repeated safely: it re-derives the row state first and
/// does nothing when the state does not offer that action.
pub struct ActionDispatcher {
    controller: DownloadController,
    view: Arc<ModelCatalogView>,
    threads: Arc<dyn ThreadService>,
    shell: Arc<dyn AppShell>,
}

impl ActionDispatcher {
    pub fn new(
        controller: DownloadController,
        view: Arc<ModelCatalogView>,
        threads: Arc<dyn ThreadService>,
        shell: Arc<dyn AppShell>,
    ) -> Self {
        Self {
            controller,
            view,
            threads,
            shell,
        }
    }

    /// "Download" pressed.
    pub fn download(&self, model: &ModelRecord) -> Result<DownloadOutcome, DomainError> {
        let state = self.view.state(&model.id);
        if state.is_downloaded() {
            debug!(key = %model.id, "Download ignored, already downloaded");
            return Ok(DownloadOutcome::AlreadyDownloaded);
        }
        if state.is_downloading() {
            debug!(key = %model.id, "Download ignored, already downloading");
            return Ok(DownloadOutcome::AlreadyDownloading);
        }

        match self.controller.start(model) {
            Ok(()) => Ok(DownloadOutcome::Started),
            // Lost a race with another start or a completion for the same key.
            Err(DomainError::AlreadyInProgress(_)) => Ok(DownloadOutcome::AlreadyDownloading),
            Err(DomainError::AlreadyDownloaded(_)) => Ok(DownloadOutcome::AlreadyDownloaded),
            Err(e) => {
                self.shell.notify_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// "Cancel" pressed. Returns whether a download was cancelled.
    pub fn cancel(&self, key: &DownloadKey) -> bool {
        if !self.view.state(key).is_downloading() {
            debug!(key = %key, "Cancel ignored, not downloading");
            return false;
        }
        self.controller.abort(key)
    }

    /// "Use" pressed: open a new thread on `model` with the first assistant.
    ///
    /// Without assistants the user is told so and nothing changes; the result is
    /// then `Ok(None)`.
    pub async fn use_model(&self, model: &ModelRecord) -> Result<Option<Thread>, DomainError> {
        let assistants = self.threads.assistants();
        let Some(assistant) = assistants.first() else {
            warn!(key = %model.id, "Use requested with no assistant");
            self.shell.notify_error(&DomainError::NoAssistant.to_string());
            return Ok(None);
        };

        let thread = self.threads.create_thread(assistant, model).await?;
        self.shell.set_main_view(MainView::Thread);
        self.shell.set_import_stage(ImportStage::None);

        info!(
            key = %model.id,
            thread_id = %thread.id,
            assistant = %assistant.id,
            "Thread created from model"
        );
        Ok(Some(thread))
    }
}
