use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{ExtensionSettingsEntry, InstallationState};
use crate::ports::{DownloadedModels, ExtensionRegistry, ThreadService};

/// What the thread screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadScreenLayout {
    /// Nothing to chat with yet: offer local model downloads and provider setup.
    OnDeviceStarter {
        extensions: Vec<ExtensionSettingsEntry>,
    },
    /// Thread list, conversation and settings panels.
    Conversation,
}

/// Decides between the starter screen and the conversation panels.
pub struct ThreadScreen {
    downloaded: Arc<dyn DownloadedModels>,
    threads: Arc<dyn ThreadService>,
    extensions: Arc<dyn ExtensionRegistry>,
}

impl ThreadScreen {
    pub fn new(
        downloaded: Arc<dyn DownloadedModels>,
        threads: Arc<dyn ThreadService>,
        extensions: Arc<dyn ExtensionRegistry>,
    ) -> Self {
        Self {
            downloaded,
            threads,
            extensions,
        }
    }

    /// Extensions that have something to configure, in registry order.
    ///
    /// An extension is listed when it declares settings or needs installing.
    /// One that fails to report its settings is skipped.
    pub async fn extension_settings(&self) -> Vec<ExtensionSettingsEntry> {
        let mut entries = Vec::new();

        for extension in self.extensions.all() {
            if !extension.has_settings() {
                continue;
            }

            let settings_count = match extension.settings_count().await {
                Ok(count) => count,
                Err(e) => {
                    warn!(extension = extension.name(), error = %e, "Failed to read extension settings");
                    continue;
                }
            };

            let needs_install =
                extension.installation_state().await != InstallationState::NotRequired;

            if settings_count > 0 || needs_install {
                entries.push(ExtensionSettingsEntry {
                    name: extension.product_name().map(str::to_string),
                    setting: extension.name().to_string(),
                    api_key: extension.api_key().unwrap_or_default(),
                    provider: extension.provider().unwrap_or_default(),
                });
            }
        }

        entries
    }

    /// Compute the layout. Extensions are enumerated on every call.
    pub async fn layout(&self) -> ThreadScreenLayout {
        let extensions = self.extension_settings().await;

        let remote_configured = extensions.iter().any(ExtensionSettingsEntry::has_api_key);
        let local_model = self
            .downloaded
            .list()
            .iter()
            .any(|model| model.engine.is_local());
        let has_threads = !self.threads.threads().is_empty();

        debug!(
            remote_configured,
            local_model,
            has_threads,
            "Thread screen layout inputs"
        );

        if remote_configured || local_model || has_threads {
            ThreadScreenLayout::Conversation
        } else {
            ThreadScreenLayout::OnDeviceStarter { extensions }
        }
    }
}
