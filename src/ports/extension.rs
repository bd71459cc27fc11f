use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{DomainError, InstallationState};

/// An installed extension as seen by the settings discovery on the thread screen.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Internal name, used as the settings key.
    fn name(&self) -> &str;

    /// Name shown to users.
    fn product_name(&self) -> Option<&str>;

    /// Whether the extension exposes a settings API at all.
    fn has_settings(&self) -> bool;

    /// Number of settings the extension declares.
    async fn settings_count(&self) -> Result<usize, DomainError>;

    async fn installation_state(&self) -> InstallationState;

    /// API key of a remote provider, if the extension is one.
    fn api_key(&self) -> Option<String>;

    fn provider(&self) -> Option<String>;
}

/// Port for enumerating extensions. Read-only.
pub trait ExtensionRegistry: Send + Sync {
    fn all(&self) -> Vec<Arc<dyn Extension>>;
}
