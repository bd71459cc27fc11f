use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{DomainError, InstallationState};
use crate::ports::{Extension, ExtensionRegistry};

/// Extension described up front, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticExtension {
    name: String,
    product_name: Option<String>,
    settings: Option<usize>,
    installation: InstallationState,
    api_key: Option<String>,
    provider: Option<String>,
}

impl StaticExtension {
    /// An extension with a settings API but no settings, needing no install.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            product_name: None,
            settings: Some(0),
            installation: InstallationState::NotRequired,
            api_key: None,
            provider: None,
        }
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_settings(mut self, count: usize) -> Self {
        self.settings = Some(count);
        self
    }

    pub fn without_settings_api(mut self) -> Self {
        self.settings = None;
        self
    }

    pub fn with_installation_state(mut self, state: InstallationState) -> Self {
        self.installation = state;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

#[async_trait]
impl Extension for StaticExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    fn has_settings(&self) -> bool {
        self.settings.is_some()
    }

    async fn settings_count(&self) -> Result<usize, DomainError> {
        self.settings
            .ok_or_else(|| DomainError::Config(format!("{} has no settings", self.name)))
    }

    async fn installation_state(&self) -> InstallationState {
        self.installation
    }

    fn api_key(&self) -> Option<String> {
        self.api_key.clone()
    }

    fn provider(&self) -> Option<String> {
        self.provider.clone()
    }
}

/// Fixed list of extensions.
#[derive(Default)]
pub struct StaticExtensionRegistry {
    extensions: Vec<Arc<dyn Extension>>,
}

impl StaticExtensionRegistry {
    pub fn new(extensions: Vec<StaticExtension>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| Arc::new(e) as Arc<dyn Extension>)
                .collect(),
        }
    }
}

impl ExtensionRegistry for StaticExtensionRegistry {
    fn all(&self) -> Vec<Arc<dyn Extension>> {
        self.extensions.clone()
    }
}
