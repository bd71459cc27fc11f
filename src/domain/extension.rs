use serde::{Deserialize, Serialize};

/// Whether an extension needs an installation step before it can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallationState {
    NotRequired,
    NotInstalled,
    Installed,
}

/// An extension that exposes settings, as listed on the thread screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSettingsEntry {
    pub name: Option<String>,
    pub setting: String,
    pub api_key: String,
    pub provider: String,
}

impl ExtensionSettingsEntry {
    /// A remote provider counts as configured once it has a real API key.
    pub fn has_api_key(&self) -> bool {
        self.api_key.chars().count() > 1
    }
}
