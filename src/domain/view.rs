use serde::{Deserialize, Serialize};

use crate::domain::download::DownloadKey;
use crate::domain::model::Quantization;

/// What a model row offers the user.
///
/// Exactly one state holds per key. Precedence when deriving:
/// `Downloaded` over `Downloading` over `NotDownloaded`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ModelRowState {
    /// Offer "Download".
    NotDownloaded,
    /// Offer "Cancel" with a progress bar. `percent` is a fraction in `[0, 1]`.
    Downloading {
        percent: f64,
        #[serde(rename = "transferStarted")]
        transfer_started: bool,
    },
    /// Offer "Use".
    Downloaded,
}

impl ModelRowState {
    pub fn is_downloading(&self) -> bool {
        matches!(self, ModelRowState::Downloading { .. })
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self, ModelRowState::Downloaded)
    }
}

/// Everything the presentation layer needs to draw one downloadable file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRow {
    pub id: DownloadKey,
    pub title: String,
    pub quantization: Option<Quantization>,
    pub size_label: String,
    pub state: ModelRowState,
    /// Text next to the progress bar, e.g. `"42%"`. Empty unless downloading.
    pub percent_label: String,
    /// Progress bar fill, 0 to 100.
    pub progress_value: f64,
}

/// Top-level screen the application shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MainView {
    #[default]
    Hub,
    Settings,
    Thread,
}

/// Stage of the repository import flow in the settings screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    #[default]
    None,
    RepoDetail,
    Importing,
}
