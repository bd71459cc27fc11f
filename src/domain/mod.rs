pub mod config;
pub mod download;
pub mod error;
pub mod extension;
pub mod format;
pub mod model;
pub mod thread;
pub mod view;

pub use config::{AppConfig, DownloadsConfig, LoggingConfig, NetworkConfig};
pub use download::{DownloadKey, DownloadState, RegistryEvent};
pub use error::DomainError;
pub use extension::{ExtensionSettingsEntry, InstallationState};
pub use format::PercentFormat;
pub use model::{
    DownloadRequest, InferenceEngine, ModelMetadata, ModelRecord, ModelSource, ModelTemplate,
    Quantization, RepoData,
};
pub use thread::{Assistant, Thread};
pub use view::{ImportStage, MainView, ModelRow, ModelRowState};
