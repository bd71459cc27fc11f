use thiserror::Error;

use crate::domain::download::DownloadKey;

/// Domain-level errors for ModelDock.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network request blocked: {reason}")]
    NetworkBlocked { reason: String },

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Download already in progress: {0}")]
    AlreadyInProgress(DownloadKey),

    #[error("Model already downloaded: {0}")]
    AlreadyDownloaded(DownloadKey),

    #[error("Too many concurrent downloads (limit {limit})")]
    TooManyDownloads { limit: usize },

    #[error("Model {0} has no download source")]
    MissingSource(DownloadKey),

    #[error("Invalid model file name: {0}")]
    InvalidFileName(String),

    #[error("Download cancelled: {0}")]
    Cancelled(DownloadKey),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No assistant available")]
    NoAssistant,

    #[error("Thread error: {0}")]
    Thread(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
