use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::format::PercentFormat;

/// Network configuration for the model transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Hosts model files may be fetched from. Subdomains are allowed too.
    pub allowed_domains: Vec<String>,
    /// Upper bound for a single file transfer, in seconds.
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Self::default_allowed_domains(),
            timeout_secs: 3600,
        }
    }
}

impl NetworkConfig {
    /// Default allowed domains for model downloads.
    pub fn default_allowed_domains() -> Vec<String> {
        vec![
            "huggingface.co".to_string(),
            "hf.co".to_string(),
            "cdn-lfs.huggingface.co".to_string(),
            "cdn-lfs-us-1.huggingface.co".to_string(),
        ]
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
        }
    }
}

/// Download behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadsConfig {
    /// Override for the models directory. Defaults to `<data_dir>/models`.
    pub models_dir: Option<PathBuf>,
    /// Maximum number of files downloading at once.
    pub max_concurrent: usize,
    pub percent_format: PercentFormat,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            models_dir: None,
            max_concurrent: 4,
            percent_format: PercentFormat::default(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
    pub downloads: DownloadsConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }
}
