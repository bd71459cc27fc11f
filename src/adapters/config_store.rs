use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{AppConfig, DomainError};
use crate::ports::ConfigStore;

/// Application directory name under the OS data locations.
const APP_DIR: &str = "ModelDock";

/// TOML-based configuration store with OS-specific paths.
pub struct TomlConfigStore {
    data_dir: PathBuf,
    logs_dir: PathBuf,
}

impl TomlConfigStore {
    /// Create a store in the OS-specific application directories.
    pub fn new() -> Result<Self, DomainError> {
        let data_dir = Self::os_data_dir()?;
        let logs_dir = Self::os_logs_dir().unwrap_or_else(|| data_dir.join("logs"));
        Self::with_dirs(data_dir, logs_dir)
    }

    /// Create a store rooted at `data_dir`, logging to `<data_dir>/logs`.
    pub fn at(data_dir: PathBuf) -> Result<Self, DomainError> {
        let logs_dir = data_dir.join("logs");
        Self::with_dirs(data_dir, logs_dir)
    }

    fn with_dirs(data_dir: PathBuf, logs_dir: PathBuf) -> Result<Self, DomainError> {
        fs::create_dir_all(&data_dir)?;

        info!(data_dir = ?data_dir, logs_dir = ?logs_dir, "ConfigStore initialized");

        Ok(Self { data_dir, logs_dir })
    }

    /// - macOS: ~/Library/Application Support/ModelDock/
    /// - Windows: %APPDATA%\ModelDock\
    /// - Linux: ~/.config/ModelDock/
    fn os_data_dir() -> Result<PathBuf, DomainError> {
        let base = if cfg!(target_os = "macos") {
            dirs::data_dir()
        } else {
            dirs::config_dir()
        };

        base.map(|p| p.join(APP_DIR))
            .ok_or_else(|| DomainError::Config("Could not find application data directory".to_string()))
    }

    /// - macOS: inside the data directory
    /// - Windows: %LOCALAPPDATA%\ModelDock\logs\
    /// - Linux: ~/.local/share/ModelDock/logs/
    fn os_logs_dir() -> Option<PathBuf> {
        if cfg!(target_os = "macos") {
            return None;
        }

        let base = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
        } else {
            dirs::data_dir()
        };
        base.map(|p| p.join(APP_DIR).join("logs"))
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig, DomainError> {
        let config_path = self.config_path();

        if config_path.exists() {
            debug!(path = ?config_path, "Loading configuration");
            let content = fs::read_to_string(&config_path)?;
            let config: AppConfig = toml::from_str(&content)?;
            info!(path = ?config_path, "Configuration loaded");
            Ok(config)
        } else {
            info!(path = ?config_path, "Configuration file not found, creating default");
            let config = AppConfig::new();
            self.save(&config)?;
            Ok(config)
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), DomainError> {
        let config_path = self.config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&config_path, content)?;

        info!(path = ?config_path, "Configuration saved");
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn logs_dir(&self) -> PathBuf {
        self.logs_dir.clone()
    }
}
