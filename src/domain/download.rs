use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a downloadable artifact (the file name inside a model repository).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadKey(String);

impl DownloadKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DownloadKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DownloadKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Progress of one in-flight download.
///
/// Only exists while the transfer is running. `percent` is a fraction in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadState {
    pub key: DownloadKey,
    pub percent: f64,
    pub bytes_total: Option<u64>,
    pub bytes_received: Option<u64>,
}

impl DownloadState {
    /// A freshly started download with nothing received yet.
    pub fn started(key: DownloadKey, bytes_total: Option<u64>) -> Self {
        Self {
            key,
            percent: 0.0,
            bytes_total: bytes_total.filter(|total| *total > 0),
            bytes_received: None,
        }
    }

    /// Build the state for a progress report.
    ///
    /// An unknown or zero total holds the percent at 0.
    pub fn from_progress(key: DownloadKey, bytes_received: u64, bytes_total: u64) -> Self {
        let percent = if bytes_total > 0 {
            (bytes_received as f64 / bytes_total as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            key,
            percent,
            bytes_total: (bytes_total > 0).then_some(bytes_total),
            bytes_received: Some(bytes_received),
        }
    }

    /// True when `percent` is a usable fraction.
    pub fn has_valid_percent(&self) -> bool {
        self.percent.is_finite() && (0.0..=1.0).contains(&self.percent)
    }

    /// True once any bytes have arrived.
    pub fn has_started_transfer(&self) -> bool {
        self.bytes_received.is_some_and(|received| received > 0)
    }
}

/// Change notifications published by the download registry.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// An entry was inserted or its progress changed.
    Updated(DownloadState),
    /// An entry left the registry (completed, aborted or failed).
    Removed(DownloadKey),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let state = DownloadState::from_progress("a.gguf".into(), 250, 1000);
        assert_eq!(state.percent, 0.25);
        assert_eq!(state.bytes_total, Some(1000));
        assert!(state.has_started_transfer());
    }

    #[test]
    fn test_progress_unknown_total_holds_zero() {
        let state = DownloadState::from_progress("a.gguf".into(), 4096, 0);
        assert_eq!(state.percent, 0.0);
        assert_eq!(state.bytes_total, None);
    }

    #[test]
    fn test_progress_overshoot_is_clamped() {
        let state = DownloadState::from_progress("a.gguf".into(), 1500, 1000);
        assert_eq!(state.percent, 1.0);
        assert!(state.has_valid_percent());
    }

    #[test]
    fn test_started_ignores_zero_size() {
        let state = DownloadState::started("a.gguf".into(), Some(0));
        assert_eq!(state.bytes_total, None);
        assert!(!state.has_started_transfer());
    }
}
