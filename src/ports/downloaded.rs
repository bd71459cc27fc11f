use tokio::sync::broadcast;

use crate::domain::{DownloadKey, ModelRecord};

/// Port for the set of models that are fully downloaded.
///
/// Owned outside the download core; the controller only adds completed models.
pub trait DownloadedModels: Send + Sync {
    /// Check whether a model is already downloaded.
    fn contains(&self, key: &DownloadKey) -> bool;

    /// Record a finished download. Adding an existing id replaces it.
    fn add(&self, model: ModelRecord);

    /// All downloaded models, for display.
    fn list(&self) -> Vec<ModelRecord>;

    /// Subscribe to additions.
    fn subscribe(&self) -> broadcast::Receiver<DownloadKey>;
}
