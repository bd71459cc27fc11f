use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{DownloadKey, ModelRecord};
use crate::ports::DownloadedModels;

/// Downloaded-model set held in memory.
pub struct InMemoryDownloadedModels {
    models: RwLock<Vec<ModelRecord>>,
    events: broadcast::Sender<DownloadKey>,
}

impl InMemoryDownloadedModels {
    pub fn new() -> Self {
        Self::with_models(Vec::new())
    }

    /// Start from models found on disk by the caller.
    pub fn with_models(models: Vec<ModelRecord>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            models: RwLock::new(models),
            events,
        }
    }
}

impl Default for InMemoryDownloadedModels {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadedModels for InMemoryDownloadedModels {
    fn contains(&self, key: &DownloadKey) -> bool {
        self.models.read().iter().any(|m| &m.id == key)
    }

    fn add(&self, model: ModelRecord) {
        let key = model.id.clone();
        {
            let mut models = self.models.write();
            models.retain(|m| m.id != key);
            models.push(model);
        }
        debug!(key = %key, "Model marked downloaded");
        let _ = self.events.send(key);
    }

    fn list(&self) -> Vec<ModelRecord> {
        self.models.read().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<DownloadKey> {
        self.events.subscribe()
    }
}
