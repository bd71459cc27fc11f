use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{DomainError, DownloadKey, DownloadState, RegistryEvent};

const EVENT_CAPACITY: usize = 256;

/// Authoritative map of in-flight downloads.
///
/// Created empty at startup and never persisted. Writes are serialized behind
/// one lock, so every read sees a whole entry. The download controller is the
/// only writer; everything else reads.
pub struct DownloadRegistry {
    entries: RwLock<HashMap<DownloadKey, DownloadState>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl DownloadRegistry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            events,
        }
    }

    pub fn get(&self, key: &DownloadKey) -> Option<DownloadState> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &DownloadKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Insert `state` only if its key has no entry yet.
    pub(crate) fn try_insert(&self, state: DownloadState) -> Result<(), DomainError> {
        let mut entries = self.entries.write();
        if entries.contains_key(&state.key) {
            return Err(DomainError::AlreadyInProgress(state.key));
        }

        entries.insert(state.key.clone(), state.clone());
        drop(entries);

        self.publish(RegistryEvent::Updated(state));
        Ok(())
    }

    /// Insert or replace the entry for `state.key`.
    ///
    /// A percent outside `[0, 1]` is dropped silently. Neither the stored
    /// percent nor the received byte count ever goes down, and a known total is
    /// not forgotten by a report without one.
    pub(crate) fn upsert(&self, state: DownloadState) {
        if !state.has_valid_percent() {
            debug!(key = %state.key, percent = state.percent, "Ignoring invalid progress");
            return;
        }

        let merged = {
            let mut entries = self.entries.write();
            let merged = match entries.get(&state.key) {
                Some(existing) => DownloadState {
                    percent: state.percent.max(existing.percent),
                    bytes_total: state.bytes_total.or(existing.bytes_total),
                    bytes_received: state.bytes_received.max(existing.bytes_received),
                    key: state.key,
                },
                None => state,
            };
            entries.insert(merged.key.clone(), merged.clone());
            merged
        };

        self.publish(RegistryEvent::Updated(merged));
    }

    /// Delete the entry for `key`. Returns whether one existed.
    pub(crate) fn remove(&self, key: &DownloadKey) -> bool {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            self.publish(RegistryEvent::Removed(key.clone()));
        }
        removed
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> HashMap<DownloadKey, DownloadState> {
        self.entries.read().clone()
    }

    /// Register a listener for entry changes.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: RegistryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl Default for DownloadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> DownloadKey {
        DownloadKey::new("model-7b-q4.gguf")
    }

    #[test]
    fn test_get_missing_is_none() {
        let registry = DownloadRegistry::new();
        assert!(registry.get(&key()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_try_insert_rejects_duplicate() {
        let registry = DownloadRegistry::new();
        registry
            .try_insert(DownloadState::started(key(), Some(1000)))
            .unwrap();

        let err = registry
            .try_insert(DownloadState::started(key(), None))
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyInProgress(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_upsert_ignores_invalid_percent() {
        let registry = DownloadRegistry::new();
        let mut state = DownloadState::started(key(), None);
        state.percent = 1.5;
        registry.upsert(state.clone());
        assert!(registry.get(&key()).is_none());

        state.percent = f64::NAN;
        registry.upsert(state);
        assert!(registry.get(&key()).is_none());
    }

    #[test]
    fn test_upsert_keeps_percent_monotonic() {
        let registry = DownloadRegistry::new();
        registry.upsert(DownloadState::from_progress(key(), 600, 1000));
        registry.upsert(DownloadState::from_progress(key(), 100, 1000));

        let state = registry.get(&key()).unwrap();
        assert_eq!(state.percent, 0.6);
        assert_eq!(state.bytes_received, Some(600));
    }

    #[test]
    fn test_late_small_report_keeps_transfer_started() {
        let registry = DownloadRegistry::new();
        registry.upsert(DownloadState::from_progress(key(), 5, 1000));
        registry.upsert(DownloadState::from_progress(key(), 0, 1000));

        let state = registry.get(&key()).unwrap();
        assert!(state.has_started_transfer());
        assert_eq!(state.bytes_received, Some(5));
    }

    #[test]
    fn test_upsert_keeps_known_total() {
        let registry = DownloadRegistry::new();
        registry.upsert(DownloadState::started(key(), Some(1000)));
        registry.upsert(DownloadState::from_progress(key(), 10, 0));

        assert_eq!(registry.get(&key()).unwrap().bytes_total, Some(1000));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = DownloadRegistry::new();
        registry.upsert(DownloadState::started(key(), None));
        assert!(registry.remove(&key()));
        assert!(!registry.remove(&key()));
        assert!(registry.get(&key()).is_none());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let registry = DownloadRegistry::new();
        registry.upsert(DownloadState::started(key(), None));
        let snapshot = registry.snapshot();
        registry.remove(&key());

        assert_eq!(snapshot.len(), 1);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_subscribers_see_updates_and_removals() {
        let registry = DownloadRegistry::new();
        let mut rx = registry.subscribe();

        registry.upsert(DownloadState::started(key(), None));
        registry.remove(&key());

        assert!(matches!(rx.try_recv(), Ok(RegistryEvent::Updated(_))));
        assert_eq!(rx.try_recv().unwrap(), RegistryEvent::Removed(key()));
    }
}
