use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::registry::DownloadRegistry;
use crate::domain::{DomainError, DownloadKey, DownloadState, ModelRecord};
use crate::ports::{AppShell, DownloadTransport, DownloadedModels, TransportEvent, TransportHandle};

/// A download the controller started and has not yet finished.
struct ActiveDownload {
    generation: u64,
    handle: TransportHandle,
    model: ModelRecord,
}

struct Inner {
    registry: Arc<DownloadRegistry>,
    transport: Arc<dyn DownloadTransport>,
    downloaded: Arc<dyn DownloadedModels>,
    shell: Arc<dyn AppShell>,
    models_dir: PathBuf,
    max_concurrent: usize,
    active: Mutex<HashMap<DownloadKey, ActiveDownload>>,
    next_generation: AtomicU64,
}

/// Drives downloads from start to completion or abort.
///
/// Sole writer of the [`DownloadRegistry`]. Each started download gets its own
/// event channel, drained by a pump task that feeds transport events back in.
/// Events from a transfer that was already aborted or replaced are dropped, so a
/// late progress tick cannot resurrect or corrupt an entry.
#[derive(Clone)]
pub struct DownloadController {
    inner: Arc<Inner>,
}

impl DownloadController {
    pub fn new(
        registry: Arc<DownloadRegistry>,
        transport: Arc<dyn DownloadTransport>,
        downloaded: Arc<dyn DownloadedModels>,
        shell: Arc<dyn AppShell>,
        models_dir: PathBuf,
        max_concurrent: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                transport,
                downloaded,
                shell,
                models_dir,
                max_concurrent,
                active: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<DownloadRegistry> {
        &self.inner.registry
    }

    pub fn models_dir(&self) -> &Path {
        &self.inner.models_dir
    }

    /// Where the file for `model` is written: `<models_dir>/<id>/<filename>`.
    pub fn destination(&self, model: &ModelRecord) -> Result<PathBuf, DomainError> {
        let source = model
            .primary_source()
            .ok_or_else(|| DomainError::MissingSource(model.id.clone()))?;
        let dir = safe_component(model.id.as_str())?;
        let file = safe_component(&source.filename)?;
        Ok(self.inner.models_dir.join(dir).join(file))
    }

    /// Start downloading `model`.
    ///
    /// Fails with `AlreadyInProgress` when the key is already downloading and
    /// with `AlreadyDownloaded` when the model is in the downloaded set; neither
    /// touches the registry. Must be called from within a Tokio runtime.
    pub fn start(&self, model: &ModelRecord) -> Result<(), DomainError> {
        let source = model
            .primary_source()
            .ok_or_else(|| DomainError::MissingSource(model.id.clone()))?;
        let dest = self.destination(model)?;
        let key = model.id.clone();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut active = self.inner.active.lock();

            if self.inner.registry.contains(&key) {
                debug!(key = %key, "Download already in progress");
                return Err(DomainError::AlreadyInProgress(key));
            }

            // Completion adds to the downloaded set under this same lock.
            if self.inner.downloaded.contains(&key) {
                debug!(key = %key, "Model already downloaded");
                return Err(DomainError::AlreadyDownloaded(key));
            }

            if self.inner.max_concurrent > 0 && active.len() >= self.inner.max_concurrent {
                warn!(key = %key, limit = self.inner.max_concurrent, "Download limit reached");
                return Err(DomainError::TooManyDownloads {
                    limit: self.inner.max_concurrent,
                });
            }

            self.inner
                .registry
                .try_insert(DownloadState::started(key.clone(), model.known_size()))?;

            let handle = match self
                .inner
                .transport
                .start_download(&key, &source.url, &dest, tx)
            {
                Ok(handle) => handle,
                Err(e) => {
                    self.inner.registry.remove(&key);
                    warn!(key = %key, error = %e, "Transport refused download");
                    return Err(e);
                }
            };

            active.insert(
                key.clone(),
                ActiveDownload {
                    generation,
                    handle,
                    model: model.clone(),
                },
            );
        }

        info!(
            key = %key,
            url = %source.url,
            target = ?dest,
            size_bytes = model.metadata.size_bytes,
            "Download started"
        );

        tokio::spawn(pump(self.inner.clone(), key, generation, rx));
        Ok(())
    }

    /// Record progress for `key`. Ignored when `key` is not downloading.
    pub fn on_progress(&self, key: &DownloadKey, bytes_received: u64, bytes_total: u64) {
        self.inner.progress(key, None, bytes_received, bytes_total);
    }

    /// Finish `key`: drop the in-flight entry, then mark the model downloaded.
    pub fn complete(&self, key: &DownloadKey) {
        self.inner.complete(key, None);
    }

    /// Cancel `key` and clear its entry, whether or not the transport obliges.
    ///
    /// Returns whether a download was running.
    pub fn abort(&self, key: &DownloadKey) -> bool {
        let aborted = {
            let mut active = self.inner.active.lock();
            let aborted = match active.remove(key) {
                Some(entry) => {
                    if let Err(e) = self.inner.transport.cancel(&entry.handle) {
                        warn!(key = %key, error = %e, "Transport did not acknowledge cancel");
                    }
                    true
                }
                None => false,
            };
            self.inner.registry.remove(key);
            aborted
        };

        if aborted {
            info!(key = %key, "Download aborted");
        } else {
            debug!(key = %key, "Abort requested for idle key");
        }
        aborted
    }

    /// The transfer for `key` failed: clear its entry and tell the user.
    pub fn fail(&self, key: &DownloadKey, reason: &str) {
        self.inner.fail(key, None, reason);
    }

    pub fn is_active(&self, key: &DownloadKey) -> bool {
        self.inner.active.lock().contains_key(key)
    }

    pub fn active_count(&self) -> usize {
        self.inner.active.lock().len()
    }
}

impl Inner {
    /// Whether `key` is active and, when given, still on `generation`.
    fn is_current(
        active: &HashMap<DownloadKey, ActiveDownload>,
        key: &DownloadKey,
        generation: Option<u64>,
    ) -> bool {
        match (active.get(key), generation) {
            (Some(entry), Some(expected)) => entry.generation == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn progress(
        &self,
        key: &DownloadKey,
        generation: Option<u64>,
        bytes_received: u64,
        bytes_total: u64,
    ) {
        let active = self.active.lock();
        if !Self::is_current(&active, key, generation) {
            debug!(key = %key, "Dropping progress for inactive download");
            return;
        }

        if bytes_total == 0 && bytes_received > 0 {
            debug!(key = %key, bytes_received, "Progress without a total");
        }

        self.registry
            .upsert(DownloadState::from_progress(key.clone(), bytes_received, bytes_total));
    }

    fn complete(&self, key: &DownloadKey, generation: Option<u64>) {
        let mut active = self.active.lock();
        if !Self::is_current(&active, key, generation) {
            debug!(key = %key, "Ignoring completion for inactive download");
            return;
        }

        let Some(entry) = active.remove(key) else {
            return;
        };

        // Readers may briefly see neither state, never both.
        self.registry.remove(key);
        self.downloaded.add(entry.model);
        drop(active);

        info!(key = %key, "Download complete");
    }

    fn fail(&self, key: &DownloadKey, generation: Option<u64>, reason: &str) {
        {
            let mut active = self.active.lock();
            if !Self::is_current(&active, key, generation) {
                debug!(key = %key, reason, "Ignoring failure for inactive download");
                return;
            }
            active.remove(key);
            self.registry.remove(key);
        }

        warn!(key = %key, reason, "Download failed");
        self.shell
            .notify_error(&format!("Failed to download {}: {}", key, reason));
    }
}

/// Forward transport events for one download into the controller.
async fn pump(
    inner: Arc<Inner>,
    key: DownloadKey,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Progress {
                bytes_received,
                bytes_total,
            } => inner.progress(&key, Some(generation), bytes_received, bytes_total),
            TransportEvent::Completed => {
                inner.complete(&key, Some(generation));
                return;
            }
            TransportEvent::Failed { reason } => {
                inner.fail(&key, Some(generation), &reason);
                return;
            }
        }
    }

    // Sender dropped without a terminal event. After an abort this is expected
    // and `fail` ignores it because the entry is gone.
    inner.fail(&key, Some(generation), "transfer ended unexpectedly");
}

/// Reject names that would escape the models directory.
fn safe_component(name: &str) -> Result<&str, DomainError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');

    if valid {
        Ok(name)
    } else {
        Err(DomainError::InvalidFileName(name.to_string()))
    }
}
