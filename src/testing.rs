//! Test doubles shared by unit tests.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::domain::{DomainError, DownloadKey};
use crate::ports::{DownloadTransport, TransportEvent, TransportHandle};

/// Transport that never touches the network. Tests push events by hand.
#[derive(Default)]
pub struct ScriptedTransport {
    started: Mutex<Vec<(TransportHandle, PathBuf, UnboundedSender<TransportEvent>)>>,
    refuse_next: Mutex<Option<String>>,
    fail_cancels: Mutex<bool>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles of every transfer started so far, oldest first.
    pub fn started(&self) -> Vec<TransportHandle> {
        self.started.lock().iter().map(|(h, _, _)| h.clone()).collect()
    }

    pub fn destinations(&self) -> Vec<PathBuf> {
        self.started.lock().iter().map(|(_, p, _)| p.clone()).collect()
    }

    pub fn refuse_next(&self, reason: &str) {
        *self.refuse_next.lock() = Some(reason.to_string());
    }

    pub fn fail_cancels(&self, fail: bool) {
        *self.fail_cancels.lock() = fail;
    }

    /// Send `event` on the most recent transfer for `key`.
    pub fn emit(&self, key: &DownloadKey, event: TransportEvent) {
        let started = self.started.lock();
        if let Some((_, _, tx)) = started.iter().rev().find(|(h, _, _)| h.key() == key) {
            let _ = tx.send(event);
        }
    }

    /// Send `event` on the `index`-th transfer ever started, oldest first.
    pub fn emit_to(&self, index: usize, event: TransportEvent) {
        if let Some((_, _, tx)) = self.started.lock().get(index) {
            let _ = tx.send(event);
        }
    }

    /// Whether the pump behind the `index`-th transfer has stopped listening.
    pub fn is_closed(&self, index: usize) -> bool {
        self.started
            .lock()
            .get(index)
            .is_some_and(|(_, _, tx)| tx.is_closed())
    }

    /// Drop the sender of every transfer for `key`, as a crashed task would.
    pub fn hang_up(&self, key: &DownloadKey) {
        self.started.lock().retain(|(h, _, _)| h.key() != key);
    }
}

impl DownloadTransport for ScriptedTransport {
    fn start_download(
        &self,
        key: &DownloadKey,
        _url: &str,
        dest: &Path,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<TransportHandle, DomainError> {
        if let Some(reason) = self.refuse_next.lock().take() {
            return Err(DomainError::NetworkBlocked { reason });
        }

        let handle = TransportHandle::new(key.clone(), CancellationToken::new());
        self.started
            .lock()
            .push((handle.clone(), dest.to_path_buf(), events));
        Ok(handle)
    }

    fn cancel(&self, handle: &TransportHandle) -> Result<(), DomainError> {
        handle.token().cancel();
        if *self.fail_cancels.lock() {
            return Err(DomainError::Transport("cancel not acknowledged".to_string()));
        }
        Ok(())
    }
}
