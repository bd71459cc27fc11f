use std::path::Path;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::domain::{DomainError, DownloadKey};

/// Events a transport reports for one download, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Bytes received so far. `bytes_total` is 0 when the size is unknown.
    Progress { bytes_received: u64, bytes_total: u64 },
    /// The file is fully written to its destination.
    Completed,
    /// The transfer stopped for good.
    Failed { reason: String },
}

/// Handle to a running transfer, used to cancel it.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    key: DownloadKey,
    cancel: CancellationToken,
}

impl TransportHandle {
    pub fn new(key: DownloadKey, cancel: CancellationToken) -> Self {
        Self { key, cancel }
    }

    pub fn key(&self) -> &DownloadKey {
        &self.key
    }

    /// Token the transfer task should watch.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Port for the component that moves bytes over the network.
///
/// Implementations run each transfer as its own task and report through
/// `events`. Progress for one key must be sent in non-decreasing byte order,
/// and at most one terminal event (`Completed` or `Failed`) is sent.
pub trait DownloadTransport: Send + Sync {
    /// Begin fetching `url` into `dest`. Must be called from within a Tokio runtime.
    fn start_download(
        &self,
        key: &DownloadKey,
        url: &str,
        dest: &Path,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<TransportHandle, DomainError>;

    /// Ask a transfer to stop. Best effort: the task may still be winding down.
    fn cancel(&self, handle: &TransportHandle) -> Result<(), DomainError>;
}
