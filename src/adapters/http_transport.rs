use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use parking_lot::RwLock;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{DomainError, DownloadKey, NetworkConfig};
use crate::ports::{DownloadTransport, TransportEvent, TransportHandle};

/// Minimum spacing between progress events for one transfer.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Streams model files over HTTPS into place.
///
/// Only hosts on the allow-list are contacted. Bytes go to a `.partial` file
/// next to the destination which is renamed once complete, so a cancelled or
/// failed transfer never leaves a truncated model behind.
pub struct HttpTransport {
    client: Client,
    allowed_domains: RwLock<Vec<String>>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &NetworkConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("ModelDock/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::HttpRequest(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            allowed_domains = ?config.allowed_domains,
            timeout_secs = config.timeout_secs,
            "HttpTransport initialized"
        );

        Ok(Self {
            client,
            allowed_domains: RwLock::new(config.allowed_domains.clone()),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Update allowed domains.
    pub fn set_allowed_domains(&self, domains: Vec<String>) {
        let mut guard = self.allowed_domains.write();
        *guard = domains;
        info!(allowed_domains = ?*guard, "HttpTransport allowed domains updated");
    }

    /// Check if a URL may be fetched.
    fn is_url_allowed(&self, url: &str) -> Result<(), DomainError> {
        let parsed = Url::parse(url).map_err(|e| DomainError::HttpRequest(e.to_string()))?;

        if parsed.scheme() != "https" {
            warn!(url = url, "Download blocked: not https");
            return Err(DomainError::NetworkBlocked {
                reason: format!("Scheme '{}' is not allowed", parsed.scheme()),
            });
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| DomainError::HttpRequest("Invalid URL: no host".to_string()))?;

        let allowed = self.allowed_domains.read();
        if !allowed
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{}", d)))
        {
            warn!(url = url, host = host, "Download blocked: domain not in allow-list");
            return Err(DomainError::NetworkBlocked {
                reason: format!("Domain '{}' is not in the allowed list", host),
            });
        }

        Ok(())
    }
}

impl DownloadTransport for HttpTransport {
    fn start_download(
        &self,
        key: &DownloadKey,
        url: &str,
        dest: &Path,
        events: UnboundedSender<TransportEvent>,
    ) -> Result<TransportHandle, DomainError> {
        self.is_url_allowed(url)?;

        let token = CancellationToken::new();
        let handle = TransportHandle::new(key.clone(), token.clone());

        let client = self.client.clone();
        let timeout = self.timeout;
        let key = key.clone();
        let url = url.to_string();
        let dest = dest.to_path_buf();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(DomainError::Cancelled(key.clone())),
                r = fetch(&client, &url, &dest, timeout, &events) => r,
            };

            match result {
                Ok(()) => {
                    let _ = events.send(TransportEvent::Completed);
                }
                Err(DomainError::Cancelled(_)) => {
                    // The fetch future was dropped mid-write.
                    let _ = tokio::fs::remove_file(partial_path(&dest)).await;
                    debug!(key = %key, "Transfer cancelled");
                }
                Err(e) => {
                    let _ = events.send(TransportEvent::Failed {
                        reason: e.to_string(),
                    });
                }
            }
        });

        Ok(handle)
    }

    fn cancel(&self, handle: &TransportHandle) -> Result<(), DomainError> {
        handle.token().cancel();
        debug!(key = %handle.key(), "Cancellation requested");
        Ok(())
    }
}

/// `<dest>.partial`, where bytes land until the transfer completes.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}

async fn fetch(
    client: &Client,
    url: &str,
    path: &Path,
    timeout: Duration,
    events: &UnboundedSender<TransportEvent>,
) -> Result<(), DomainError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| DomainError::HttpRequest(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DomainError::HttpRequest(format!(
            "HTTP {} for {}",
            status, url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = partial_path(path);

    // Helper to clean up temp file on error
    let cleanup_temp = || {
        let temp = temp_path.clone();
        async move { let _ = tokio::fs::remove_file(&temp).await; }
    };

    let mut file = match tokio::fs::File::create(&temp_path).await {
        Ok(f) => f,
        Err(e) => {
            cleanup_temp().await;
            return Err(DomainError::Io(e.to_string()));
        }
    };

    let mut downloaded: u64 = 0;
    let mut last_report: Option<Instant> = None;
    let mut stream = response.bytes_stream();

    let _ = events.send(TransportEvent::Progress {
        bytes_received: 0,
        bytes_total: total_size,
    });

    while let Some(chunk_result) = stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(e) => {
                drop(file);
                cleanup_temp().await;
                return Err(DomainError::HttpRequest(e.to_string()));
            }
        };

        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            cleanup_temp().await;
            return Err(DomainError::Io(e.to_string()));
        }

        downloaded += chunk.len() as u64;

        let due = last_report.map_or(true, |t| t.elapsed() >= PROGRESS_INTERVAL);
        if due || downloaded == total_size {
            last_report = Some(Instant::now());
            let _ = events.send(TransportEvent::Progress {
                bytes_received: downloaded,
                bytes_total: total_size,
            });
        }
    }

    if let Err(e) = file.flush().await {
        drop(file);
        cleanup_temp().await;
        return Err(DomainError::Io(e.to_string()));
    }
    drop(file);

    // Atomic rename from temp to final path
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        cleanup_temp().await;
        return Err(DomainError::Io(e.to_string()));
    }

    info!(path = ?path, size = downloaded, "File downloaded successfully");
    Ok(())
}
