pub mod config;
pub mod downloaded;
pub mod extension;
pub mod shell;
pub mod threads;
pub mod transport;

pub use config::ConfigStore;
pub use downloaded::DownloadedModels;
pub use extension::{Extension, ExtensionRegistry};
pub use shell::AppShell;
pub use threads::ThreadService;
pub use transport::{DownloadTransport, TransportEvent, TransportHandle};
