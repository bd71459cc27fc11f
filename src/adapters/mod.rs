pub mod config_store;
pub mod downloaded_store;
pub mod extensions;
pub mod http_transport;
pub mod shell;
pub mod thread_store;

pub use config_store::TomlConfigStore;
pub use downloaded_store::InMemoryDownloadedModels;
pub use extensions::{StaticExtension, StaticExtensionRegistry};
pub use http_transport::HttpTransport;
pub use shell::HeadlessShell;
pub use thread_store::InMemoryThreadService;
