pub mod catalog;
pub mod controller;
pub mod dispatcher;
pub mod downloads;
pub mod registry;
pub mod thread_screen;

pub use catalog::ModelCatalogView;
pub use controller::{AppController, Collaborators};
pub use dispatcher::{ActionDispatcher, DownloadOutcome};
pub use downloads::DownloadController;
pub use registry::DownloadRegistry;
pub use thread_screen::{ThreadScreen, ThreadScreenLayout};
