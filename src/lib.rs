#![forbid(unsafe_code)]

//! Model download lifecycle tracking for a local-first chat client.
//!
//! [`app::DownloadRegistry`] holds in-flight downloads, [`app::DownloadController`]
//! is its only writer, [`app::ModelCatalogView`] derives what each model row
//! shows, and [`app::ActionDispatcher`] turns Download / Cancel / Use presses
//! into calls. [`app::AppController`] wires them to configuration, logging and
//! the collaborators behind [`ports`].

pub mod adapters;
pub mod app;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod ports;

#[cfg(test)]
mod testing;

pub use app::AppController;
