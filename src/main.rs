#![forbid(unsafe_code)]

use anyhow::{bail, Context, Result};
use tokio::sync::broadcast::error::RecvError;

use modeldock_lib::app::DownloadOutcome;
use modeldock_lib::domain::{DownloadRequest, RegistryEvent, RepoData};
use modeldock_lib::ports::DownloadedModels;
use modeldock_lib::AppController;

const USAGE: &str = "usage: modeldock <url> [file-name]";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let url = args.next().context(USAGE)?;
    let file_name = match args.next() {
        Some(name) => name,
        None => url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .context("cannot derive a file name from the URL")?,
    };

    let controller = AppController::new().context("Failed to initialize application")?;
    let request = DownloadRequest::new(url, file_name);
    let model = controller
        .model_for(&RepoData::default(), &request)
        .context("no default model template")?;

    // Subscribe before starting so the first update is not missed.
    let mut events = controller.registry().subscribe();

    match controller.download(&model)? {
        DownloadOutcome::Started => {}
        DownloadOutcome::AlreadyDownloading => bail!("{} is already downloading", model.id),
        DownloadOutcome::AlreadyDownloaded => {
            println!("{} is already downloaded", model.id);
            return Ok(());
        }
    }

    println!(
        "Downloading {} into {}",
        model.id,
        controller.models_dir().display()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                controller.cancel_download(&model.id);
                bail!("cancelled");
            }
            event = events.recv() => match event {
                Ok(RegistryEvent::Updated(state)) if state.key == model.id => {
                    if let Some(label) = controller.download_percent_label(&model.id) {
                        println!("{} {}", model.id, label);
                    }
                }
                Ok(RegistryEvent::Removed(key)) if key == model.id => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Completion holds the active set while it marks the model downloaded, so
    // once the key has left it the downloaded set is settled.
    let still_active = controller.downloads().is_active(&model.id);
    if !still_active && controller.downloaded().contains(&model.id) {
        println!("{} downloaded", model.id);
        Ok(())
    } else {
        bail!("download of {} failed, see the log for details", model.id)
    }
}
