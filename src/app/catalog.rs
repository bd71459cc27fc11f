use std::sync::Arc;

use parking_lot::RwLock;

use crate::app::registry::DownloadRegistry;
use crate::domain::format::{format_download_percentage, progress_value, to_gibibytes};
use crate::domain::{
    DownloadKey, DownloadRequest, ModelRecord, ModelRow, ModelRowState, ModelTemplate,
    PercentFormat, RepoData,
};
use crate::ports::DownloadedModels;

/// Read-only view of download state for model rows.
pub struct ModelCatalogView {
    registry: Arc<DownloadRegistry>,
    downloaded: Arc<dyn DownloadedModels>,
    template: RwLock<Option<ModelTemplate>>,
    percent_format: PercentFormat,
}

impl ModelCatalogView {
    pub fn new(
        registry: Arc<DownloadRegistry>,
        downloaded: Arc<dyn DownloadedModels>,
        template: Option<ModelTemplate>,
        percent_format: PercentFormat,
    ) -> Self {
        Self {
            registry,
            downloaded,
            template: RwLock::new(template),
            percent_format,
        }
    }

    /// Replace the default model imported files are based on.
    pub fn set_template(&self, template: Option<ModelTemplate>) {
        *self.template.write() = template;
    }

    pub fn template(&self) -> Option<ModelTemplate> {
        self.template.read().clone()
    }

    /// Derive the row state for `key`.
    ///
    /// The downloaded set is consulted first, so a late progress event can never
    /// put a progress bar back on a finished model.
    pub fn state(&self, key: &DownloadKey) -> ModelRowState {
        if self.downloaded.contains(key) {
            return ModelRowState::Downloaded;
        }

        match self.registry.get(key) {
            Some(state) => ModelRowState::Downloading {
                percent: state.percent.clamp(0.0, 1.0),
                transfer_started: state.has_started_transfer(),
            },
            None => ModelRowState::NotDownloaded,
        }
    }

    /// Percentage label for `key`, `None` unless it is downloading.
    pub fn percent_label(&self, key: &DownloadKey) -> Option<String> {
        match self.state(key) {
            ModelRowState::Downloading {
                percent,
                transfer_started,
            } => Some(format_download_percentage(
                percent,
                transfer_started,
                &self.percent_format,
            )),
            _ => None,
        }
    }

    /// The record a row would download, or `None` without a default model.
    pub fn model_for(&self, repo: &RepoData, request: &DownloadRequest) -> Option<ModelRecord> {
        let template = self.template.read();
        template
            .as_ref()
            .map(|t| ModelRecord::from_template(t, repo, request))
    }

    /// Everything needed to draw one row. `None` means the row is not shown.
    pub fn row(&self, repo: &RepoData, request: &DownloadRequest) -> Option<ModelRow> {
        let model = self.model_for(repo, request)?;
        let state = self.state(&model.id);

        let (percent_label, progress) = match state {
            ModelRowState::Downloading {
                percent,
                transfer_started,
            } => (
                format_download_percentage(percent, transfer_started, &self.percent_format),
                progress_value(percent),
            ),
            _ => (String::new(), 0.0),
        };

        Some(ModelRow {
            title: request.file_name.clone(),
            quantization: request.quantization,
            size_label: to_gibibytes(request.file_size.unwrap_or(0)),
            state,
            percent_label,
            progress_value: progress,
            id: model.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDownloadedModels;
    use crate::domain::DownloadState;

    fn view(template: Option<ModelTemplate>) -> (ModelCatalogView, Arc<DownloadRegistry>, Arc<InMemoryDownloadedModels>) {
        let registry = Arc::new(DownloadRegistry::new());
        let downloaded = Arc::new(InMemoryDownloadedModels::new());
        let view = ModelCatalogView::new(
            registry.clone(),
            downloaded.clone(),
            template,
            PercentFormat::default(),
        );
        (view, registry, downloaded)
    }

    fn request() -> DownloadRequest {
        DownloadRequest::new("https://huggingface.co/r/resolve/main/m.Q4_0.gguf", "m.Q4_0.gguf")
            .with_size(3 * 1024 * 1024 * 1024)
    }

    #[test]
    fn test_unknown_key_is_not_downloaded() {
        let (view, _, _) = view(None);
        assert_eq!(view.state(&"never.gguf".into()), ModelRowState::NotDownloaded);
        assert!(view.percent_label(&"never.gguf".into()).is_none());
    }

    #[test]
    fn test_registry_entry_is_downloading() {
        let (view, registry, _) = view(None);
        registry.upsert(DownloadState::from_progress("a.gguf".into(), 420, 1000));

        assert_eq!(
            view.state(&"a.gguf".into()),
            ModelRowState::Downloading {
                percent: 0.42,
                transfer_started: true
            }
        );
        assert_eq!(view.percent_label(&"a.gguf".into()).as_deref(), Some("42%"));
    }

    #[test]
    fn test_downloaded_wins_over_stale_entry() {
        let (view, registry, downloaded) = view(Some(ModelTemplate::default()));
        let model = view.model_for(&RepoData::default(), &request()).unwrap();
        registry.upsert(DownloadState::from_progress(model.id.clone(), 10, 1000));
        downloaded.add(model.clone());

        assert_eq!(view.state(&model.id), ModelRowState::Downloaded);
    }

    #[test]
    fn test_row_requires_template() {
        let (view, _, _) = view(None);
        assert!(view.row(&RepoData::default(), &request()).is_none());

        view.set_template(Some(ModelTemplate::default()));
        let row = view.row(&RepoData::default(), &request()).unwrap();
        assert_eq!(row.title, "m.Q4_0.gguf");
        assert_eq!(row.size_label, "3.00GB");
        assert_eq!(row.state, ModelRowState::NotDownloaded);
        assert_eq!(row.percent_label, "");
    }

    #[test]
    fn test_row_while_downloading() {
        let (view, registry, _) = view(Some(ModelTemplate::default()));
        registry.upsert(DownloadState::from_progress("m.Q4_0.gguf".into(), 1, 1000));

        let row = view.row(&RepoData::default(), &request()).unwrap();
        assert!(row.state.is_downloading());
        assert_eq!(row.percent_label, "1%");
        assert!((row.progress_value - 0.1).abs() < 1e-9);
    }
}
