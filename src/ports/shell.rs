use crate::domain::{ImportStage, MainView};

/// Port for the presentation shell: notices and screen switching.
pub trait AppShell: Send + Sync {
    /// Show a non-fatal, user-facing error.
    fn notify_error(&self, message: &str);

    fn set_main_view(&self, view: MainView);

    fn set_import_stage(&self, stage: ImportStage);
}
