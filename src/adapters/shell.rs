use parking_lot::RwLock;
use tracing::{info, warn};

use crate::domain::{ImportStage, MainView};
use crate::ports::AppShell;

#[derive(Default)]
struct ShellState {
    main_view: MainView,
    import_stage: ImportStage,
    notices: Vec<String>,
}

/// Shell without a window: records what a UI would show and logs it.
#[derive(Default)]
pub struct HeadlessShell {
    state: RwLock<ShellState>,
}

impl HeadlessShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main_view(&self) -> MainView {
        self.state.read().main_view
    }

    pub fn import_stage(&self) -> ImportStage {
        self.state.read().import_stage
    }

    /// Error notices shown so far, oldest first.
    pub fn notices(&self) -> Vec<String> {
        self.state.read().notices.clone()
    }
}

impl AppShell for HeadlessShell {
    fn notify_error(&self, message: &str) {
        warn!(message = message, "User notice");
        self.state.write().notices.push(message.to_string());
    }

    fn set_main_view(&self, view: MainView) {
        info!(view = ?view, "Main view changed");
        self.state.write().main_view = view;
    }

    fn set_import_stage(&self, stage: ImportStage) {
        self.state.write().import_stage = stage;
    }
}
