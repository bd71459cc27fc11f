use async_trait::async_trait;

use crate::domain::{Assistant, DomainError, ModelRecord, Thread};

/// Port for the conversation collaborator.
#[async_trait]
pub trait ThreadService: Send + Sync {
    /// Assistants a new thread can be started with.
    fn assistants(&self) -> Vec<Assistant>;

    /// Existing threads.
    fn threads(&self) -> Vec<Thread>;

    /// Create a conversation seeded with `model`.
    async fn create_thread(
        &self,
        assistant: &Assistant,
        model: &ModelRecord,
    ) -> Result<Thread, DomainError>;
}
