use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Assistant, DomainError, ModelRecord, Thread};
use crate::ports::ThreadService;

/// Thread service that keeps conversations in memory.
pub struct InMemoryThreadService {
    assistants: RwLock<Vec<Assistant>>,
    threads: RwLock<Vec<Thread>>,
}

impl InMemoryThreadService {
    pub fn new(assistants: Vec<Assistant>) -> Self {
        Self {
            assistants: RwLock::new(assistants),
            threads: RwLock::new(Vec::new()),
        }
    }

    pub fn set_assistants(&self, assistants: Vec<Assistant>) {
        *self.assistants.write() = assistants;
    }
}

#[async_trait]
impl ThreadService for InMemoryThreadService {
    fn assistants(&self) -> Vec<Assistant> {
        self.assistants.read().clone()
    }

    fn threads(&self) -> Vec<Thread> {
        self.threads.read().clone()
    }

    async fn create_thread(
        &self,
        assistant: &Assistant,
        model: &ModelRecord,
    ) -> Result<Thread, DomainError> {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DomainError::Thread(e.to_string()))?
            .as_millis() as u64;

        let thread = Thread {
            id: Uuid::new_v4().to_string(),
            title: "New Thread".to_string(),
            assistant_id: assistant.id.clone(),
            model_id: model.id.clone(),
            created_at_ms,
        };

        self.threads.write().insert(0, thread.clone());
        info!(thread_id = %thread.id, model = %model.id, "Thread created");
        Ok(thread)
    }
}
