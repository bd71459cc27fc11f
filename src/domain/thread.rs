use serde::{Deserialize, Serialize};

use crate::domain::download::DownloadKey;

/// An assistant persona a conversation can be started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub name: String,
    pub instructions: Option<String>,
}

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub assistant_id: String,
    pub model_id: DownloadKey,
    pub created_at_ms: u64,
}
