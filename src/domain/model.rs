use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::domain::download::DownloadKey;

/// Quantization tag of a GGUF file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum Quantization {
    Q2_K,
    Q3_K_S,
    Q3_K_M,
    Q3_K_L,
    Q4_0,
    Q4_1,
    Q4_K_S,
    Q4_K_M,
    Q5_0,
    Q5_1,
    Q5_K_S,
    Q5_K_M,
    Q6_K,
    Q8_0,
    F16,
    F32,
}

impl Quantization {
    const ALL: [Quantization; 16] = [
        Quantization::Q2_K,
        Quantization::Q3_K_S,
        Quantization::Q3_K_M,
        Quantization::Q3_K_L,
        Quantization::Q4_0,
        Quantization::Q4_1,
        Quantization::Q4_K_S,
        Quantization::Q4_K_M,
        Quantization::Q5_0,
        Quantization::Q5_1,
        Quantization::Q5_K_S,
        Quantization::Q5_K_M,
        Quantization::Q6_K,
        Quantization::Q8_0,
        Quantization::F16,
        Quantization::F32,
    ];

    /// Label shown on the row badge.
    pub fn label(&self) -> &'static str {
        match self {
            Quantization::Q2_K => "Q2_K",
            Quantization::Q3_K_S => "Q3_K_S",
            Quantization::Q3_K_M => "Q3_K_M",
            Quantization::Q3_K_L => "Q3_K_L",
            Quantization::Q4_0 => "Q4_0",
            Quantization::Q4_1 => "Q4_1",
            Quantization::Q4_K_S => "Q4_K_S",
            Quantization::Q4_K_M => "Q4_K_M",
            Quantization::Q5_0 => "Q5_0",
            Quantization::Q5_1 => "Q5_1",
            Quantization::Q5_K_S => "Q5_K_S",
            Quantization::Q5_K_M => "Q5_K_M",
            Quantization::Q6_K => "Q6_K",
            Quantization::Q8_0 => "Q8_0",
            Quantization::F16 => "F16",
            Quantization::F32 => "F32",
        }
    }

    /// Parse a tag, case-insensitively.
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|q| q.label().eq_ignore_ascii_case(s))
    }

    /// Detect the quantization from a file name such as `llama-7b.Q4_K_M.gguf`.
    ///
    /// Longer tags win so `Q4_K_M` is not mistaken for `Q4_K_S` or `Q4_0`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let upper = file_name.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .filter(|q| {
                let label = q.label();
                upper.match_indices(label).any(|(idx, _)| {
                    let before = upper[..idx].chars().next_back();
                    let after = upper[idx + label.len()..].chars().next();
                    !before.is_some_and(|c| c.is_ascii_alphanumeric())
                        && !after.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
                })
            })
            .max_by_key(|q| q.label().len())
    }
}

impl std::fmt::Display for Quantization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inference backend a model runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceEngine {
    LlamaCpp,
    Onnx,
    TensorRtLlm,
    OpenAi,
    Anthropic,
    Groq,
    Mistral,
}

impl InferenceEngine {
    /// Engines that run on this machine (as opposed to a hosted API).
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            InferenceEngine::LlamaCpp | InferenceEngine::Onnx | InferenceEngine::TensorRtLlm
        )
    }
}

/// Where a model file can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSource {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub author: String,
    pub tags: BTreeSet<String>,
    pub size_bytes: u64,
}

/// Base model definition that imported files inherit from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTemplate {
    pub engine: InferenceEngine,
    pub description: String,
    pub context_length: u32,
}

impl Default for ModelTemplate {
    fn default() -> Self {
        Self {
            engine: InferenceEngine::LlamaCpp,
            description: String::new(),
            context_length: 4096,
        }
    }
}

/// Repository a downloadable file belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoData {
    pub id: String,
    pub tags: BTreeSet<String>,
}

/// Per-row parameters of one downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
    pub file_size: Option<u64>,
    pub quantization: Option<Quantization>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            url: url.into(),
            quantization: Quantization::from_file_name(&file_name),
            file_name,
            file_size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }
}

/// A model that can be downloaded and used in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub id: DownloadKey,
    pub sources: Vec<ModelSource>,
    pub name: String,
    pub created_at_ms: u64,
    pub engine: InferenceEngine,
    pub description: String,
    pub context_length: u32,
    pub metadata: ModelMetadata,
}

impl ModelRecord {
    /// Author recorded for models imported from a repository listing.
    pub const IMPORT_AUTHOR: &'static str = "User";

    /// Build a record from the default template and a repository row.
    pub fn from_template(template: &ModelTemplate, repo: &RepoData, request: &DownloadRequest) -> Self {
        Self {
            id: DownloadKey::new(request.file_name.clone()),
            sources: vec![ModelSource {
                url: request.url.clone(),
                filename: request.file_name.clone(),
            }],
            name: request.file_name.clone(),
            created_at_ms: now_ms(),
            engine: template.engine,
            description: template.description.clone(),
            context_length: template.context_length,
            metadata: ModelMetadata {
                author: Self::IMPORT_AUTHOR.to_string(),
                tags: repo.tags.clone(),
                size_bytes: request.file_size.unwrap_or(0),
            },
        }
    }

    /// First download source, if any.
    pub fn primary_source(&self) -> Option<&ModelSource> {
        self.sources.first()
    }

    /// Declared size, `None` when unknown.
    pub fn known_size(&self) -> Option<u64> {
        (self.metadata.size_bytes > 0).then_some(self.metadata.size_bytes)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
