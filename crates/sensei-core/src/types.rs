//! Domain types shared by ingestion, retrieval and generation.

use serde::{Deserialize, Serialize};

pub type PointId = String;

/// A text file from the corpus. `source` is the path relative to the corpus root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source: String,
}

/// A window of a [`Document`]; the atomic retrieval granule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub text: String,
    pub source: String,
}

/// One row of a collection.
///
/// - `id`: globally unique (UUIDv4), assigned at upsert time
/// - `vector`: embedding of `payload.text`, width fixed by the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedPoint {
    pub id: PointId,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// A vector-store hit. Higher `score` is better (cosine similarity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub payload: Payload,
    pub score: f32,
}

/// A passage handed to the prompt composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    pub text: String,
    pub source: String,
    pub score: f32,
}

impl From<ScoredPoint> for RetrievedContext {
    fn from(hit: ScoredPoint) -> Self {
        Self { text: hit.payload.text, source: hit.payload.source, score: hit.score }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn is_empty(&self) -> bool {
        self.total_tokens == 0 && self.prompt_tokens == 0 && self.completion_tokens == 0
    }
}

/// Whether the language model answered or the offline template was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub answer: String,
    pub token_usage: TokenUsage,
    pub generation_latency_ms: u64,
    #[serde(skip)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub user_id: String,
    pub question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub token_usage: TokenUsage,
    pub generation_latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub user_id: String,
    pub question: String,
    pub contexts: Vec<RetrievedContext>,
    pub answer: String,
    pub metrics: Metrics,
}
