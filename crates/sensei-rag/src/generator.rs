//! Answer generation against an OpenAI-compatible chat endpoint.
//!
//! [`AnswerGenerator::generate`] never fails: when the backend errors for any
//! reason the learner gets a deterministic study outline instead.
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sensei_core::config::GenerationSettings;
use sensei_core::error::Error;
use sensei_core::types::{AnswerResult, Outcome, PromptMessage, Role, TokenUsage};

use crate::prompt::question_from;

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: &[PromptMessage], temperature: f32) -> Result<Completion>;
}

pub struct OpenAiChat {
    http: HttpClient,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsagePayload>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl From<UsagePayload> for TokenUsage {
    fn from(u: UsagePayload) -> Self {
        Self { prompt_tokens: u.prompt_tokens, completion_tokens: u.completion_tokens, total_tokens: u.total_tokens }
    }
}

impl OpenAiChat {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).ok().filter(|k| !k.is_empty());
        Self::with_key(settings, api_key)
    }

    pub fn with_key(settings: &GenerationSettings, api_key: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    async fn complete(&self, messages: &[PromptMessage], temperature: f32) -> Result<Completion> {
        let key = self.api_key.as_deref().ok_or_else(|| anyhow!("no API key configured for chat model {}", self.model))?;
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&ChatRequest { model: &self.model, messages, temperature })
            .send()
            .await
            .with_context(|| format!("Failed to send chat request to {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("chat request failed ({status}): {body}")).into());
        }

        let parsed: ChatResponse = response.json().await.context("Failed to parse chat response")?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("chat response has no content"))?;
        Ok(Completion { text, usage: parsed.usage.map(TokenUsage::from) })
    }
}

pub struct AnswerGenerator {
    backend: Arc<dyn ChatBackend>,
    temperature: f32,
}

impl AnswerGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>, temperature: f32) -> Self {
        Self { backend, temperature }
    }

    pub async fn generate(&self, messages: &[PromptMessage]) -> AnswerResult {
        let start = Instant::now();
        match self.backend.complete(messages, self.temperature).await {
            Ok(completion) => {
                let latency = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                debug!(latency_ms = latency, usage = ?completion.usage, "answer generated");
                AnswerResult {
                    answer: completion.text,
                    token_usage: completion.usage.unwrap_or_default(),
                    generation_latency_ms: latency,
                    outcome: Outcome::Delivered,
                }
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "generation failed, answering offline");
                offline_answer(messages)
            }
        }
    }
}

const PATTERNS: &[&str] = &[
    "Two pointers: sorted arrays, pair sums, in-place partitioning",
    "Sliding window: contiguous subarrays or substrings under a constraint",
    "Hashing: O(1) lookups for counts, seen-sets and complements",
    "Binary search: sorted data or a monotonic answer space",
    "BFS / DFS: graphs, grids and trees; BFS for shortest unweighted paths",
    "Dynamic programming: overlapping subproblems with optimal substructure",
    "Greedy: a locally optimal choice that provably stays globally optimal",
    "Heap / priority queue: top-k, scheduling and streaming medians",
];

const COMPLEXITY: &[&str] = &[
    "State time and space complexity for every approach you consider.",
    "Start from the brute force, then name the bottleneck you remove.",
    "Check edge cases: empty input, a single element, duplicates, overflow.",
];

/// Deterministic fallback answer; zero usage and zero latency.
pub fn offline_answer(messages: &[PromptMessage]) -> AnswerResult {
    let question = question_from(messages)
        .or_else(|| messages.iter().rev().find(|m| m.role == Role::User).map(|m| m.content.as_str()))
        .unwrap_or("your question");
    let mut answer = String::from("[Offline mode] The language model is unavailable right now, so here is a study outline.\n\n");
    answer.push_str(&format!("Question: {question}\n\nPatterns worth checking:\n"));
    for p in PATTERNS {
        answer.push_str(&format!("- {p}\n"));
    }
    answer.push_str("\nComplexity reminders:\n");
    for c in COMPLEXITY {
        answer.push_str(&format!("- {c}\n"));
    }
    answer.push_str("\nKeep going: one problem a day adds up.");
    AnswerResult { answer, token_usage: TokenUsage::default(), generation_latency_ms: 0, outcome: Outcome::Degraded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::compose;

    #[test]
    fn offline_answer_echoes_composed_question() {
        let result = offline_answer(&compose("Why is quicksort O(n log n) on average?", &[]));
        assert!(result.answer.starts_with("[Offline mode]"));
        assert!(result.answer.contains("Question: Why is quicksort O(n log n) on average?\n"));
        assert!(!result.answer.contains("Retrieved context"));
    }

    #[test]
    fn offline_answer_echoes_free_form_user_message() {
        let messages = vec![
            PromptMessage::system("be brief"),
            PromptMessage::user("first draft"),
            PromptMessage::user("How do tries store prefixes?"),
        ];
        let result = offline_answer(&messages);
        assert!(result.answer.contains("Question: How do tries store prefixes?"));
        assert!(!result.answer.contains("your question"));
        assert!(offline_answer(&[PromptMessage::system("only")]).answer.contains("Question: your question"));
    }
}
