//! OpenAI-compatible `/embeddings` client.
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sensei_core::config::EmbeddingSettings;
use sensei_core::error::Error;
use sensei_core::traits::EmbedProvider;

pub struct RemoteEmbedder {
    http: HttpClient,
    base_url: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
    id: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    /// The API key is read from `settings.api_key_env` now; a missing key only
    /// fails individual calls.
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).ok().filter(|k| !k.is_empty());
        Self::with_key(settings, api_key)
    }

    pub fn with_key(settings: &EmbeddingSettings, api_key: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            model: settings.remote_model.clone(),
            api_key,
            dim: settings.remote_dim,
            id: format!("remote:{}:d{}", settings.remote_model, settings.remote_dim),
        })
    }
}

#[async_trait]
impl EmbedProvider for RemoteEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let key = self.api_key.as_deref().ok_or_else(|| anyhow!("no API key configured for {}", self.id))?;
        let url = format!("{}/embeddings", self.base_url);
        debug!(count = texts.len(), model = %self.model, "requesting embeddings");
        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&EmbeddingRequest { model: &self.model, input: texts })
            .send()
            .await
            .with_context(|| format!("Failed to send embedding request to {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!("embedding request failed ({status}): {body}")).into());
        }

        let mut parsed: EmbeddingResponse = response.json().await.context("Failed to parse embedding response")?;
        parsed.data.sort_by_key(|d| d.index);
        if parsed.data.len() != texts.len() {
            bail!("embedder returned {} vectors for {} inputs", parsed.data.len(), texts.len());
        }
        parsed
            .data
            .into_iter()
            .map(|d| {
                if d.embedding.len() == self.dim {
                    Ok(d.embedding)
                } else {
                    Err(anyhow!("dim mismatch: got {} expected {}", d.embedding.len(), self.dim))
                }
            })
            .collect()
    }
}
