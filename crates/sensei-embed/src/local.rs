//! In-process sentence embeddings with a candle BERT model.
//!
//! The model directory must hold `config.json`, `tokenizer.json` and either
//! `model.safetensors` or `pytorch_model.bin`. Loading happens on first use
//! and is memoized for the life of the provider.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use sensei_core::config::EmbeddingSettings;
use sensei_core::error::Error;
use sensei_core::traits::EmbedProvider;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

const MAX_LEN: usize = 256;
const FORWARD_BATCH: usize = 32;

struct LoadedModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
}

impl LoadedModel {
    fn load(model_dir: &Path, expected_dim: usize) -> Result<Self> {
        let start = Instant::now();
        info!(dir = %model_dir.display(), "loading local embedding model");
        for required in ["tokenizer.json", "config.json"] {
            if !model_dir.join(required).is_file() {
                return Err(Error::NotFound(format!("{required} in {}", model_dir.display())).into());
            }
        }
        let device = select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let pad_id = tokenizer.get_padding().map_or(0, |p| p.pad_id);

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw)?;
        if config.hidden_size != expected_dim {
            return Err(Error::InvalidConfig(format!(
                "model at {} produces {}-dim vectors but embedding.local_dim is {}",
                model_dir.display(),
                config.hidden_size,
                expected_dim
            ))
            .into());
        }

        let safetensors = model_dir.join("model.safetensors");
        let weights: HashMap<String, Tensor> = if safetensors.exists() {
            candle_core::safetensors::load(&safetensors, &device)?
        } else {
            candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?.into_iter().collect()
        };
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        info!(elapsed_ms = start.elapsed().as_millis() as u64, dim = expected_dim, "local embedding model ready");
        Ok(Self { model, tokenizer, device, pad_id })
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(FORWARD_BATCH) {
            let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, batch, MAX_LEN, self.pad_id, &self.device)?;
            let token_type_ids = input_ids.zeros_like()?;
            let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
            let pooled = masked_mean_l2(&hidden, &attention_mask)?;
            out.extend(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?);
        }
        if start.elapsed().as_millis() > 100 * texts.len() as u128 {
            warn!(count = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "slow embedding");
        }
        Ok(out)
    }
}

pub struct LocalEmbedder {
    model_dir: PathBuf,
    dim: usize,
    id: String,
    loaded: OnceCell<Arc<LoadedModel>>,
}

impl LocalEmbedder {
    /// Cheap: nothing is read from disk until the first `embed_batch`.
    pub fn new(settings: &EmbeddingSettings) -> Self {
        Self {
            model_dir: settings.local_model_path(),
            dim: settings.local_dim,
            id: format!("local:{}:d{}", settings.local_model_id, settings.local_dim),
            loaded: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn model(&self) -> Result<Arc<LoadedModel>> {
        let model = self
            .loaded
            .get_or_try_init(|| {
                let dir = self.model_dir.clone();
                let dim = self.dim;
                async move {
                    tokio::task::spawn_blocking(move || LoadedModel::load(&dir, dim))
                        .await
                        .context("model loader task failed")?
                        .map(Arc::new)
                }
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

#[async_trait]
impl EmbedProvider for LocalEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model().await?;
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.embed(&texts))
            .await
            .context("embedding task failed")?
    }
}
