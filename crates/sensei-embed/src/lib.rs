//! sensei-embed
//!
//! Embedding providers behind [`EmbedProvider`]: a remote OpenAI-compatible
//! endpoint, a local candle BERT model, and a deterministic hashing embedder
//! for offline runs. [`build_provider`] picks one from settings at startup.
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use sensei_core::config::{EmbeddingSettings, ProviderKind};
use sensei_core::traits::EmbedProvider;

pub mod device;
pub mod hash;
pub mod local;
pub mod pool;
pub mod remote;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use local::LocalEmbedder;
pub use pool::masked_mean_l2;
pub use remote::RemoteEmbedder;

pub fn build_provider(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbedProvider>> {
    let provider: Arc<dyn EmbedProvider> = match settings.provider {
        ProviderKind::Remote => Arc::new(RemoteEmbedder::new(settings)?),
        ProviderKind::Local => Arc::new(LocalEmbedder::new(settings)),
        ProviderKind::Hash => Arc::new(HashEmbedder::new(settings.hash_dim)),
    };
    info!(provider = %settings.provider, id = provider.embedder_id(), dim = provider.dim(), "embedding provider selected");
    Ok(provider)
}
