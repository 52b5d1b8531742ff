use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use sensei_core::traits::EmbedProvider;
use sensei_core::types::RetrievedContext;
use sensei_text::LexicalSearcher;
use sensei_vector::VectorCollection;

/// Vector retrieval with a lexical fallback. [`Retriever::retrieve`] has no
/// error path: a failed embed, a failed search or an empty result all route
/// to the keyword scan over the corpus.
pub struct Retriever {
    provider: Arc<dyn EmbedProvider>,
    collection: VectorCollection,
    lexical: Arc<LexicalSearcher>,
}

impl Retriever {
    pub fn new(provider: Arc<dyn EmbedProvider>, collection: VectorCollection, lexical: LexicalSearcher) -> Self {
        Self { provider, collection, lexical: Arc::new(lexical) }
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<RetrievedContext> {
        match self.vector_search(query, k).await {
            Ok(hits) if !hits.is_empty() => {
                debug!(hits = hits.len(), top = hits[0].score, "vector retrieval");
                return hits;
            }
            Ok(_) => warn!(collection = self.collection.name(), "no vector hits, using lexical fallback"),
            Err(e) => warn!(error = %format!("{e:#}"), "vector retrieval failed, using lexical fallback"),
        }
        self.lexical_search(query, k).await
    }

    async fn vector_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedContext>> {
        let vector = self
            .provider
            .embed_batch(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        let hits = self.collection.search(&vector, k).await?;
        Ok(hits.into_iter().map(RetrievedContext::from).collect())
    }

    async fn lexical_search(&self, query: &str, k: usize) -> Vec<RetrievedContext> {
        let searcher = Arc::clone(&self.lexical);
        let query = query.to_string();
        match tokio::task::spawn_blocking(move || searcher.search(&query, k)).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "lexical scan task failed");
                Vec::new()
            }
        }
    }
}
