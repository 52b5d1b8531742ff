use async_trait::async_trait;

/// Maps text to fixed-width vectors.
///
/// Selected once at startup and shared as `Arc<dyn EmbedProvider>`. Every
/// implementation returns exactly one vector of `dim()` floats per input, in
/// input order.
#[async_trait]
pub trait EmbedProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `remote:text-embedding-3-small:d1536`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// Compute embeddings for a batch of input texts.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}
