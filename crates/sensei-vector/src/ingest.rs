//! Corpus → chunks → embeddings → collection.
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use uuid::Uuid;

use sensei_core::chunker::chunk_document;
use sensei_core::config::IngestSettings;
use sensei_core::corpus::iter_documents;
use sensei_core::traits::EmbedProvider;
use sensei_core::types::{Chunk, IndexedPoint, Payload};

use crate::table::VectorCollection;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub batch_size: usize,
    pub max_chunks: Option<usize>,
    pub batch_delay: Option<Duration>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Clear the collection before ingesting.
    pub rebuild: bool,
}

impl Default for IngestOptions {
    fn default() -> Self { Self::from(&IngestSettings::default()) }
}

impl From<&IngestSettings> for IngestOptions {
    fn from(s: &IngestSettings) -> Self {
        Self {
            batch_size: s.batch_size,
            max_chunks: s.max_chunks,
            batch_delay: s.batch_delay_ms.filter(|ms| *ms > 0).map(Duration::from_millis),
            chunk_size: s.chunk_size,
            chunk_overlap: s.chunk_overlap,
            rebuild: false,
        }
    }
}

/// Where ingested points go. [`VectorCollection`] is the real one.
#[async_trait]
pub trait PointSink: Send + Sync {
    fn name(&self) -> &str;
    async fn upsert(&self, points: &[IndexedPoint]) -> Result<usize>;
    async fn clear(&self) -> Result<()>;
}

#[async_trait]
impl PointSink for VectorCollection {
    fn name(&self) -> &str { VectorCollection::name(self) }
    async fn upsert(&self, points: &[IndexedPoint]) -> Result<usize> { VectorCollection::upsert(self, points).await }
    async fn clear(&self) -> Result<()> { VectorCollection::clear(self).await }
}

/// Chunks of the text files under `corpus_root` in scan order, capped at
/// `max_chunks`. Files are read only as the iterator reaches them.
pub fn chunk_stream<'a>(corpus_root: &'a Path, opts: &'a IngestOptions) -> impl Iterator<Item = Chunk> + 'a {
    iter_documents(corpus_root)
        .flat_map(move |doc| chunk_document(&doc, opts.chunk_size, opts.chunk_overlap))
        .take(opts.max_chunks.unwrap_or(usize::MAX))
}

/// Returns the number of points written. Batches are embedded and written as
/// they fill, so only one batch of chunks is held at a time. An embedding or
/// upsert failure aborts the run; batches already written stay.
pub async fn ingest(
    corpus_root: &Path,
    sink: &dyn PointSink,
    provider: &dyn EmbedProvider,
    opts: &IngestOptions,
) -> Result<usize> {
    if opts.rebuild {
        sink.clear().await?;
    }
    let batch_size = opts.batch_size.max(1);
    let mut chunks = chunk_stream(corpus_root, opts);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} chunks {msg}")?);

    let mut written = 0usize;
    let mut batch_no = 0usize;
    loop {
        let batch: Vec<Chunk> = chunks.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batch_no += 1;
        if batch_no > 1 {
            if let Some(delay) = opts.batch_delay {
                tokio::time::sleep(delay).await;
            }
        }

        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = provider
            .embed_batch(&texts)
            .await
            .with_context(|| format!("embedding batch {batch_no}"))?;
        if vectors.len() != batch.len() {
            bail!("embedding batch {batch_no}: {} vectors for {} chunks", vectors.len(), batch.len());
        }
        let points: Vec<IndexedPoint> = batch
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedPoint {
                id: Uuid::new_v4().to_string(),
                vector,
                payload: Payload { text: chunk.text, source: chunk.source },
            })
            .collect();
        written += sink.upsert(&points).await.with_context(|| format!("upserting batch {batch_no}"))?;
        pb.set_position(written as u64);
        pb.set_message(format!("batch {batch_no}"));
    }
    pb.finish_with_message("done");
    if written == 0 {
        info!(collection = sink.name(), root = %corpus_root.display(), "no chunks to ingest");
    } else {
        info!(collection = sink.name(), points = written, batches = batch_no, "ingestion complete");
    }
    Ok(written)
}
