use anyhow::Result;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;

use sensei_core::error::Error;
use sensei_core::types::{Payload, ScoredPoint};

use crate::table::{string_column, VectorCollection};

impl VectorCollection {
	/// Top-`k` points by cosine similarity (`1 - cosine distance`), best first.
	pub async fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredPoint>> {
		if k == 0 { return Ok(Vec::new()); }
		if query_vec.len() != self.dim {
			return Err(Error::DimensionMismatch { collection: self.name.clone(), expected: self.dim, found: query_vec.len() }.into());
		}
		let mut stream = self.table.vector_search(query_vec.to_vec())?.distance_type(DistanceType::Cosine).limit(k).execute().await?;
		let mut hits = Vec::new();
		while let Some(batch) = stream.try_next().await? {
			let sources = string_column(&batch, "source")?;
			let texts = string_column(&batch, "text")?;
			let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<arrow_array::Float32Array>());
			for i in 0..batch.num_rows() {
				let score = distances.map_or(0.0, |d| 1.0 - d.value(i));
				hits.push(ScoredPoint { payload: Payload { text: texts.value(i).to_string(), source: sources.value(i).to_string() }, score });
			}
		}
		hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
		hits.truncate(k);
		Ok(hits)
	}
}
