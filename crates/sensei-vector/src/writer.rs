use anyhow::Result;
use arrow_array::{FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use std::sync::Arc;
use tracing::debug;

use sensei_core::error::Error;
use sensei_core::types::IndexedPoint;

use crate::schema::build_collection_schema;
use crate::table::VectorCollection;

impl VectorCollection {
	/// Append points. Never replaces existing rows; a vector of the wrong
	/// width rejects the whole call before anything is written.
	pub async fn upsert(&self, points: &[IndexedPoint]) -> Result<usize> {
		if points.is_empty() { return Ok(0); }
		if let Some(bad) = points.iter().find(|p| p.vector.len() != self.dim) {
			return Err(Error::DimensionMismatch { collection: self.name.clone(), expected: self.dim, found: bad.vector.len() }.into());
		}
		let record_batch = self.points_to_record_batch(points)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		self.table.add(reader).execute().await?;
		debug!(collection = %self.name, count = points.len(), "upserted points");
		Ok(points.len())
	}

	fn points_to_record_batch(&self, points: &[IndexedPoint]) -> Result<RecordBatch> {
		let width = i32::try_from(self.dim)?;
		let schema = build_collection_schema(width);
		let mut ids = Vec::new(); let mut sources = Vec::new(); let mut texts = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
		for p in points { ids.push(p.id.clone()); sources.push(p.payload.source.clone()); texts.push(p.payload.text.clone()); vectors.push(Some(p.vector.iter().map(|&x| Some(x)).collect())); }
		let record_batch = RecordBatch::try_new(schema, vec![
			Arc::new(StringArray::from(ids)),
			Arc::new(StringArray::from(sources)),
			Arc::new(StringArray::from(texts)),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), width)),
		])?;
		Ok(record_batch)
	}
}
