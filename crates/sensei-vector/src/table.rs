//! LanceDB connection and collection housekeeping.
//!
//! A collection is one Lance table whose vector column width is fixed at
//! creation. `ensure` is create-if-absent and refuses a table whose width
//! differs from the active provider's.
use std::time::Duration;

use anyhow::{Context, Result};
use arrow_array::{RecordBatch, RecordBatchIterator, StringArray};
use lancedb::{connect, Connection, Table};
use tracing::info;

use sensei_core::config::VectorSettings;
use sensei_core::error::Error;
use sensei_core::traits::EmbedProvider;

use crate::schema::{build_collection_schema, vector_dim, VECTOR_COLUMN};

/// Every read re-checks for versions written through other connections.
pub async fn open_db(uri: &str) -> Result<Connection> {
    open_db_with(uri, Duration::ZERO).await
}

/// Table handles from this connection pick up external writes at most
/// `read_consistency` after they land.
pub async fn open_db_with(uri: &str, read_consistency: Duration) -> Result<Connection> {
    connect(uri)
        .read_consistency_interval(read_consistency)
        .execute()
        .await
        .with_context(|| format!("Failed to open LanceDB at {uri}"))
}

/// Collection for the active provider: the explicit `vector.collection` if
/// set, else `<prefix>_<embedder id>` so providers never share a table.
pub fn collection_name(settings: &VectorSettings, provider: &dyn EmbedProvider) -> String {
    if let Some(name) = &settings.collection {
        return name.clone();
    }
    let id: String = provider
        .embedder_id()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}_{}", settings.collection_prefix, id)
}

/// Open the database and ensure the provider's collection in one step.
pub async fn open_collection(settings: &VectorSettings, provider: &dyn EmbedProvider) -> Result<VectorCollection> {
    let conn = open_db_with(&settings.uri_path(), Duration::from_secs(settings.read_consistency_secs)).await?;
    let name = collection_name(settings, provider);
    VectorCollection::ensure(&conn, &name, provider.dim()).await
}

#[derive(Clone)]
pub struct VectorCollection {
    pub(crate) table: Table,
    pub(crate) name: String,
    pub(crate) dim: usize,
}

impl VectorCollection {
    pub async fn ensure(conn: &Connection, name: &str, dim: usize) -> Result<Self> {
        let names = conn.table_names().execute().await?;
        let table = if names.iter().any(|n| n == name) {
            let table = conn.open_table(name).execute().await?;
            let schema = table.schema().await?;
            match vector_dim(&schema) {
                Some(found) if found == dim => table,
                Some(found) => {
                    return Err(Error::DimensionMismatch { collection: name.to_string(), expected: dim, found }.into())
                }
                None => {
                    return Err(Error::InvalidConfig(format!("collection '{name}' has no '{VECTOR_COLUMN}' column")).into())
                }
            }
        } else {
            let width = i32::try_from(dim).map_err(|_| Error::InvalidConfig(format!("dimension {dim} too large")))?;
            let schema = build_collection_schema(width);
            // create empty table with 0 rows
            let iter = RecordBatchIterator::new(Vec::<Result<RecordBatch, arrow_schema::ArrowError>>::new(), schema);
            let table = conn.create_table(name, Box::new(iter)).execute().await?;
            info!(collection = name, dim, "created collection");
            table
        };
        Ok(Self { table, name: name.to_string(), dim })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn dim(&self) -> usize { self.dim }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.table.count_rows(None).await?)
    }

    /// Delete every point; the collection itself stays.
    pub async fn clear(&self) -> Result<()> {
        self.table.delete("true").await?;
        info!(collection = %self.name, "cleared collection");
        Ok(())
    }
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow::anyhow!("{name} column missing"))
}
