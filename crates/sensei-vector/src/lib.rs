//! sensei-vector
//!
//! LanceDB-backed collections of embedded chunks and the batch ingestion
//! pipeline that fills them.
pub mod ingest;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use ingest::{chunk_stream, ingest, IngestOptions, PointSink};
pub use table::{collection_name, open_collection, open_db, open_db_with, VectorCollection};
