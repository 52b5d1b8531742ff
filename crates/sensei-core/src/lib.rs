//! sensei-core
//!
//! Shared building blocks for the study-question pipeline: settings, the error
//! taxonomy, domain types, the embedding provider trait, the chunker and the
//! corpus scanner.

pub mod chunker;
pub mod config;
pub mod corpus;
pub mod error;
pub mod telemetry;
pub mod traits;
pub mod types;
