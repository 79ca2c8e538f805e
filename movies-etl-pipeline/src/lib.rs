//! # Movies ETL Pipeline
//! This crate implements the batched transfer of the content tables from a
//! SQLite source into a PostgreSQL destination.
//!
//! The pipeline follows the Extractor-Transformer-Loader pattern:
//!
//! 1. **Extractor**: pages through a source table in fixed-size batches
//! 2. **Transformer**: turns raw rows into typed records
//! 3. **Loader**: bulk-inserts records, skipping rows whose id already exists
//! 4. **Verifier**: re-reads source and destination and compares them row by row
//! 5. **Orchestrator**: runs every table in dependency order inside one
//!    transaction, commits, then verifies
pub mod extractor;
pub mod loader;
pub mod orchestrator;
pub mod transformer;
pub mod verifier;

pub mod errors;

pub use extractor::{BatchStream, DEFAULT_BATCH_SIZE, Extractor};
pub use loader::{LoadSummary, Loader, TimestampPolicy};
pub use orchestrator::{Orchestrator, PipelineConfig, TransferReport};
pub use transformer::Transformer;
pub use verifier::{TableVerification, Verifier};
