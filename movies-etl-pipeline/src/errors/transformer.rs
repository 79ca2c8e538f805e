//! Error types for the transformer module of the movies ETL pipeline.
use movies_etl_shared::{Table, ValidationError};
use thiserror::Error;

use crate::errors::ExtractError;

/// Represents errors that can occur while turning raw rows into records.
///
/// A single invalid row fails its whole batch.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Invalid row {row} in batch {batch} of table {table}: {source}")]
    Validation {
        table: Table,
        batch: usize,
        row: usize,
        source: ValidationError,
    },
}
