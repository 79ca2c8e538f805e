//! Error types for the verifier module of the movies ETL pipeline.
use movies_etl_shared::{Table, ValidationError};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::TransformError;

/// Represents a failed post-load check or an error while performing it.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Failed to read table {table} from the destination: {source}")]
    Database { table: Table, source: sqlx::Error },

    #[error("Invalid destination row in table {table}: {source}")]
    Validation {
        table: Table,
        source: ValidationError,
    },

    #[error("Batch {batch} of table {table}: expected {expected} rows in the destination, found {found}")]
    CountMismatch {
        table: Table,
        batch: usize,
        expected: usize,
        found: usize,
    },

    #[error("Batch {batch} of table {table}: row {id} is missing from the destination")]
    MissingRecord { table: Table, batch: usize, id: Uuid },

    #[error("Batch {batch} of table {table}: row {id} differs between source and destination")]
    RecordMismatch { table: Table, batch: usize, id: Uuid },
}
