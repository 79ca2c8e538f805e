//! Error types for the loader module of the movies ETL pipeline.
//! Defines the errors that can occur while inserting records into the destination.
use movies_etl_shared::Table;
use thiserror::Error;

use crate::errors::TransformError;

/// Represents errors that can occur within the loader.
///
/// This enum consolidates failures coming from upstream stages with the
/// database errors raised by the insert statements themselves.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Failed to insert batch {batch} into {table}: {source}")]
    Database {
        table: Table,
        batch: usize,
        source: sqlx::Error,
    },
}
