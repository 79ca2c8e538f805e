//! Error types for the extractor module of the movies ETL pipeline.
//! Defines the data access errors that can occur while reading the source.
use movies_etl_shared::Table;
use thiserror::Error;

/// Represents errors that can occur while reading a source table.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read table {table}: {source}")]
    Query { table: Table, source: sqlx::Error },

    #[error("Failed to decode a row of table {table}: {source}")]
    Decode { table: Table, source: sqlx::Error },
}

impl ExtractError {
    pub fn table(&self) -> Table {
        match self {
            Self::Query { table, .. } | Self::Decode { table, .. } => *table,
        }
    }
}
