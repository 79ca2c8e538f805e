//! Transformer module for the movies ETL pipeline.
//!
//! Turns batches of raw rows into batches of typed records.
use futures::StreamExt;
use movies_etl_shared::{RawRow, RawValue, Record, ValidationError};
use tracing::{debug, error};

use crate::errors::{ExtractError, TransformError};
use crate::extractor::BatchStream;
use crate::loader::TimestampPolicy;

/// Transformer that validates raw rows into records.
///
/// Batches keep their size and row order. A row that fails validation fails
/// the whole batch it belongs to.
///
/// Source timestamps are only required under [`TimestampPolicy::Preserve`].
/// Under the destination clock they are never written, so a missing or NULL
/// value is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer {
    timestamps: TimestampPolicy,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamps(mut self, timestamps: TimestampPolicy) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn timestamps(&self) -> TimestampPolicy {
        self.timestamps
    }

    fn record<R: Record>(&self, raw: &RawRow) -> Result<R, ValidationError> {
        let record = R::from_row(raw)?;
        if self.timestamps == TimestampPolicy::Preserve {
            require_timestamps::<R>(raw)?;
        }
        Ok(record)
    }

    /// Transforms one batch of raw rows.
    ///
    /// # Arguments
    ///
    /// * `batch` - 1-based batch number, used in errors and logs
    /// * `rows` - Raw rows of the record's table
    ///
    /// # Returns
    ///
    /// The records in row order, or the first validation failure.
    pub fn transform_batch<R: Record>(
        &self,
        batch: usize,
        rows: &[RawRow],
    ) -> Result<Vec<R>, TransformError> {
        let records = rows
            .iter()
            .enumerate()
            .map(|(row, raw)| {
                self.record::<R>(raw).map_err(|source| {
                    error!(
                        table = %R::TABLE,
                        batch,
                        row,
                        field = source.field(),
                        error = %source,
                        "Invalid source row"
                    );
                    TransformError::Validation {
                        table: R::TABLE,
                        batch,
                        row,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<R>, _>>()?;

        debug!(table = %R::TABLE, batch, records = records.len(), "Transformed batch");
        Ok(records)
    }

    /// Maps a stream of raw row batches into a stream of record batches.
    ///
    /// Upstream errors are passed through unchanged.
    pub fn transform<'a, R: Record>(
        &self,
        batches: BatchStream<'a, RawRow, ExtractError>,
    ) -> BatchStream<'a, R, TransformError> {
        let transformer = *self;
        batches
            .enumerate()
            .map(move |(index, batch)| -> Result<Vec<R>, TransformError> {
                let rows = batch?;
                transformer.transform_batch::<R>(index + 1, &rows)
            })
            .boxed()
    }
}

/// Fails on the first timestamp column of `R` that is missing or NULL.
fn require_timestamps<R: Record>(raw: &RawRow) -> Result<(), ValidationError> {
    R::TABLE
        .spec()
        .columns
        .iter()
        .filter(|column| column.is_timestamp())
        .try_for_each(|column| match raw.get(column.field) {
            None => Err(ValidationError::MissingField {
                field: column.field,
            }),
            Some(RawValue::Null) => Err(ValidationError::UnexpectedNull {
                field: column.field,
            }),
            Some(_) => Ok(()),
        })
}
