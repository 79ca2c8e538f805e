//! This module defines the `Extractor`, which reads source tables in batches.
//!
//! Every extraction runs a single forward-only query and groups the rows it
//! returns into batches of a fixed size. The resulting stream is lazy, finite,
//! and can only be restarted by calling [`Extractor::extract`] again.
mod row;

use async_stream::stream;
use futures::TryStreamExt;
use futures::stream::BoxStream;
use movies_etl_shared::{RawRow, Table};
use sqlx::SqliteConnection;
use tracing::{debug, error};

use crate::errors::ExtractError;

pub use row::{decode_pg_row, decode_sqlite_row};

/// Number of rows per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// A lazy stream of batches. Batches are never empty.
pub type BatchStream<'a, T, E> = BoxStream<'a, Result<Vec<T>, E>>;

/// `Extractor` pages through source tables.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    batch_size: usize,
}

impl Extractor {
    /// Creates a new `Extractor` yielding batches of at most `batch_size` rows.
    ///
    /// A `batch_size` of 0 is raised to 1. Configured sizes are validated
    /// earlier by [`PipelineConfig::new`](crate::PipelineConfig::new), which
    /// rejects 0.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Streams the rows of `table` in batches.
    ///
    /// # Arguments
    ///
    /// * `source` - Open SQLite connection, borrowed for the lifetime of the stream
    /// * `table` - Table to read
    /// * `order_by` - Optional source column to order rows by
    ///
    /// # Returns
    ///
    /// A stream of non-empty batches that ends after the last row. A read or
    /// decode failure is yielded as an `ExtractError` and ends the stream.
    pub fn extract<'c>(
        &self,
        source: &'c mut SqliteConnection,
        table: Table,
        order_by: Option<&str>,
    ) -> BatchStream<'c, RawRow, ExtractError> {
        let batch_size = self.batch_size;
        let sql = select_sql(table, order_by);

        Box::pin(stream! {
            let mut rows = sqlx::query(&sql).fetch(&mut *source);
            let mut batch = Vec::with_capacity(batch_size);
            let mut batch_number = 0_usize;

            loop {
                let row = match rows.try_next().await {
                    Ok(Some(row)) => row,
                    Ok(None) => break,
                    Err(e) => {
                        error!(table = %table, error = %e, "Failed to read source rows");
                        yield Err(ExtractError::Query { table, source: e });
                        return;
                    }
                };

                match decode_sqlite_row(&row) {
                    Ok(raw) => batch.push(raw),
                    Err(e) => {
                        error!(table = %table, error = %e, "Failed to decode source row");
                        yield Err(ExtractError::Decode { table, source: e });
                        return;
                    }
                }

                if batch.len() == batch_size {
                    batch_number += 1;
                    debug!(table = %table, batch = batch_number, rows = batch.len(), "Extracted batch");
                    yield Ok(std::mem::replace(&mut batch, Vec::with_capacity(batch_size)));
                }
            }

            if !batch.is_empty() {
                batch_number += 1;
                debug!(table = %table, batch = batch_number, rows = batch.len(), "Extracted batch");
                yield Ok(batch);
            }
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

fn select_sql(table: Table, order_by: Option<&str>) -> String {
    match order_by {
        Some(column) => format!("SELECT * FROM {} ORDER BY {}", table.name(), column),
        None => format!("SELECT * FROM {}", table.name()),
    }
}
