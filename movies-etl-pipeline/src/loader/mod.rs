//! Loader module for the movies ETL pipeline.
//!
//! Writes record batches into the destination with multi-row inserts. Rows
//! whose id already exists are skipped, so loading the same source twice
//! leaves the destination unchanged.
use std::fmt;
use std::str::FromStr;

use futures::StreamExt;
use movies_etl_shared::{ColumnValue, Record, Table};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::{error, info, instrument};

use crate::errors::{LoadError, PipelineError, TransformError};
use crate::extractor::BatchStream;

/// Maximum number of bind parameters PostgreSQL accepts in one statement.
pub const MAX_BIND_PARAMS: usize = 65535;

/// How created/modified columns are filled on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// Stamp rows with the destination's transaction time.
    #[default]
    DestinationClock,
    /// Keep the timestamps read from the source.
    Preserve,
}

impl TimestampPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            TimestampPolicy::DestinationClock => "destination-clock",
            TimestampPolicy::Preserve => "preserve",
        }
    }
}

impl fmt::Display for TimestampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "destination-clock" => Ok(TimestampPolicy::DestinationClock),
            "preserve" => Ok(TimestampPolicy::Preserve),
            other => Err(PipelineError::config(format!(
                "unknown timestamp policy '{other}', expected 'destination-clock' or 'preserve'"
            ))),
        }
    }
}

/// Totals for one loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub table: Table,
    pub batches: usize,
    /// Rows read from the source.
    pub rows: usize,
    /// Rows actually inserted. The rest already existed.
    pub inserted: u64,
}

impl LoadSummary {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            batches: 0,
            rows: 0,
            inserted: 0,
        }
    }

    pub fn skipped(&self) -> u64 {
        (self.rows as u64).saturating_sub(self.inserted)
    }
}

/// Loader that inserts records into PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    timestamps: TimestampPolicy,
}

impl Loader {
    pub fn new(timestamps: TimestampPolicy) -> Self {
        Self { timestamps }
    }

    pub fn timestamps(&self) -> TimestampPolicy {
        self.timestamps
    }

    /// Builds the insert statement for a non-empty slice of records.
    ///
    /// Columns follow the table spec. Under [`TimestampPolicy::DestinationClock`]
    /// timestamp columns are written as `NOW()` instead of bound values.
    pub fn insert_query<R: Record>(&self, records: &[R]) -> QueryBuilder<'static, Postgres> {
        let spec = R::TABLE.spec();
        let columns = spec.destination_columns().collect::<Vec<_>>().join(", ");

        let mut query_builder =
            QueryBuilder::new(format!("INSERT INTO {} ({}) ", spec.name, columns));

        let timestamps = self.timestamps;
        query_builder.push_values(records, |mut b, record| {
            for value in record.values() {
                match value {
                    ColumnValue::Uuid(id) => {
                        b.push_bind(id);
                    }
                    ColumnValue::Text(text) => {
                        b.push_bind(text);
                    }
                    ColumnValue::Date(date) => {
                        b.push_bind(date);
                    }
                    ColumnValue::Float(float) => {
                        b.push_bind(float);
                    }
                    ColumnValue::Timestamp(_) if timestamps == TimestampPolicy::DestinationClock => {
                        b.push("NOW()");
                    }
                    ColumnValue::Timestamp(ts) => {
                        b.push_bind(ts);
                    }
                }
            }
        });

        query_builder.push(" ON CONFLICT (id) DO NOTHING");
        query_builder
    }

    /// Inserts one batch and returns the number of rows actually inserted.
    ///
    /// # Arguments
    ///
    /// * `destination` - Connection or transaction to write through
    /// * `batch` - 1-based batch number, used in errors
    /// * `records` - Records to insert (empty slices are no-ops)
    pub async fn load_batch<R: Record>(
        &self,
        destination: &mut PgConnection,
        batch: usize,
        records: &[R],
    ) -> Result<u64, LoadError> {
        if records.is_empty() {
            return Ok(0);
        }

        let result = self
            .insert_query(records)
            .build()
            .execute(&mut *destination)
            .await
            .map_err(|source| {
                error!(table = %R::TABLE, batch, error = %source, "Failed to insert batch");
                LoadError::Database {
                    table: R::TABLE,
                    batch,
                    source,
                }
            })?;

        Ok(result.rows_affected())
    }

    /// Drains a stream of record batches into the destination.
    ///
    /// Stops at the first failing batch. Batches already inserted stay in
    /// place; callers wrap the load in a transaction to discard them.
    #[instrument(skip(self, destination, batches), fields(table = %R::TABLE))]
    pub async fn load<R: Record>(
        &self,
        destination: &mut PgConnection,
        mut batches: BatchStream<'_, R, TransformError>,
    ) -> Result<LoadSummary, LoadError> {
        let mut summary = LoadSummary::new(R::TABLE);

        while let Some(batch) = batches.next().await {
            let records = batch?;
            summary.batches += 1;

            let inserted = self
                .load_batch(destination, summary.batches, &records)
                .await?;
            summary.rows += records.len();
            summary.inserted += inserted;

            info!(
                batch = summary.batches,
                rows = records.len(),
                inserted,
                skipped = records.len() as u64 - inserted,
                "Loaded batch"
            );
        }

        Ok(summary)
    }
}
