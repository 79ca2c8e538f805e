//! Verifier module for the movies ETL pipeline.
//!
//! After a load has been committed, the verifier re-reads every source table
//! batch by batch, fetches the destination rows with the same identifiers and
//! compares them record by record. It only reports. Nothing is repaired.
use std::collections::HashMap;

use futures::StreamExt;
use movies_etl_shared::{Record, Table};
use sqlx::{PgConnection, SqliteConnection};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::errors::VerifyError;
use crate::extractor::{Extractor, decode_pg_row};
use crate::loader::TimestampPolicy;
use crate::transformer::Transformer;

/// Totals for one verified table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableVerification {
    pub table: Table,
    pub batches: usize,
    pub rows: usize,
}

/// Verifier comparing source and destination rows.
#[derive(Debug, Clone, Copy)]
pub struct Verifier {
    extractor: Extractor,
    transformer: Transformer,
    timestamps: TimestampPolicy,
}

impl Verifier {
    /// Creates a verifier that reads the source in batches of `batch_size`.
    /// A `batch_size` of 0 is raised to 1, as in [`Extractor::new`].
    ///
    /// Timestamps are only compared under [`TimestampPolicy::Preserve`]. Under
    /// the destination clock they hold load time and can never match.
    pub fn new(batch_size: usize, timestamps: TimestampPolicy) -> Self {
        Self {
            extractor: Extractor::new(batch_size),
            transformer: Transformer::new().with_timestamps(timestamps),
            timestamps,
        }
    }

    /// Query reading destination rows back under their record field names.
    pub fn destination_select_sql(table: Table) -> String {
        let spec = table.spec();
        let exprs = spec
            .columns
            .iter()
            .map(|column| column.select_expr())
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT {} FROM {} WHERE id = ANY($1)", exprs, spec.name)
    }

    /// Verifies one table.
    ///
    /// # Arguments
    ///
    /// * `source` - Source connection, read again from the start
    /// * `destination` - Destination connection holding the committed load
    /// * `order_by` - Source column defining the batch order
    ///
    /// # Returns
    ///
    /// * `Ok(TableVerification)` - Every source row has an equal destination row
    /// * `Err(VerifyError)` - The first mismatch, or a read failure on either side
    #[instrument(skip(self, source, destination), fields(table = %R::TABLE))]
    pub async fn verify<R: Record>(
        &self,
        source: &mut SqliteConnection,
        destination: &mut PgConnection,
        order_by: &str,
    ) -> Result<TableVerification, VerifyError> {
        let table = R::TABLE;
        let sql = Self::destination_select_sql(table);
        let mut verification = TableVerification {
            table,
            batches: 0,
            rows: 0,
        };

        let raw = self.extractor.extract(source, table, Some(order_by));
        let mut batches = self.transformer.transform::<R>(raw);

        while let Some(batch) = batches.next().await {
            let expected = batch?;
            verification.batches += 1;

            let ids: Vec<Uuid> = expected.iter().map(R::id).collect();
            let actual = self.fetch_destination::<R>(destination, &sql, ids).await?;

            self.compare_batch(verification.batches, &expected, actual)?;
            verification.rows += expected.len();
            debug!(batch = verification.batches, rows = expected.len(), "Verified batch");
        }

        info!(
            batches = verification.batches,
            rows = verification.rows,
            "Table verified"
        );
        Ok(verification)
    }

    async fn fetch_destination<R: Record>(
        &self,
        destination: &mut PgConnection,
        sql: &str,
        ids: Vec<Uuid>,
    ) -> Result<Vec<R>, VerifyError> {
        let rows = sqlx::query(sql)
            .bind(ids)
            .fetch_all(&mut *destination)
            .await
            .map_err(|source| {
                error!(table = %R::TABLE, error = %source, "Failed to read destination rows");
                VerifyError::Database {
                    table: R::TABLE,
                    source,
                }
            })?;

        rows.iter()
            .map(|row| {
                let raw = decode_pg_row(row).map_err(|source| VerifyError::Database {
                    table: R::TABLE,
                    source,
                })?;
                R::from_row(&raw).map_err(|source| {
                    error!(
                        table = %R::TABLE,
                        field = source.field(),
                        error = %source,
                        "Invalid destination row"
                    );
                    VerifyError::Validation {
                        table: R::TABLE,
                        source,
                    }
                })
            })
            .collect()
    }

    /// Compares one batch of source records with the destination records
    /// fetched for the same identifiers.
    ///
    /// Destination records are matched to source records by id, so the order
    /// in which the destination returns them does not matter.
    pub fn compare_batch<R: Record>(
        &self,
        batch: usize,
        expected: &[R],
        actual: Vec<R>,
    ) -> Result<(), VerifyError> {
        let table = R::TABLE;

        if expected.len() != actual.len() {
            error!(
                table = %table,
                batch,
                expected = expected.len(),
                found = actual.len(),
                "Row count mismatch"
            );
            return Err(VerifyError::CountMismatch {
                table,
                batch,
                expected: expected.len(),
                found: actual.len(),
            });
        }

        let by_id: HashMap<Uuid, R> = actual
            .into_iter()
            .map(|record| (record.id(), record))
            .collect();

        for source_record in expected {
            let id = source_record.id();
            let Some(destination_record) = by_id.get(&id) else {
                error!(table = %table, batch, %id, "Row missing from destination");
                return Err(VerifyError::MissingRecord { table, batch, id });
            };

            if !self.records_match(source_record, destination_record) {
                error!(
                    table = %table,
                    batch,
                    %id,
                    source = %to_json(source_record),
                    destination = %to_json(destination_record),
                    "Row differs between source and destination"
                );
                return Err(VerifyError::RecordMismatch { table, batch, id });
            }
        }

        Ok(())
    }

    fn records_match<R: Record>(&self, source: &R, destination: &R) -> bool {
        match self.timestamps {
            TimestampPolicy::Preserve => source == destination,
            TimestampPolicy::DestinationClock => source.content_eq(destination),
        }
    }
}

fn to_json<R: Record>(record: &R) -> String {
    serde_json::to_string(record).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
