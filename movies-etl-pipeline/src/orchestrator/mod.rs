//! Orchestrator module for the movies ETL pipeline.
//!
//! Coordinates the extractor, transformer, loader and verifier over every
//! table of the load plan. A run moves through these stages:
//!
//! 1. Load every table in plan order inside one destination transaction
//! 2. Commit
//! 3. Verify every table through a separate destination connection
//!
//! A failed load rolls the transaction back. A failed verification happens
//! after the commit, so the data stays and only the run fails.
use std::collections::HashMap;

use movies_etl_shared::{
    FilmWork, Genre, GenreFilmWork, LoadPlan, Person, PersonFilmWork, Record, Table,
};
use sqlx::{Connection, PgConnection, SqliteConnection};
use tracing::{error, info, instrument};

use crate::errors::{LoadError, PipelineError, VerifyError};
use crate::extractor::{DEFAULT_BATCH_SIZE, Extractor};
use crate::loader::{LoadSummary, Loader, MAX_BIND_PARAMS, TimestampPolicy};
use crate::transformer::Transformer;
use crate::verifier::{TableVerification, Verifier};

/// Configuration for a transfer run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    batch_size: usize,
    timestamps: TimestampPolicy,
    plan: LoadPlan,
    verify: bool,
    /// Per-table overrides of the verification ordering column.
    verify_order: HashMap<Table, String>,
}

impl PipelineConfig {
    /// Creates a configuration with the default plan, destination-clock
    /// timestamps and verification enabled.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Rows per batch, for extraction, loading and verification alike
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineConfig)` - The batch size is usable
    /// * `Err(PipelineError::Config)` - The batch size is zero, or one batch
    ///   of the widest table would exceed the bind parameter limit
    pub fn new(batch_size: usize) -> Result<Self, PipelineError> {
        if batch_size == 0 {
            return Err(PipelineError::config("batch size must be greater than zero"));
        }

        let max_batch_size = max_batch_size();
        if batch_size > max_batch_size {
            return Err(PipelineError::config(format!(
                "batch size {batch_size} exceeds the maximum of {max_batch_size} rows per insert"
            )));
        }

        Ok(Self {
            batch_size,
            timestamps: TimestampPolicy::default(),
            plan: LoadPlan::default(),
            verify: true,
            verify_order: HashMap::new(),
        })
    }

    pub fn with_timestamps(mut self, timestamps: TimestampPolicy) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_plan(mut self, plan: LoadPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Overrides the column used to order `table` during verification.
    ///
    /// The column must exist in the source table.
    pub fn with_verify_order(
        mut self,
        table: Table,
        column: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let column = column.into();
        if !table.spec().has_source_column(&column) {
            return Err(PipelineError::config(format!(
                "cannot order {table} by unknown column '{column}'"
            )));
        }
        self.verify_order.insert(table, column);
        Ok(self)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn timestamps(&self) -> TimestampPolicy {
        self.timestamps
    }

    pub fn plan(&self) -> &LoadPlan {
        &self.plan
    }

    pub fn verify(&self) -> bool {
        self.verify
    }

    /// Ordering column for `table`, falling back to the catalog default.
    pub fn verify_order(&self, table: Table) -> &str {
        self.verify_order
            .get(&table)
            .map(String::as_str)
            .unwrap_or(table.spec().verify_order)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            timestamps: TimestampPolicy::default(),
            plan: LoadPlan::default(),
            verify: true,
            verify_order: HashMap::new(),
        }
    }
}

/// Largest batch whose insert stays within the bind parameter limit for every table.
fn max_batch_size() -> usize {
    let widest = Table::ALL
        .iter()
        .map(|table| table.spec().columns.len())
        .max()
        .unwrap_or(1);
    MAX_BIND_PARAMS / widest
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// One entry per table, in load order.
    pub loaded: Vec<LoadSummary>,
    /// One entry per table, in load order. Empty when verification is disabled.
    pub verified: Vec<TableVerification>,
}

impl TransferReport {
    pub fn loaded(&self, table: Table) -> Option<&LoadSummary> {
        self.loaded.iter().find(|summary| summary.table == table)
    }

    pub fn rows_inserted(&self) -> u64 {
        self.loaded.iter().map(|summary| summary.inserted).sum()
    }
}

/// Orchestrator that runs the pipeline table by table.
pub struct Orchestrator {
    config: PipelineConfig,
    extractor: Extractor,
    transformer: Transformer,
    loader: Loader,
    verifier: Verifier,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            extractor: Extractor::new(config.batch_size),
            transformer: Transformer::new().with_timestamps(config.timestamps),
            loader: Loader::new(config.timestamps),
            verifier: Verifier::new(config.batch_size, config.timestamps),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs a full transfer.
    ///
    /// # Arguments
    ///
    /// * `source` - Source connection
    /// * `destination` - Destination connection used for the load transaction
    /// * `verification` - Separate destination connection used for verification reads
    ///
    /// # Returns
    ///
    /// * `Ok(TransferReport)` - Every table loaded, committed and (if enabled) verified
    /// * `Err(PipelineError)` - The first failure. Load failures leave the destination untouched.
    #[instrument(skip_all, fields(batch_size = self.config.batch_size, timestamps = %self.config.timestamps))]
    pub async fn run(
        &self,
        source: &mut SqliteConnection,
        destination: &mut PgConnection,
        verification: &mut PgConnection,
    ) -> Result<TransferReport, PipelineError> {
        info!(tables = self.config.plan.tables().len(), "Starting transfer");

        let mut tx = destination.begin().await.map_err(PipelineError::Transaction)?;
        let loaded = match self.load_all(source, &mut tx).await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(error = %e, "Load failed, rolling back");
                if let Err(rollback) = tx.rollback().await {
                    error!(error = %rollback, "Failed to roll back load transaction");
                }
                return Err(e.into());
            }
        };
        tx.commit().await.map_err(PipelineError::Transaction)?;
        info!(rows_inserted = loaded.iter().map(|s| s.inserted).sum::<u64>(), "Load committed");

        let verified = if self.config.verify {
            self.verify_all(source, verification).await?
        } else {
            info!("Verification disabled");
            Vec::new()
        };

        Ok(TransferReport { loaded, verified })
    }

    /// Loads every table of the plan in order.
    ///
    /// Issues no transaction boundaries itself. Pass a transaction to make
    /// the load atomic.
    pub async fn load_all(
        &self,
        source: &mut SqliteConnection,
        destination: &mut PgConnection,
    ) -> Result<Vec<LoadSummary>, LoadError> {
        let mut loaded = Vec::with_capacity(self.config.plan.tables().len());

        for &table in self.config.plan.tables() {
            let summary = match table {
                Table::FilmWork => self.load_table::<FilmWork>(source, destination).await,
                Table::Genre => self.load_table::<Genre>(source, destination).await,
                Table::Person => self.load_table::<Person>(source, destination).await,
                Table::GenreFilmWork => {
                    self.load_table::<GenreFilmWork>(source, destination).await
                }
                Table::PersonFilmWork => {
                    self.load_table::<PersonFilmWork>(source, destination).await
                }
            }?;

            info!(
                table = %table,
                batches = summary.batches,
                rows = summary.rows,
                inserted = summary.inserted,
                skipped = summary.skipped(),
                "Table loaded"
            );
            loaded.push(summary);
        }

        Ok(loaded)
    }

    /// Verifies every table of the plan in order.
    pub async fn verify_all(
        &self,
        source: &mut SqliteConnection,
        destination: &mut PgConnection,
    ) -> Result<Vec<TableVerification>, VerifyError> {
        let mut verified = Vec::with_capacity(self.config.plan.tables().len());

        for &table in self.config.plan.tables() {
            let order_by = self.config.verify_order(table);
            let verification = match table {
                Table::FilmWork => {
                    self.verifier
                        .verify::<FilmWork>(source, destination, order_by)
                        .await
                }
                Table::Genre => {
                    self.verifier
                        .verify::<Genre>(source, destination, order_by)
                        .await
                }
                Table::Person => {
                    self.verifier
                        .verify::<Person>(source, destination, order_by)
                        .await
                }
                Table::GenreFilmWork => {
                    self.verifier
                        .verify::<GenreFilmWork>(source, destination, order_by)
                        .await
                }
                Table::PersonFilmWork => {
                    self.verifier
                        .verify::<PersonFilmWork>(source, destination, order_by)
                        .await
                }
            }?;
            verified.push(verification);
        }

        Ok(verified)
    }

    async fn load_table<R: Record>(
        &self,
        source: &mut SqliteConnection,
        destination: &mut PgConnection,
    ) -> Result<LoadSummary, LoadError> {
        let rows = self.extractor.extract(source, R::TABLE, None);
        let records = self.transformer.transform::<R>(rows);
        self.loader.load(destination, records).await
    }
}
