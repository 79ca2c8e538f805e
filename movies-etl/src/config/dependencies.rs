//! Connection setup and wiring for the movies ETL.

use movies_etl_pipeline::{Orchestrator, TransferReport};
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, PgConnection, SqliteConnection};
use tracing::{error, info};

use crate::config::{PostgresSettings, Settings};
use crate::errors::TransferError;

/// `Dependencies` holds the connections and the orchestrator of one run.
///
/// The source is opened read-only. The destination gets two connections,
/// one for the load transaction and one for verification reads.
pub struct Dependencies {
    pub source: SqliteConnection,
    pub destination: PgConnection,
    pub verification: PgConnection,
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Opens every connection the run needs.
    ///
    /// Connections opened before a failing one are closed again before the
    /// error is returned.
    ///
    /// # Arguments
    ///
    /// * `settings` - Settings read from the environment
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - All three connections are open
    /// * `Err(TransferError::Connection)` - A database could not be reached
    pub async fn new(settings: &Settings) -> Result<Self, TransferError> {
        let source_options = SqliteConnectOptions::new()
            .filename(&settings.sqlite_db)
            .read_only(true);
        let source = SqliteConnection::connect_with(&source_options)
            .await
            .map_err(|source| TransferError::Connection {
                target: "source",
                source,
            })?;
        info!(path = %settings.sqlite_db.display(), "Connected to source");

        let destination_options = postgres_options(&settings.postgres);
        let destination = match PgConnection::connect_with(&destination_options).await {
            Ok(conn) => conn,
            Err(e) => {
                close_quietly(source.close(), "source").await;
                return Err(TransferError::Connection {
                    target: "destination",
                    source: e,
                });
            }
        };

        let verification = match PgConnection::connect_with(&destination_options).await {
            Ok(conn) => conn,
            Err(e) => {
                close_quietly(source.close(), "source").await;
                close_quietly(destination.close(), "destination").await;
                return Err(TransferError::Connection {
                    target: "destination",
                    source: e,
                });
            }
        };
        info!(
            host = %settings.postgres.host,
            port = settings.postgres.port,
            database = %settings.postgres.database,
            schema = %settings.postgres.schema,
            "Connected to destination"
        );

        Ok(Self {
            source,
            destination,
            verification,
            orchestrator: Orchestrator::new(settings.pipeline.clone()),
        })
    }

    /// Runs the transfer over the held connections.
    pub async fn run(&mut self) -> Result<TransferReport, TransferError> {
        let report = self
            .orchestrator
            .run(
                &mut self.source,
                &mut self.destination,
                &mut self.verification,
            )
            .await?;
        Ok(report)
    }

    /// Closes every connection. Failures are logged, not returned.
    pub async fn close(self) {
        close_quietly(self.source.close(), "source").await;
        close_quietly(self.destination.close(), "destination").await;
        close_quietly(self.verification.close(), "verification").await;
    }
}

fn postgres_options(settings: &PostgresSettings) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database)
        .options([("search_path", settings.schema.as_str())])
}

async fn close_quietly(
    close: impl Future<Output = Result<(), sqlx::Error>>,
    connection: &'static str,
) {
    if let Err(e) = close.await {
        error!(connection, error = %e, "Failed to close connection");
    }
}
