//! Movies ETL Main Entry Point
//!
//! Copies the content tables from the SQLite source into PostgreSQL, then
//! verifies the destination against the source.

use dotenv::dotenv;
use movies_etl::{Dependencies, LogFormat, Settings, TransferError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("movies_etl=info,movies_etl_pipeline=info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();
        }
    }

    info!(
        service_name = "movies-etl",
        service_version = env!("CARGO_PKG_VERSION"),
        ?format,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), TransferError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing(LogFormat::from_env());

    let settings = Settings::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    info!(
        batch_size = settings.pipeline.batch_size(),
        timestamps = %settings.pipeline.timestamps(),
        verify = settings.pipeline.verify(),
        "Configuration loaded"
    );

    let mut deps = Dependencies::new(&settings).await.inspect_err(|e| {
        error!(error = %e, "Failed to open connections");
    })?;

    let result = deps.run().await;
    deps.close().await;

    match result {
        Ok(report) => {
            info!(
                tables = report.loaded.len(),
                rows_inserted = report.rows_inserted(),
                tables_verified = report.verified.len(),
                "Transfer completed successfully"
            );
            println!("Data transfer completed successfully!");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Transfer failed");
            Err(e)
        }
    }
}
