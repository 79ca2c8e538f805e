//! Error types for the movies ETL binary.
//! Consolidates configuration and connection failures with the errors
//! returned by the pipeline itself.
use movies_etl_pipeline::errors::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {variable}: {reason}")]
    Config {
        variable: &'static str,
        reason: String,
    },

    #[error("Failed to connect to the {target} database: {source}")]
    Connection {
        target: &'static str,
        source: sqlx::Error,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl TransferError {
    pub fn config(variable: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            variable,
            reason: reason.into(),
        }
    }
}
