//! Error types for the orchestrator module of the movies ETL pipeline.
use movies_etl_shared::PlanError;
use thiserror::Error;

use crate::errors::{LoadError, VerifyError};

/// Represents errors that can end a transfer run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Load plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("Transaction error: {0}")]
    Transaction(#[source] sqlx::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
