//! Settings read from the environment.

use std::env;
use std::fmt;
use std::path::PathBuf;

use movies_etl_pipeline::{DEFAULT_BATCH_SIZE, PipelineConfig, TimestampPolicy};
use movies_etl_shared::Table;

use crate::errors::TransferError;

/// Default PostgreSQL host.
const DEFAULT_POSTGRES_HOST: &str = "localhost";

/// Default PostgreSQL port.
const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Default schema placed on the session search path.
const DEFAULT_POSTGRES_SCHEMA: &str = "content";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`. Anything other than `json` selects pretty output.
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Destination connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub schema: String,
}

impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Everything a transfer run needs to know.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path of the source SQLite file.
    pub sqlite_db: PathBuf,
    pub postgres: PostgresSettings,
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Reads settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SQLITE_DB`: Source database file (required)
    /// - `POSTGRES_DB`, `POSTGRES_USER`, `POSTGRES_PASSWORD`: Destination credentials (required)
    /// - `POSTGRES_HOST`: Destination host (default: localhost)
    /// - `POSTGRES_PORT`: Destination port (default: 5432)
    /// - `POSTGRES_SCHEMA`: Schema put on the search path (default: content)
    /// - `BATCH_SIZE`: Rows per batch (default: 100)
    /// - `TIMESTAMP_POLICY`: "destination-clock" or "preserve" (default: destination-clock)
    /// - `VERIFY`: Run the verification pass (default: true)
    /// - `VERIFY_ORDER`: Ordering overrides such as `person=created_at,genre=name`
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Every variable is present and valid
    /// * `Err(TransferError)` - The first missing or invalid variable
    pub fn from_env() -> Result<Self, TransferError> {
        let sqlite_db = PathBuf::from(required("SQLITE_DB")?);

        let postgres = PostgresSettings {
            database: required("POSTGRES_DB")?,
            user: required("POSTGRES_USER")?,
            password: required("POSTGRES_PASSWORD")?,
            host: optional("POSTGRES_HOST").unwrap_or_else(|| DEFAULT_POSTGRES_HOST.to_string()),
            port: parse_or("POSTGRES_PORT", DEFAULT_POSTGRES_PORT)?,
            schema: optional("POSTGRES_SCHEMA")
                .unwrap_or_else(|| DEFAULT_POSTGRES_SCHEMA.to_string()),
        };

        let batch_size = parse_or("BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let mut pipeline = PipelineConfig::new(batch_size)
            .map_err(|e| TransferError::config("BATCH_SIZE", e.to_string()))?;

        if let Some(policy) = optional("TIMESTAMP_POLICY") {
            let policy = policy
                .parse::<TimestampPolicy>()
                .map_err(|e| TransferError::config("TIMESTAMP_POLICY", e.to_string()))?;
            pipeline = pipeline.with_timestamps(policy);
        }

        if let Some(verify) = optional("VERIFY") {
            pipeline = pipeline.with_verify(parse_bool("VERIFY", &verify)?);
        }

        if let Some(overrides) = optional("VERIFY_ORDER") {
            for (table, column) in parse_verify_order(&overrides)? {
                pipeline = pipeline
                    .with_verify_order(table, column)
                    .map_err(|e| TransferError::config("VERIFY_ORDER", e.to_string()))?;
            }
        }

        Ok(Self {
            sqlite_db,
            postgres,
            pipeline,
        })
    }
}

fn optional(variable: &'static str) -> Option<String> {
    env::var(variable)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(variable: &'static str) -> Result<String, TransferError> {
    optional(variable).ok_or(TransferError::MissingVar(variable))
}

fn parse_or<T>(variable: &'static str, default: T) -> Result<T, TransferError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match optional(variable) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e| TransferError::config(variable, format!("'{value}': {e}"))),
    }
}

fn parse_bool(variable: &'static str, value: &str) -> Result<bool, TransferError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(TransferError::config(
            variable,
            format!("'{other}' is not a boolean"),
        )),
    }
}

/// Parses `table=column` pairs separated by commas.
fn parse_verify_order(value: &str) -> Result<Vec<(Table, String)>, TransferError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(Table, String), TransferError> {
            let (table, column) = entry.split_once('=').ok_or_else(|| {
                TransferError::config("VERIFY_ORDER", format!("'{entry}' is not table=column"))
            })?;
            let table = table
                .parse::<Table>()
                .map_err(|e| TransferError::config("VERIFY_ORDER", e.to_string()))?;
            Ok((table, column.trim().to_string()))
        })
        .collect()
}
