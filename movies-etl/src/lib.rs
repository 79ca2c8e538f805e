//! Movies ETL Library
//!
//! Configuration loading, connection wiring and error handling for the
//! SQLite to PostgreSQL content transfer.

pub mod config;
pub mod errors;

pub use config::{Dependencies, LogFormat, Settings};
pub use errors::TransferError;
