//! Configuration module for the movies ETL.
//! Reads settings from the environment and wires up the connections.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, PostgresSettings, Settings};
