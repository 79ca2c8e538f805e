//! Error types for the movies ETL shared crate.
//! Consolidates and re-exports errors raised while building records and load plans.
mod plan;
mod validation;

pub use plan::PlanError;
pub use validation::ValidationError;
