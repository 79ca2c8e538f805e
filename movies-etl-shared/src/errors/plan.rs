use thiserror::Error;

use crate::catalog::Table;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Represents a load plan that would insert rows before the rows they reference.
pub enum PlanError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Table {0} appears more than once in the load plan")]
    Duplicate(Table),

    #[error("Table {table} depends on {dependency}, which is not in the load plan")]
    MissingDependency { table: Table, dependency: Table },

    #[error("Table {table} is loaded before its dependency {dependency}")]
    OutOfOrder { table: Table, dependency: Table },
}
