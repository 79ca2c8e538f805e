//! # Movies ETL Shared
//! This crate defines the data structures shared across the movies ETL pipeline.
//! It includes the typed records for every content table, the raw row model
//! produced by extraction, the table catalog with its dependency-ordered load
//! plan, and the validation errors raised while building records.
pub mod catalog;
pub mod errors;
pub mod types;

pub use catalog::{ColumnKind, ColumnSpec, LoadPlan, Table, TableSpec};
pub use errors::{PlanError, ValidationError};
pub use types::{
    ColumnValue, FilmWork, FilmWorkType, Genre, GenreFilmWork, Person, PersonFilmWork, RawRow,
    RawValue, Record,
};
