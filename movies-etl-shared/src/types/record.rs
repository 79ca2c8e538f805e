use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::Table;
use crate::errors::ValidationError;
use crate::types::RawRow;

/// A typed value bound to one destination column on insert.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Uuid(Uuid),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Float(Option<f64>),
    /// `None` when the source row carries no value.
    Timestamp(Option<DateTime<Utc>>),
}

/// A validated, typed row of one content table.
///
/// Implementors map raw row fields explicitly, so a column rename in the
/// source shows up as a `MissingField` error instead of silently dropped data.
pub trait Record: Clone + Debug + PartialEq + Serialize + Send + Sync + 'static {
    /// Table the record belongs to.
    const TABLE: Table;

    /// Builds a record from a raw row, ignoring columns it does not know.
    fn from_row(row: &RawRow) -> Result<Self, ValidationError>;

    /// Primary key.
    fn id(&self) -> Uuid;

    /// Column values in the order of the table spec columns.
    fn values(&self) -> Vec<ColumnValue>;

    /// Compares every field except the created/updated timestamps.
    fn content_eq(&self, other: &Self) -> bool;
}
