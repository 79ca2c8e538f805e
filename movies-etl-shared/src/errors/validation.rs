//! Error types for record construction.
//! Defines the conditions under which a raw row cannot become a typed record.
use thiserror::Error;

/// Represents errors that can occur while building a record from a raw row.
///
/// Every variant names the offending field so the failure can be traced back
/// to a single column of a single row.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    #[error("Unexpected NULL in field: {field}")]
    UnexpectedNull { field: &'static str },

    #[error("Wrong type for field {field}: expected {expected}, found {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid UUID in field {field}: {value}")]
    InvalidUuid { field: &'static str, value: String },

    #[error("Invalid date in field {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid timestamp in field {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("Invalid value in field {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ValidationError {
    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field }
            | Self::UnexpectedNull { field }
            | Self::WrongType { field, .. }
            | Self::InvalidUuid { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::InvalidTimestamp { field, .. }
            | Self::InvalidValue { field, .. } => field,
        }
    }
}
