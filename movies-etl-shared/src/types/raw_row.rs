use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::errors::ValidationError;

/// A single column value as read from a database, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
}

impl RawValue {
    /// Name of the storage class, used in validation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Integer(_) => "integer",
            RawValue::Real(_) => "real",
            RawValue::Text(_) => "text",
            RawValue::Blob(_) => "blob",
            RawValue::Uuid(_) => "uuid",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Real(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Integer(value)
    }
}

impl From<Uuid> for RawValue {
    fn from(value: Uuid) -> Self {
        RawValue::Uuid(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Null)
    }
}

/// A row as a mapping of column name to raw value.
///
/// Rows may carry more columns than a record needs; records read only the
/// fields they declare through the typed accessors below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    values: HashMap<String, RawValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(column.into(), value.into());
    }

    /// Builder form of [`RawRow::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn value(&self, field: &'static str) -> Result<&RawValue, ValidationError> {
        self.values
            .get(field)
            .ok_or(ValidationError::MissingField { field })
    }

    fn present(&self, field: &'static str) -> Result<Option<&RawValue>, ValidationError> {
        let value = self.value(field)?;
        Ok((!value.is_null()).then_some(value))
    }

    fn required(&self, field: &'static str) -> Result<&RawValue, ValidationError> {
        self.present(field)?
            .ok_or(ValidationError::UnexpectedNull { field })
    }

    /// Reads an identifier. Text and 16-byte blobs are parsed into a UUID.
    pub fn uuid(&self, field: &'static str) -> Result<Uuid, ValidationError> {
        match self.required(field)? {
            RawValue::Uuid(id) => Ok(*id),
            RawValue::Text(text) => {
                Uuid::parse_str(text.trim()).map_err(|_| ValidationError::InvalidUuid {
                    field,
                    value: text.clone(),
                })
            }
            RawValue::Blob(bytes) => {
                Uuid::from_slice(bytes).map_err(|_| ValidationError::InvalidUuid {
                    field,
                    value: format!("<{} bytes>", bytes.len()),
                })
            }
            other => Err(wrong_type(field, "uuid", other)),
        }
    }

    pub fn text(&self, field: &'static str) -> Result<String, ValidationError> {
        match self.required(field)? {
            RawValue::Text(text) => Ok(text.clone()),
            other => Err(wrong_type(field, "text", other)),
        }
    }

    pub fn opt_text(&self, field: &'static str) -> Result<Option<String>, ValidationError> {
        match self.present(field)? {
            None => Ok(None),
            Some(RawValue::Text(text)) => Ok(Some(text.clone())),
            Some(other) => Err(wrong_type(field, "text", other)),
        }
    }

    pub fn opt_float(&self, field: &'static str) -> Result<Option<f64>, ValidationError> {
        match self.present(field)? {
            None => Ok(None),
            Some(RawValue::Real(value)) => Ok(Some(*value)),
            Some(RawValue::Integer(value)) => Ok(Some(*value as f64)),
            Some(other) => Err(wrong_type(field, "real", other)),
        }
    }

    pub fn opt_date(&self, field: &'static str) -> Result<Option<NaiveDate>, ValidationError> {
        match self.present(field)? {
            None => Ok(None),
            Some(RawValue::Text(text)) => parse_date(text)
                .map(Some)
                .ok_or_else(|| ValidationError::InvalidDate {
                    field,
                    value: text.clone(),
                }),
            Some(other) => Err(wrong_type(field, "date", other)),
        }
    }

    /// Reads a timestamp. A missing column reads as `None`, same as NULL.
    pub fn opt_timestamp(
        &self,
        field: &'static str,
    ) -> Result<Option<DateTime<Utc>>, ValidationError> {
        match self.values.get(field) {
            None | Some(RawValue::Null) => Ok(None),
            Some(RawValue::Text(text)) => parse_timestamp(text)
                .map(Some)
                .ok_or_else(|| ValidationError::InvalidTimestamp {
                    field,
                    value: text.clone(),
                }),
            Some(other) => Err(wrong_type(field, "timestamp", other)),
        }
    }
}

impl FromIterator<(String, RawValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn wrong_type(field: &'static str, expected: &'static str, found: &RawValue) -> ValidationError {
    ValidationError::WrongType {
        field,
        expected,
        found: found.kind_name(),
    }
}

const TIMESTAMP_TZ_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const TIMESTAMP_NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Fractional digits a PostgreSQL `timestamptz` keeps.
const TIMESTAMP_PRECISION: u16 = 6;

/// Parses RFC 3339 and PostgreSQL text timestamps. Values without an offset are UTC.
///
/// Sub-microsecond digits are truncated, so a parsed value equals what the
/// destination stores for it.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| {
            TIMESTAMP_TZ_FORMATS
                .iter()
                .find_map(|format| DateTime::parse_from_str(value, format).ok())
        })
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|| {
            TIMESTAMP_NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|naive| naive.and_utc())
        })
        .map(|parsed| parsed.trunc_subsecs(TIMESTAMP_PRECISION))
}

/// Parses a `YYYY-MM-DD` date, also accepting a full timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(value).map(|ts| ts.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn test_uuid_from_text_and_blob() {
        let id = Uuid::parse_str("3d8d9bf5-0d90-4353-88ba-4ccc5d2c07ff").unwrap();
        let row = RawRow::new()
            .with("a", "3d8d9bf5-0d90-4353-88ba-4ccc5d2c07ff")
            .with("b", "3D8D9BF50D90435388BA4CCC5D2C07FF")
            .with("c", RawValue::Blob(id.as_bytes().to_vec()))
            .with("d", id);

        assert_eq!(row.uuid("a").unwrap(), id);
        assert_eq!(row.uuid("b").unwrap(), id);
        assert_eq!(row.uuid("c").unwrap(), id);
        assert_eq!(row.uuid("d").unwrap(), id);
    }

    #[test]
    fn test_invalid_uuid() {
        let row = RawRow::new().with("id", "not-a-uuid");
        assert_eq!(
            row.uuid("id"),
            Err(ValidationError::InvalidUuid {
                field: "id",
                value: "not-a-uuid".to_string()
            })
        );
    }

    #[test]
    fn test_missing_and_null_fields() {
        let row = RawRow::new().with("title", RawValue::Null);

        assert_eq!(
            row.text("name"),
            Err(ValidationError::MissingField { field: "name" })
        );
        assert_eq!(
            row.text("title"),
            Err(ValidationError::UnexpectedNull { field: "title" })
        );
        assert_eq!(row.opt_text("title"), Ok(None));
        assert_eq!(
            row.opt_text("description"),
            Err(ValidationError::MissingField {
                field: "description"
            })
        );
    }

    #[test]
    fn test_wrong_type() {
        let row = RawRow::new().with("title", 42_i64).with("rating", "high");
        assert_eq!(
            row.text("title"),
            Err(ValidationError::WrongType {
                field: "title",
                expected: "text",
                found: "integer"
            })
        );
        assert!(matches!(
            row.opt_float("rating"),
            Err(ValidationError::WrongType { field: "rating", .. })
        ));
    }

    #[test]
    fn test_float_accepts_integer_storage() {
        let row = RawRow::new().with("rating", 8_i64);
        assert_eq!(row.opt_float("rating"), Ok(Some(8.0)));
    }

    #[test]
    fn test_parse_postgres_text_timestamp() {
        let expected = Utc
            .with_ymd_and_hms(2021, 6, 16, 20, 14, 9)
            .unwrap()
            .with_nanosecond(221_838_000)
            .unwrap();

        assert_eq!(parse_timestamp("2021-06-16 20:14:09.221838+00"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-16 20:14:09.221838+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-16T20:14:09.221838Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-16 23:14:09.221838+03"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-16 20:14:09.221838"), Some(expected));
    }

    #[test]
    fn test_parse_timestamp_without_fraction() {
        let parsed = parse_timestamp("2021-06-16 20:14:09+00").unwrap();
        assert_eq!(parsed.second(), 9);
        assert_eq!(parsed.nanosecond(), 0);
    }

    #[test]
    fn test_parse_timestamp_truncates_to_microseconds() {
        let expected = parse_timestamp("2021-06-16 20:14:09.221838+00").unwrap();

        assert_eq!(parse_timestamp("2021-06-16 20:14:09.221838999+00"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-16T20:14:09.2218385Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-16 20:14:09.2218381"), Some(expected));
        assert_eq!(expected.nanosecond(), 221_838_000);
    }

    #[test]
    fn test_missing_or_null_timestamp_reads_as_none() {
        let row = RawRow::new()
            .with("created_at", RawValue::Null)
            .with("updated_at", "2021-06-16 20:14:09+00");

        assert_eq!(row.opt_timestamp("created_at"), Ok(None));
        assert_eq!(row.opt_timestamp("modified_at"), Ok(None));
        assert_eq!(
            row.opt_timestamp("updated_at"),
            Ok(parse_timestamp("2021-06-16 20:14:09+00"))
        );
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let row = RawRow::new()
            .with("created_at", "16/06/2021")
            .with("updated_at", 1_623_874_449_i64);

        assert_eq!(
            row.opt_timestamp("created_at"),
            Err(ValidationError::InvalidTimestamp {
                field: "created_at",
                value: "16/06/2021".to_string()
            })
        );
        assert!(matches!(
            row.opt_timestamp("updated_at"),
            Err(ValidationError::WrongType { field: "updated_at", .. })
        ));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2020-02-29").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2020, 2, 29));
        assert_eq!(parse_date("2020-02-30"), None);
        assert_eq!(
            parse_date("2021-06-16 20:14:09+00"),
            NaiveDate::from_ymd_opt(2021, 6, 16)
        );
    }

    #[test]
    fn test_extra_columns_are_kept_but_ignored() {
        let row = RawRow::new().with("title", "Alien").with("file_path", RawValue::Null);
        assert_eq!(row.len(), 2);
        assert_eq!(row.text("title").unwrap(), "Alien");
    }
}
