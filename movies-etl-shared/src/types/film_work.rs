use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Table;
use crate::errors::ValidationError;
use crate::types::{ColumnValue, RawRow, Record};

/// Kind of a film work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmWorkType {
    Movie,
    TvShow,
}

impl FilmWorkType {
    pub fn as_str(self) -> &'static str {
        match self {
            FilmWorkType::Movie => "movie",
            FilmWorkType::TvShow => "tv_show",
        }
    }
}

impl fmt::Display for FilmWorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilmWorkType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(FilmWorkType::Movie),
            "tv_show" => Ok(FilmWorkType::TvShow),
            other => Err(ValidationError::InvalidValue {
                field: "type",
                reason: format!("unknown film work type '{other}'"),
            }),
        }
    }
}

/// A film or TV show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmWork {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub creation_date: Option<NaiveDate>,
    /// Between 0 and 100 inclusive.
    pub rating: Option<f64>,
    #[serde(rename = "type")]
    pub kind: FilmWorkType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 100.0;

impl Record for FilmWork {
    const TABLE: Table = Table::FilmWork;

    fn from_row(row: &RawRow) -> Result<Self, ValidationError> {
        let rating = row.opt_float("rating")?;
        if let Some(value) = rating {
            if !(MIN_RATING..=MAX_RATING).contains(&value) {
                return Err(ValidationError::InvalidValue {
                    field: "rating",
                    reason: format!("{value} is outside {MIN_RATING}..={MAX_RATING}"),
                });
            }
        }

        Ok(Self {
            id: row.uuid("id")?,
            title: row.text("title")?,
            description: row.opt_text("description")?,
            creation_date: row.opt_date("creation_date")?,
            rating,
            kind: row.text("type")?.parse()?,
            created_at: row.opt_timestamp("created_at")?,
            updated_at: row.opt_timestamp("updated_at")?,
        })
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Uuid(self.id),
            ColumnValue::Text(Some(self.title.clone())),
            ColumnValue::Text(self.description.clone()),
            ColumnValue::Date(self.creation_date),
            ColumnValue::Float(self.rating),
            ColumnValue::Text(Some(self.kind.as_str().to_string())),
            ColumnValue::Timestamp(self.created_at),
            ColumnValue::Timestamp(self.updated_at),
        ]
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.creation_date == other.creation_date
            && self.rating == other.rating
            && self.kind == other.kind
    }
}
