use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Table;
use crate::errors::ValidationError;
use crate::types::{ColumnValue, RawRow, Record};

/// Link between a genre and a film work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreFilmWork {
    pub id: Uuid,
    pub genre_id: Uuid,
    pub film_work_id: Uuid,
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for GenreFilmWork {
    const TABLE: Table = Table::GenreFilmWork;

    fn from_row(row: &RawRow) -> Result<Self, ValidationError> {
        Ok(Self {
            id: row.uuid("id")?,
            genre_id: row.uuid("genre_id")?,
            film_work_id: row.uuid("film_work_id")?,
            created_at: row.opt_timestamp("created_at")?,
        })
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Uuid(self.id),
            ColumnValue::Uuid(self.genre_id),
            ColumnValue::Uuid(self.film_work_id),
            ColumnValue::Timestamp(self.created_at),
        ]
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.genre_id == other.genre_id
            && self.film_work_id == other.film_work_id
    }
}
