use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Table;
use crate::errors::ValidationError;
use crate::types::{ColumnValue, RawRow, Record};

/// Link between a person and a film work, with the role they played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonFilmWork {
    pub id: Uuid,
    pub film_work_id: Uuid,
    pub person_id: Uuid,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for PersonFilmWork {
    const TABLE: Table = Table::PersonFilmWork;

    fn from_row(row: &RawRow) -> Result<Self, ValidationError> {
        Ok(Self {
            id: row.uuid("id")?,
            film_work_id: row.uuid("film_work_id")?,
            person_id: row.uuid("person_id")?,
            role: row.text("role")?,
            created_at: row.opt_timestamp("created_at")?,
        })
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::Uuid(self.id),
            ColumnValue::Uuid(self.film_work_id),
            ColumnValue::Uuid(self.person_id),
            ColumnValue::Text(Some(self.role.clone())),
            ColumnValue::Timestamp(self.created_at),
        ]
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.film_work_id == other.film_work_id
            && self.person_id == other.person_id
            && self.role == other.role
    }
}
