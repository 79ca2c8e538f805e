use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Table;
use crate::errors::ValidationError;
use crate::types::{ColumnValue, RawRow, Record};

/// A film genre. Names are unique in the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Genre {
    const TABLE: Table = Table::Genre;

    fn from_row(row: &RawRow) -> Result<Self, ValidationError> {
        Ok(Self {
            id: row.uuid("id")?,
            name: row.text("name")?,
            description: row.opt_text("description")?,
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
            ColumnValue::Text(Some(self.name.clone())),
            ColumnValue::Text(self.description.clone()),
            ColumnValue::Timestamp(self.created_at),
            ColumnValue::Timestamp(self.updated_at),
        ]
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.description == other.description
    }
}
