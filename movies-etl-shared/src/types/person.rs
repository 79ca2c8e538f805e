use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Table;
use crate::errors::ValidationError;
use crate::types::{ColumnValue, RawRow, Record};

/// A person credited on film works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub full_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for Person {
    const TABLE: Table = Table::Person;

    fn from_row(row: &RawRow) -> Result<Self, ValidationError> {
        Ok(Self {
            id: row.uuid("id")?,
            full_name: row.text("full_name")?,
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
            ColumnValue::Text(Some(self.full_name.clone())),
            ColumnValue::Timestamp(self.created_at),
            ColumnValue::Timestamp(self.updated_at),
        ]
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.id == other.id && self.full_name == other.full_name
    }
}
