//! Conversion of driver rows into [`RawRow`]s.
use movies_etl_shared::{RawRow, RawValue};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use uuid::Uuid;

/// Decodes a SQLite row by the storage class of each value.
pub fn decode_sqlite_row(row: &SqliteRow) -> Result<RawRow, sqlx::Error> {
    let mut raw = RawRow::new();

    for (index, column) in row.columns().iter().enumerate() {
        let value = row.try_get_raw(index)?;
        let decoded = if value.is_null() {
            RawValue::Null
        } else {
            // Storage class of the value itself, not the declared column type.
            match value.type_info().name() {
                "INTEGER" | "BOOLEAN" => RawValue::Integer(row.try_get_unchecked(index)?),
                "REAL" => RawValue::Real(row.try_get_unchecked(index)?),
                "BLOB" => RawValue::Blob(row.try_get_unchecked(index)?),
                _ => RawValue::Text(row.try_get_unchecked(index)?),
            }
        };
        raw.insert(column.name(), decoded);
    }

    Ok(raw)
}

/// Decodes a PostgreSQL row. Only the types the verifier selects are supported.
pub fn decode_pg_row(row: &PgRow) -> Result<RawRow, sqlx::Error> {
    let mut raw = RawRow::new();

    for (index, column) in row.columns().iter().enumerate() {
        let decoded = if row.try_get_raw(index)?.is_null() {
            RawValue::Null
        } else {
            match column.type_info().name() {
                "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => RawValue::Text(row.try_get(index)?),
                "FLOAT8" => RawValue::Real(row.try_get(index)?),
                "FLOAT4" => RawValue::Real(f64::from(row.try_get::<f32, _>(index)?)),
                "INT8" => RawValue::Integer(row.try_get(index)?),
                "INT4" => RawValue::Integer(i64::from(row.try_get::<i32, _>(index)?)),
                "INT2" => RawValue::Integer(i64::from(row.try_get::<i16, _>(index)?)),
                "UUID" => RawValue::Uuid(row.try_get::<Uuid, _>(index)?),
                other => {
                    return Err(sqlx::Error::ColumnDecode {
                        index: column.name().to_string(),
                        source: format!("unsupported column type {other}").into(),
                    });
                }
            }
        };
        raw.insert(column.name(), decoded);
    }

    Ok(raw)
}
