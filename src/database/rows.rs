//! Row to JSON conversion driven by the reflected column layout.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::reflect::{ColumnKind, TableSchema};

/// Convert one row into a JSON object keyed by column name, decoding each
/// column according to the reflected schema. Columns are emitted in ordinal
/// order, NULLs as JSON null.
pub fn row_to_map(row: &PgRow, schema: &TableSchema) -> Map<String, Value> {
    let mut map = Map::new();
    for column in schema.columns() {
        let value = decode_column(row, &column.name, column.kind);
        map.insert(column.name.clone(), value);
    }
    map
}

fn decode_column(row: &PgRow, name: &str, kind: ColumnKind) -> Value {
    let decoded = match kind {
        ColumnKind::SmallInt => row
            .try_get::<Option<i16>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::Integer => row
            .try_get::<Option<i32>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::BigInt => row
            .try_get::<Option<i64>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::Real => row
            .try_get::<Option<f32>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::Double => row
            .try_get::<Option<f64>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::Bool => row
            .try_get::<Option<bool>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::Text => row
            .try_get::<Option<String>, _>(name)
            .map(|v| v.map(Value::from)),
        ColumnKind::Uuid => row
            .try_get::<Option<Uuid>, _>(name)
            .map(|v| v.map(|u| Value::String(u.to_string()))),
        ColumnKind::TimestampTz => row
            .try_get::<Option<DateTime<Utc>>, _>(name)
            .map(|v| v.map(|t| Value::String(t.to_rfc3339()))),
        ColumnKind::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(name)
            .map(|v| v.map(|t| Value::String(t.to_string()))),
        ColumnKind::Date => row
            .try_get::<Option<NaiveDate>, _>(name)
            .map(|v| v.map(|d| Value::String(d.to_string()))),
        ColumnKind::Time => row
            .try_get::<Option<NaiveTime>, _>(name)
            .map(|v| v.map(|t| Value::String(t.to_string()))),
        ColumnKind::Json => row.try_get::<Option<Value>, _>(name),
        ColumnKind::Other => return decode_fallback(row, name),
    };

    match decoded {
        Ok(Some(value)) => value,
        Ok(None) => Value::Null,
        Err(_) => decode_fallback(row, name),
    }
}

/// Best-effort decode for column types without a dedicated strategy. Tries
/// the common representations in turn and settles for null when none fits.
fn decode_fallback(row: &PgRow, name: &str) -> Value {
    if let Ok(Some(v)) = row.try_get::<Option<Value>, _>(name) {
        v
    } else if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        Value::String(s)
    } else if let Ok(Some(i)) = row.try_get::<Option<i64>, _>(name) {
        Value::Number(i.into())
    } else if let Ok(Some(f)) = row.try_get::<Option<f64>, _>(name) {
        Value::from(f)
    } else if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        Value::Bool(b)
    } else {
        Value::Null
    }
}
