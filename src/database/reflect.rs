//! Startup reflection of a table's column layout from the live store.
//!
//! The `users` table is owned and migrated elsewhere; this service only
//! discovers its shape once, before the listener binds, and keeps the result
//! as read-only state for the lifetime of the process.

use sqlx::{PgPool, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table '{0}' does not exist in the current schema")]
    TableNotFound(String),
    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Decode strategy for a column, derived from its SQL data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Bool,
    Text,
    Uuid,
    TimestampTz,
    Timestamp,
    Date,
    Time,
    Json,
    /// Anything else; decoded on a best-effort basis.
    Other,
}

impl ColumnKind {
    /// Map an information_schema `data_type` string to a decode strategy.
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type {
            "smallint" => Self::SmallInt,
            "integer" => Self::Integer,
            "bigint" => Self::BigInt,
            "real" => Self::Real,
            "double precision" => Self::Double,
            "boolean" => Self::Bool,
            "text" | "character varying" | "character" | "name" => Self::Text,
            "uuid" => Self::Uuid,
            "timestamp with time zone" => Self::TimestampTz,
            "timestamp without time zone" => Self::Timestamp,
            "date" => Self::Date,
            "time without time zone" => Self::Time,
            "json" | "jsonb" => Self::Json,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub kind: ColumnKind,
    pub nullable: bool,
}

/// Column map of one existing table, in ordinal order.
#[derive(Debug, Clone)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Discover the column layout of `table` in the connection's current
    /// schema. The table must already exist; an empty result is an error,
    /// not an empty schema.
    pub async fn load(pool: &PgPool, table: &str) -> Result<Self, SchemaError> {
        let rows = sqlx::query(
            "SELECT column_name::text, data_type::text, is_nullable::text \
             FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(pool)
        .await?;

        if rows.is_empty() {
            return Err(SchemaError::TableNotFound(table.to_string()));
        }

        let columns = rows
            .into_iter()
            .map(|row| {
                let name: String = row.try_get("column_name")?;
                let data_type: String = row.try_get("data_type")?;
                let is_nullable: String = row.try_get("is_nullable")?;
                Ok(ColumnDef {
                    kind: ColumnKind::from_data_type(&data_type),
                    nullable: is_nullable == "YES",
                    name,
                    data_type,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    /// Verify the table carries every column the read paths rely on.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), SchemaError> {
        for &column in required {
            if self.column(column).is_none() {
                return Err(SchemaError::MissingColumn {
                    table: self.table.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Quoted table name for interpolation into SQL.
    pub fn quoted_table(&self) -> String {
        quote_ident(&self.table)
    }

    /// Quoted, comma-separated column list in reflected order. Both read
    /// paths select through this list rather than `*`, so the statements
    /// always match the reflected layout.
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Quote a SQL identifier to prevent injection.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> TableSchema {
        let columns = [("id", "bigint"), ("username", "text"), ("password", "text")]
            .into_iter()
            .map(|(name, data_type)| ColumnDef {
                name: name.to_string(),
                data_type: data_type.to_string(),
                kind: ColumnKind::from_data_type(data_type),
                nullable: false,
            })
            .collect();
        TableSchema {
            table: "users".to_string(),
            columns,
        }
    }

    #[test]
    fn maps_data_types_to_kinds() {
        assert_eq!(ColumnKind::from_data_type("integer"), ColumnKind::Integer);
        assert_eq!(ColumnKind::from_data_type("bigint"), ColumnKind::BigInt);
        assert_eq!(ColumnKind::from_data_type("character varying"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_data_type("uuid"), ColumnKind::Uuid);
        assert_eq!(
            ColumnKind::from_data_type("timestamp with time zone"),
            ColumnKind::TimestampTz
        );
        assert_eq!(ColumnKind::from_data_type("jsonb"), ColumnKind::Json);
        assert_eq!(ColumnKind::from_data_type("numeric"), ColumnKind::Other);
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn renders_select_list_in_ordinal_order() {
        let schema = sample_schema();
        assert_eq!(schema.select_list(), "\"id\", \"username\", \"password\"");
        assert_eq!(schema.quoted_table(), "\"users\"");
    }

    #[test]
    fn checks_required_columns() {
        let schema = sample_schema();
        assert!(schema.require_columns(&["id", "username", "password"]).is_ok());

        let err = schema.require_columns(&["id", "email"]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumn { ref column, .. } if column == "email"
        ));
    }
}
