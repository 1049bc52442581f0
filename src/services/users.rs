//! User listing and credential checks against the reflected `users` table.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;

use crate::database::reflect::{quote_ident, TableSchema};
use crate::database::rows::row_to_map;
use crate::database::DatabaseError;

/// Table every read path goes through.
pub const USERS_TABLE: &str = "users";

/// Columns the service relies on; verified against the reflected schema
/// at startup so requests never hit a missing column.
pub const REQUIRED_COLUMNS: &[&str] = &["id", "username", "password"];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username or password is incorrect")]
    UnknownUser,
    #[error("password does not match")]
    WrongPassword,
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Identity returned on a successful login. Values keep whatever JSON shape
/// the column decode produced; the password never leaves the service.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: Value,
    pub username: Value,
}

/// Read access to the users table. The production implementation runs
/// against Postgres; tests substitute an in-memory one.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All rows in storage order, every column included.
    async fn list_all(&self) -> Result<Vec<Map<String, Value>>, DatabaseError>;

    /// First row matching `username` in storage order, if any.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Map<String, Value>>, DatabaseError>;
}

/// Postgres-backed store. Statements are built from the schema reflected at
/// startup, so the column list always matches the live table.
pub struct PgUserStore {
    pool: PgPool,
    schema: TableSchema,
}

impl PgUserStore {
    pub fn new(pool: PgPool, schema: TableSchema) -> Self {
        Self { pool, schema }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_all(&self) -> Result<Vec<Map<String, Value>>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {}",
            self.schema.select_list(),
            self.schema.quoted_table()
        );

        // Checked out for this request only; returns to the pool on drop.
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

        Ok(rows.iter().map(|row| row_to_map(row, &self.schema)).collect())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            self.schema.select_list(),
            self.schema.quoted_table(),
            quote_ident("username")
        );

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(|row| row_to_map(&row, &self.schema)))
    }
}

/// Check a submitted username and password against the store.
///
/// An unknown username and a mismatched password are reported as distinct
/// errors; callers decide how much of that detail to expose.
pub async fn authenticate(
    store: &dyn UserStore,
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AuthError> {
    let row = store
        .find_by_username(username)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    check_credentials(&row, password)?;

    Ok(AuthenticatedUser {
        id: row.get("id").cloned().unwrap_or(Value::Null),
        username: row.get("username").cloned().unwrap_or(Value::Null),
    })
}

/// Plaintext comparison against the stored `password` column. A stored value
/// that is not a string can never match.
fn check_credentials(row: &Map<String, Value>, password: &str) -> Result<(), AuthError> {
    match row.get("password") {
        Some(Value::String(stored)) if stored == password => Ok(()),
        _ => Err(AuthError::WrongPassword),
    }
}
