use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::AppState;

/// GET /users - list every row of the users table
///
/// Rows come back exactly as stored, every column included. The failure
/// detail carries the underlying database message.
pub async fn users_index(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.store.list_all().await.map_err(|e| {
        tracing::error!("users listing failed: {}", e);
        ApiError::internal(format!("DB read error: {}", e))
    })?;

    Ok(Json(json!({ "users": users })))
}
