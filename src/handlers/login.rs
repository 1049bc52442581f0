use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::services::users::authenticate;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /users_login - check submitted credentials
///
/// 200 with the user's id and username on a match, 401 when the username is
/// unknown or the password differs, 500 when the lookup itself fails.
pub async fn users_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = authenticate(state.store.as_ref(), &payload.username, &payload.password).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Welcome, {}!", payload.username),
        "user": user,
    })))
}
