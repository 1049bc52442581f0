// handlers/mod.rs - route table and shared state
//
// Four routes, all public:
//   GET  /            greeting
//   GET  /night       greeting
//   GET  /users       list every row of the users table
//   POST /users_login credential check against the users table

pub mod login;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::users::UserStore;

/// Shared state handed to every handler. The store is behind a trait object
/// so tests can run the router against an in-memory implementation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(store: impl UserStore + 'static) -> Self {
        Self { store: Arc::new(store) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/night", get(night))
        .route("/users", get(users::users_index))
        .route("/users_login", post(login::users_login))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - plain text greeting
async fn root() -> &'static str {
    "Hello, World!"
}

/// GET /night - plain text greeting
async fn night() -> &'static str {
    "Good night!"
}
