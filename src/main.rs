use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use users_api::config::AppConfig;
use users_api::database;
use users_api::database::reflect::TableSchema;
use users_api::handlers::{self, AppState};
use users_api::services::users::{PgUserStore, REQUIRED_COLUMNS, USERS_TABLE};

mod args;

use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env()?;
    args.apply(&mut config.server);

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to the database")?;

    // The users table is owned elsewhere; reflect its layout once and refuse
    // to start if the columns the handlers rely on are absent.
    let schema = TableSchema::load(&pool, USERS_TABLE)
        .await
        .with_context(|| format!("failed to reflect the '{}' table", USERS_TABLE))?;
    schema.require_columns(REQUIRED_COLUMNS)?;
    tracing::info!(
        "serving '{}' with {} reflected columns",
        schema.table(),
        schema.columns().len()
    );

    let state = AppState::new(PgUserStore::new(pool, schema));
    let app = handlers::router(state);

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app).await.context("server exited")?;

    Ok(())
}
