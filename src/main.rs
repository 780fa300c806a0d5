use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use clap::Parser;
use rusqlite::params;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use linkboard::auth::session;
use linkboard::config::{Cli, Config};
use linkboard::db;
use linkboard::error::AppResult;
use linkboard::links::{Board, SqliteLinkRepository};
use linkboard::routes;
use linkboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path(), config.database.pool_size)?;
    db::run_migrations(&pool)?;

    let board = Board::new(Arc::new(SqliteLinkRepository::new(pool.clone())));

    let state = AppState {
        db: pool,
        config: config.clone(),
        board,
    };

    let mut app = routes::router();

    // Test-only seed endpoint: creates a user + session, returns session cookie
    if std::env::var("LINKBOARD_TEST_SEED").is_ok() {
        app = app.route("/test/seed", get(test_seed));
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Test-only: seed a user + session and return the session cookie.
/// Only mounted when LINKBOARD_TEST_SEED env var is set.
async fn test_seed(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let uid = {
        let conn = state.db.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (id, username) VALUES (?1, 'testuser')",
            params![uuid::Uuid::now_v7().to_string()],
        )?;

        // May already exist from a previous seed call
        conn.query_row(
            "SELECT id FROM users WHERE username = 'testuser'",
            [],
            |r| r.get::<_, String>(0),
        )?
    };

    let token = session::create_session(&state.db, &uid, state.config.auth.session_hours)?;

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age=3600",
        state.config.auth.cookie_name, token
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        axum::Json(serde_json::json!({ "user_id": uid, "username": "testuser" })),
    ))
}
