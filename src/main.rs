//! Farm Ledger - Main Application Entry Point
//!
//! This is a REST API server for a farm's back-office ledger. It records
//! sales and expenses, applies payments to them, moves money between accounts
//! (with currency exchange), and books manual financial adjustments.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Engine**: services over the `LedgerStore` seam, one transaction per operation
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::{handlers::AppState, store::PgLedgerStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    let settings = config.ledger_settings();
    tracing::info!(
        local_currency = %settings.local_currency,
        foreign_currency = %settings.foreign_currency,
        "Configuration loaded"
    );

    // Create database pool
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!(max_connections = config.db_max_connections, "Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // The back-office frontend is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState::new(PgLedgerStore::new(pool), settings);
    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
