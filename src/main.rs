//! User Service - configuration bootstrap
//!
//! Loads the server address and database topology from environment
//! variables, prepares connection pools for the primary and its replicas, and
//! exposes a health endpoint.
//!
//! # Startup Flow
//!
//! 1. Initialize logging
//! 2. Load configuration from environment variables
//! 3. Create database pools (without waiting on a connection)
//! 4. Build HTTP router
//! 5. Start server on configured host and port

use anyhow::Context;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use user_service_config::{config::Config, db::DatabasePools, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Never log credentials.
    let config = Config::from_env();
    let database = &config.database;
    let primary = format!("{}:{}", database.primary.host, database.primary.port);
    let replicas: Vec<String> = database
        .replicas
        .iter()
        .map(|r| format!("{}:{}", r.host, r.port))
        .collect();
    tracing::info!(
        server_host = %config.server.host,
        server_port = config.server.port,
        %primary,
        ?replicas,
        min_connections = database.pool.min_connections,
        max_connections = database.pool.max_connections,
        "Configuration loaded"
    );

    let pools = DatabasePools::connect_lazy(&config.database)
        .context("Invalid database configuration")?;
    tracing::info!("Database pools created");

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(pools);

    let port = u16::try_from(config.server.port)
        .with_context(|| format!("SERVER_PORT {} is out of range", config.server.port))?;
    let addr = (config.server.host.as_str(), port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, port))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
