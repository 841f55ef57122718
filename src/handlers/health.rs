//! Health check endpoint for service monitoring.

use crate::{
    db::{DatabasePools, DbPool},
    error::AppError,
};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
///
/// Returns service status and connectivity of every database instance.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,

    /// Primary database connection status
    pub database: String,

    /// Replica connection status, in configuration order
    pub replicas: Vec<String>,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Checks
///
/// - Primary connectivity (executes simple query); failure is an error
/// - Replica connectivity; failure is reported as `"unavailable"`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "replicas": ["connected", "unavailable"],
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
///
/// `status` is `"degraded"` when any replica is unavailable.
pub async fn health_check(
    State(pools): State<DatabasePools>,
) -> Result<Json<HealthResponse>, AppError> {
    ping(pools.primary()).await?;

    let mut replicas = Vec::with_capacity(pools.replicas().len());
    for (index, replica) in pools.replicas().iter().enumerate() {
        match ping(replica).await {
            Ok(()) => replicas.push("connected".to_string()),
            Err(err) => {
                tracing::warn!(replica = index + 1, error = %err, "Replica health check failed");
                replicas.push("unavailable".to_string());
            }
        }
    }

    let status = if replicas.iter().all(|r| r == "connected") {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        database: "connected".to_string(),
        replicas,
        timestamp: Utc::now(),
    }))
}

async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
