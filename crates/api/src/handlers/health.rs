//! Handler for the root-level health check.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `available`, or `degraded` when the store cannot be reached.
    pub status: &'static str,
    pub system_info: SystemInfo,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub environment: String,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET /health -- returns service and database health.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the store");
            false
        }
    };

    let status = if db_healthy { "available" } else { "degraded" };

    Json(HealthResponse {
        status,
        system_info: SystemInfo {
            environment: state.config.environment.clone(),
            version: env!("CARGO_PKG_VERSION"),
        },
        db_healthy,
    })
}
