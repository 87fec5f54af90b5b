use std::sync::Arc;

use greenlight_core::store::MovieStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Movie persistence (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn MovieStore>,
    pub config: Arc<ServerConfig>,
}
