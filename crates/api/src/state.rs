use std::sync::Arc;

use skill_loop_journey::JourneyEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: skill_loop_db::DbPool,
    /// Server configuration (JWT secret, timeouts).
    pub config: Arc<ServerConfig>,
    /// The journey engine; every journey mutation goes through it.
    pub engine: Arc<JourneyEngine>,
}
