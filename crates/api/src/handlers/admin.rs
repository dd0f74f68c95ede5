//! Admin maintenance endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OverdueSweepResponse {
    /// Phases newly marked overdue by this run.
    pub marked: usize,
}

/// POST /admin/overdue-sweep
///
/// Run the overdue sweep now instead of waiting for the worker's next tick.
pub async fn run_overdue_sweep(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<OverdueSweepResponse>>> {
    tracing::info!(admin_id = admin.user_id, "Manual overdue sweep requested");
    let marked = state.engine.check_overdue_phases().await?;
    Ok(Json(DataResponse {
        data: OverdueSweepResponse { marked },
    }))
}
