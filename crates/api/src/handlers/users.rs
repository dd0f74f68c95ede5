//! Handlers for a user's journeys.

use axum::extract::{Path, State};
use axum::Json;
use skill_loop_core::types::DbId;
use skill_loop_db::models::journey::{Journey, JourneyDetail};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /users/{id}/journeys
///
/// Every cycle, newest first.
pub async fn list_user_journeys(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Journey>>>> {
    user.ensure_can_view(user_id)?;
    let journeys = state.engine.list_journeys_for_user(user_id).await?;
    Ok(Json(DataResponse { data: journeys }))
}

/// GET /users/{id}/journeys/current
///
/// The open journey, or the latest completed one; `null` if the user never
/// had one.
pub async fn current_user_journey(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<JourneyDetail>>>> {
    user.ensure_can_view(user_id)?;
    let journey = state.engine.current_journey_for_user(user_id).await?;
    Ok(Json(DataResponse { data: journey }))
}
