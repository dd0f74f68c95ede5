//! Handlers for `/journeys`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use skill_loop_core::activity::TriggerReason;
use skill_loop_core::error::CoreError;
use skill_loop_core::progress::PhaseProgress;
use skill_loop_core::types::DbId;
use skill_loop_db::models::activity::JourneyActivity;
use skill_loop_db::models::journey::{Journey, JourneyDetail};
use skill_loop_db::repositories::JourneyRepo;
use skill_loop_journey::InitializeJourney;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for `POST /journeys/{id}/advance`.
#[derive(Debug, Default, Deserialize)]
pub struct AdvanceRequest {
    /// What caused the advance; `system` when omitted. `manual_override` is
    /// rejected here so the recorded actor is always the caller.
    #[serde(default)]
    pub trigger: Option<TriggerReason>,
    /// Extra data stored under `details` on the completion activity.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Body for `POST /journeys/{id}/pause`.
#[derive(Debug, Default, Deserialize)]
pub struct PauseRequest {
    pub reason: Option<String>,
}

/// Result of an advance attempt.
#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    /// `false` when the journey had no active phase.
    pub advanced: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /journeys
pub async fn create_journey(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<InitializeJourney>,
) -> AppResult<(StatusCode, Json<DataResponse<JourneyDetail>>)> {
    let journey_id = state
        .engine
        .initialize_journey(input.with_actor(Some(admin.user_id)))
        .await?;
    let detail = state.engine.get_journey(journey_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /journeys/{id}
pub async fn get_journey(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<JourneyDetail>>> {
    let detail = state.engine.get_journey(id).await?;
    user.ensure_can_view(detail.journey.user_id)?;
    Ok(Json(DataResponse { data: detail }))
}

/// GET /journeys/{id}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PhaseProgress>>> {
    let journey = find_journey(&state, id).await?;
    user.ensure_can_view(journey.user_id)?;
    let progress = state.engine.calculate_phase_progress(id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /journeys/{id}/activities
pub async fn list_activities(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<JourneyActivity>>>> {
    let journey = find_journey(&state, id).await?;
    user.ensure_can_view(journey.user_id)?;
    let activities = state.engine.list_activities(id).await?;
    Ok(Json(DataResponse { data: activities }))
}

/// POST /journeys/{id}/advance
pub async fn advance_journey(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AdvanceRequest>,
) -> AppResult<Json<DataResponse<AdvanceResponse>>> {
    let trigger = input.trigger.unwrap_or(TriggerReason::System);
    if matches!(trigger, TriggerReason::ManualOverride { .. }) {
        return Err(AppError::BadRequest(
            "Manual completion goes through POST /phases/{id}/complete".into(),
        ));
    }
    tracing::info!(journey_id = id, admin_id = admin.user_id, trigger = %trigger.tag(), "Advance requested");
    let advanced = state
        .engine
        .auto_advance_phase(id, trigger, input.metadata)
        .await?;
    Ok(Json(DataResponse {
        data: AdvanceResponse { advanced },
    }))
}

/// POST /journeys/{id}/pause
pub async fn pause_journey(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<PauseRequest>,
) -> AppResult<Json<DataResponse<Journey>>> {
    let journey = state
        .engine
        .pause_journey(id, input.reason, Some(admin.user_id))
        .await?;
    Ok(Json(DataResponse { data: journey }))
}

/// POST /journeys/{id}/resume
pub async fn resume_journey(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Journey>>> {
    let journey = state.engine.resume_journey(id, Some(admin.user_id)).await?;
    Ok(Json(DataResponse { data: journey }))
}

async fn find_journey(state: &AppState, id: DbId) -> AppResult<Journey> {
    JourneyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Journey", id }.into())
}
