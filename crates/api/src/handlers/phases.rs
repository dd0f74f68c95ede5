//! Handlers for `/phases`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use skill_loop_core::types::DbId;
use skill_loop_db::models::phase::{JourneyPhase, UpdatePhase};

use crate::error::AppResult;
use crate::handlers::journeys::AdvanceResponse;
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompletePhaseRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkAssessmentRequest {
    pub assessment_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct LinkTrainingRequest {
    pub training_assignment_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct AssignMentorRequest {
    pub mentor_id: DbId,
}

/// POST /phases/{id}/complete
///
/// Manual override. The phase must be its journey's active phase.
pub async fn complete_phase(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<CompletePhaseRequest>,
) -> AppResult<Json<DataResponse<AdvanceResponse>>> {
    let advanced = state
        .engine
        .manually_complete_phase(id, admin.user_id, input.notes)
        .await?;
    Ok(Json(DataResponse {
        data: AdvanceResponse { advanced },
    }))
}

/// PUT /phases/{id}
pub async fn update_phase(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePhase>,
) -> AppResult<Json<DataResponse<JourneyPhase>>> {
    let phase = state
        .engine
        .update_phase(id, input, Some(admin.user_id))
        .await?;
    Ok(Json(DataResponse { data: phase }))
}

/// POST /phases/{id}/assessment
pub async fn link_assessment(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<LinkAssessmentRequest>,
) -> AppResult<Json<DataResponse<JourneyPhase>>> {
    let phase = state
        .engine
        .link_assessment_to_phase(id, input.assessment_id, Some(user.user_id))
        .await?;
    Ok(Json(DataResponse { data: phase }))
}

/// POST /phases/{id}/training
pub async fn link_training(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<LinkTrainingRequest>,
) -> AppResult<Json<DataResponse<JourneyPhase>>> {
    let phase = state
        .engine
        .link_training_to_phase(id, input.training_assignment_id, Some(user.user_id))
        .await?;
    Ok(Json(DataResponse { data: phase }))
}

/// PUT /phases/{id}/mentor
pub async fn assign_mentor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignMentorRequest>,
) -> AppResult<Json<DataResponse<JourneyPhase>>> {
    let phase = state
        .engine
        .assign_mentor(id, input.mentor_id, Some(admin.user_id))
        .await?;
    Ok(Json(DataResponse { data: phase }))
}

/// DELETE /phases/{id}/mentor
pub async fn remove_mentor(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<JourneyPhase>>> {
    let phase = state.engine.remove_mentor(id, Some(admin.user_id)).await?;
    Ok(Json(DataResponse { data: phase }))
}
