use axum::routing::{get, post};
use axum::Router;

use crate::handlers::journeys;
use crate::state::AppState;

/// Routes mounted at `/journeys`.
///
/// ```text
/// POST /                   -> create_journey
/// GET  /{id}               -> get_journey
/// GET  /{id}/progress      -> get_progress
/// GET  /{id}/activities    -> list_activities
/// POST /{id}/advance       -> advance_journey
/// POST /{id}/pause         -> pause_journey
/// POST /{id}/resume        -> resume_journey
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(journeys::create_journey))
        .route("/{id}", get(journeys::get_journey))
        .route("/{id}/progress", get(journeys::get_progress))
        .route("/{id}/activities", get(journeys::list_activities))
        .route("/{id}/advance", post(journeys::advance_journey))
        .route("/{id}/pause", post(journeys::pause_journey))
        .route("/{id}/resume", post(journeys::resume_journey))
}
