use axum::routing::{post, put};
use axum::Router;

use crate::handlers::phases;
use crate::state::AppState;

/// Routes mounted at `/phases`.
///
/// ```text
/// PUT    /{id}              -> update_phase
/// POST   /{id}/complete     -> complete_phase
/// POST   /{id}/assessment   -> link_assessment
/// POST   /{id}/training     -> link_training
/// PUT    /{id}/mentor       -> assign_mentor
/// DELETE /{id}/mentor       -> remove_mentor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(phases::update_phase))
        .route("/{id}/complete", post(phases::complete_phase))
        .route("/{id}/assessment", post(phases::link_assessment))
        .route("/{id}/training", post(phases::link_training))
        .route(
            "/{id}/mentor",
            put(phases::assign_mentor).delete(phases::remove_mentor),
        )
}
