pub mod admin;
pub mod health;
pub mod journeys;
pub mod phases;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /journeys                                   initialize (admin)
/// /journeys/{id}                              journey with phases
/// /journeys/{id}/progress                     progress summary
/// /journeys/{id}/activities                   activity log
/// /journeys/{id}/advance                      advance (admin)
/// /journeys/{id}/pause                        pause (admin)
/// /journeys/{id}/resume                       resume (admin)
///
/// /users/{id}/journeys                        all cycles
/// /users/{id}/journeys/current                open or latest journey
///
/// /phases/{id}                                edit (admin)
/// /phases/{id}/complete                       manual completion (admin)
/// /phases/{id}/assessment                     link assessment (staff)
/// /phases/{id}/training                       link training (staff)
/// /phases/{id}/mentor                         assign, remove (admin)
///
/// /admin/overdue-sweep                        run the sweep now (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/journeys", journeys::router())
        .nest("/users", users::router())
        .nest("/phases", phases::router())
        .nest("/admin", admin::router())
}
