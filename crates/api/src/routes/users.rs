use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/journeys", get(users::list_user_journeys))
        .route("/{id}/journeys/current", get(users::current_user_journey))
}
