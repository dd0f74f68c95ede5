use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Admin routes mounted at `/admin`. All require the `admin` role.
pub fn router() -> Router<AppState> {
    Router::new().route("/overdue-sweep", post(admin::run_overdue_sweep))
}
