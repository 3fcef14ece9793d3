//! Route definitions for talking-head video projects.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                 -> list (?user_id, type, limit)
/// POST   /                 -> create
/// POST   /frame-plan       -> frame_plan
/// GET    /{id}             -> get_by_id
/// DELETE /{id}             -> delete
/// GET    /{id}/status      -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route("/frame-plan", post(projects::frame_plan))
        .route("/{id}", get(projects::get_by_id).delete(projects::delete))
        .route("/{id}/status", get(projects::status))
}
