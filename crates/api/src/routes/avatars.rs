//! Route definitions for avatar images.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::UPLOAD_BODY_LIMIT;
use crate::handlers::avatars;
use crate::state::AppState;

/// Routes mounted at `/avatars`.
///
/// ```text
/// POST   /upload      -> upload (multipart)
/// GET    /            -> list (?user_id, limit)
/// GET    /{id}        -> get_by_id
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(avatars::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/", get(avatars::list))
        .route("/{id}", get(avatars::get_by_id).delete(avatars::delete))
}
