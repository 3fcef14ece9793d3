//! Route definitions for the voice sample library.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::UPLOAD_BODY_LIMIT;
use crate::handlers::voices;
use crate::state::AppState;

/// Routes mounted at `/voices`.
///
/// ```text
/// POST   /upload      -> upload (multipart)
/// GET    /            -> list (?user_id, include_public, limit)
/// GET    /{id}        -> get_by_id
/// DELETE /{id}        -> delete (?user_id)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(voices::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/", get(voices::list))
        .route("/{id}", get(voices::get_by_id).delete(voices::delete))
}
