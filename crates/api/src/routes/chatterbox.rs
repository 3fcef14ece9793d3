//! Route definitions for Chatterbox speech generation.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chatterbox;
use crate::state::AppState;

/// Routes mounted at `/chatterbox`.
///
/// ```text
/// POST   /tts/generate              -> generate_tts
/// POST   /multilingual/generate     -> generate_multilingual
/// GET    /multilingual/languages    -> multilingual_languages
/// GET    /projects                  -> list (?user_id, project_type, limit)
/// GET    /projects/{id}             -> get_by_id
/// DELETE /projects/{id}             -> delete
/// GET    /projects/{id}/status      -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tts/generate", post(chatterbox::generate_tts))
        .route("/multilingual/generate", post(chatterbox::generate_multilingual))
        .route("/multilingual/languages", get(chatterbox::multilingual_languages))
        .route("/projects", get(chatterbox::list))
        .route(
            "/projects/{id}",
            get(chatterbox::get_by_id).delete(chatterbox::delete),
        )
        .route("/projects/{id}/status", get(chatterbox::status))
}
