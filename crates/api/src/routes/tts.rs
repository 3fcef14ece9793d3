//! Route definitions for Kokoro TTS.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tts;
use crate::state::AppState;

/// Routes mounted at `/tts`.
///
/// ```text
/// POST   /generate              -> generate
/// GET    /languages             -> list_languages
/// GET    /languages/{code}      -> get_language
/// GET    /voices                -> list_voices (?lang_code)
/// GET    /voices/{code}         -> voices_for_language
/// GET    /                      -> list (?user_id, limit)
/// GET    /{id}                  -> get_by_id
/// DELETE /{id}                  -> delete
/// GET    /{id}/status           -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(tts::generate))
        .route("/languages", get(tts::list_languages))
        .route("/languages/{code}", get(tts::get_language))
        .route("/voices", get(tts::list_voices))
        .route("/voices/{code}", get(tts::voices_for_language))
        .route("/", get(tts::list))
        .route("/{id}", get(tts::get_by_id).delete(tts::delete))
        .route("/{id}/status", get(tts::status))
}
