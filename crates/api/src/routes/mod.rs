pub mod avatars;
pub mod chatterbox;
pub mod health;
pub mod projects;
pub mod tts;
pub mod voice_conversion;
pub mod voices;

use axum::Router;

use crate::state::AppState;

/// Largest request body accepted by the multipart upload routes (25 MiB).
pub const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Build the `/api/v1` route tree. Every route requires `X-API-Key`.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                  talking-head video projects
/// /tts                                       Kokoro TTS projects and catalog
/// /chatterbox                                voice-cloning and multilingual TTS
/// /voice-conversion                          voice conversion jobs
/// /voices                                    voice sample library
/// /avatars                                   avatar images
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", projects::router())
        .nest("/tts", tts::router())
        .nest("/chatterbox", chatterbox::router())
        .nest("/voice-conversion", voice_conversion::router())
        .nest("/voices", voices::router())
        .nest("/avatars", avatars::router())
}
