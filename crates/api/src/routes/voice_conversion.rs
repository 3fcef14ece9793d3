//! Route definitions for voice conversion.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use super::UPLOAD_BODY_LIMIT;
use crate::handlers::voice_conversion;
use crate::state::AppState;

/// Routes mounted at `/voice-conversion`.
///
/// ```text
/// POST   /convert           -> convert
/// POST   /convert-upload    -> convert_upload (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/convert", post(voice_conversion::convert))
        .route(
            "/convert-upload",
            post(voice_conversion::convert_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}
