//! Shared-secret API key extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use creatorify_core::error::CoreError;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Proof that the request carried the configured `X-API-Key`.
///
/// Add it as an extractor parameter to every protected handler:
///
/// ```ignore
/// async fn my_handler(_key: ApiKey, State(state): State<AppState>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.api_key.as_deref().ok_or_else(|| {
            AppError::Misconfigured("API_KEY not set".into())
        })?;

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if keys_match(provided, expected) {
            Ok(ApiKey)
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Could not validate credentials".into(),
            )))
        }
    }
}

/// Constant-time for equal-length keys; a length mismatch fails early.
fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
