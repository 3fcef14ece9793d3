//! Kokoro TTS project model and DTOs.

use creatorify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tts_projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TtsProject {
    pub id: DbId,
    pub user_id: String,
    pub text: String,
    pub voice: String,
    pub speed: f64,
    pub lang_code: String,
    pub call_id: Option<String>,
    pub status: String,
    pub progress: i32,
    pub audio_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateTtsProject {
    pub user_id: String,
    pub text: String,
    pub voice: String,
    pub speed: f64,
    pub lang_code: String,
}

/// Query parameters for `GET /api/v1/tts`.
#[derive(Debug, Default, Deserialize)]
pub struct TtsProjectListQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}
