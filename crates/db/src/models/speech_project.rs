//! Chatterbox speech project model (TTS, multilingual TTS and voice
//! conversion share one table, told apart by `project_type`).

use creatorify_core::chatterbox::SpeechProjectType;
use creatorify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `speech_projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SpeechProject {
    pub id: DbId,
    pub user_id: String,
    pub project_type: String,
    pub text: Option<String>,
    pub language_id: Option<String>,
    pub voice_sample_id: Option<DbId>,
    pub source_audio_url: Option<String>,
    pub parameters: serde_json::Value,
    pub call_id: Option<String>,
    pub status: String,
    pub progress: i32,
    pub audio_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateSpeechProject {
    pub user_id: String,
    pub project_type: SpeechProjectType,
    pub text: Option<String>,
    pub language_id: Option<String>,
    pub voice_sample_id: Option<DbId>,
    pub source_audio_url: Option<String>,
    /// Sampling parameters, empty for voice conversion.
    pub parameters: serde_json::Value,
}

/// Query parameters for `GET /api/v1/chatterbox/projects`.
#[derive(Debug, Default, Deserialize)]
pub struct SpeechProjectListQuery {
    pub user_id: Option<String>,
    pub project_type: Option<String>,
    pub limit: Option<i64>,
}
