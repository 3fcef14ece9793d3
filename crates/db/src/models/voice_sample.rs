//! Voice library model and DTOs.

use creatorify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `voice_samples` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VoiceSample {
    pub id: DbId,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: f64,
    pub sample_rate: i32,
    pub language_hint: Option<String>,
    pub is_public: bool,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateVoiceSample {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub audio_url: String,
    pub duration_seconds: f64,
    pub sample_rate: i32,
    pub language_hint: Option<String>,
    pub is_public: bool,
    pub metadata: serde_json::Value,
}

/// Query parameters for `GET /api/v1/voices`.
#[derive(Debug, Deserialize)]
pub struct VoiceSampleListQuery {
    pub user_id: Option<String>,
    #[serde(default = "default_include_public")]
    pub include_public: bool,
    /// Defaults to 50, capped at 100.
    pub limit: Option<i64>,
}

fn default_include_public() -> bool {
    true
}

impl Default for VoiceSampleListQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            include_public: true,
            limit: None,
        }
    }
}
