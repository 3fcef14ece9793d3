//! Talking-head video project model and DTOs.

use creatorify_core::generation::{AudioOrder, VideoProjectType};
use creatorify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `video_projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoProject {
    pub id: DbId,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub project_type: String,
    pub image_url: String,
    pub audio_url: String,
    pub audio_url_2: Option<String>,
    pub audio_order: String,
    pub prompt: Option<String>,
    pub parameters: serde_json::Value,
    pub call_id: Option<String>,
    pub status: String,
    pub progress: i32,
    pub video_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert shape for a new queued video project.
#[derive(Debug, Clone)]
pub struct CreateVideoProject {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub project_type: VideoProjectType,
    pub image_url: String,
    pub audio_url: String,
    pub audio_url_2: Option<String>,
    pub audio_order: AudioOrder,
    pub prompt: Option<String>,
    /// Serialized [`creatorify_core::generation::GenerationParams`].
    pub parameters: serde_json::Value,
}

/// Query parameters for `GET /api/v1/projects`.
#[derive(Debug, Default, Deserialize)]
pub struct VideoProjectListQuery {
    pub user_id: Option<String>,
    /// `single_person` or `multi_person`.
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    /// Defaults to 20, capped at 100.
    pub limit: Option<i64>,
}
