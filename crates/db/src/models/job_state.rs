//! The lifecycle columns shared by every project table.

use creatorify_core::error::CoreError;
use creatorify_core::lifecycle::JobSnapshot;
use creatorify_core::status::JobStatus;
use creatorify_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A table holding generation jobs.
///
/// The three tables share `status`, `progress`, `call_id` and
/// `error_message`; only the name of the output URL column differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTable {
    VideoProjects,
    TtsProjects,
    SpeechProjects,
}

impl JobTable {
    pub fn table_name(self) -> &'static str {
        match self {
            JobTable::VideoProjects => "video_projects",
            JobTable::TtsProjects => "tts_projects",
            JobTable::SpeechProjects => "speech_projects",
        }
    }

    pub fn output_column(self) -> &'static str {
        match self {
            JobTable::VideoProjects => "video_url",
            JobTable::TtsProjects | JobTable::SpeechProjects => "audio_url",
        }
    }

    /// Status a successful job in this table ends in.
    pub fn success_status(self) -> JobStatus {
        match self {
            JobTable::VideoProjects => JobStatus::Finished,
            JobTable::TtsProjects | JobTable::SpeechProjects => JobStatus::Completed,
        }
    }

    /// Human-readable entity name for not-found errors.
    pub fn entity(self) -> &'static str {
        match self {
            JobTable::VideoProjects => "Project",
            JobTable::TtsProjects => "TTS project",
            JobTable::SpeechProjects => "Speech project",
        }
    }
}

/// Lifecycle columns of one row, with the output column aliased to
/// `output_url`.
#[derive(Debug, Clone, FromRow)]
pub struct JobStateRow {
    pub status: String,
    pub progress: i32,
    pub call_id: Option<String>,
    pub output_url: Option<String>,
    pub error_message: Option<String>,
    pub updated_at: Timestamp,
}

impl TryFrom<JobStateRow> for JobSnapshot {
    type Error = CoreError;

    fn try_from(row: JobStateRow) -> Result<Self, Self::Error> {
        Ok(JobSnapshot {
            status: row.status.parse()?,
            progress: row.progress,
            call_id: row.call_id,
            output_url: row.output_url,
            error_message: row.error_message,
            updated_at: row.updated_at,
        })
    }
}
