//! Repository for the `speech_projects` table.

use creatorify_core::paging::clamp_limit;
use creatorify_core::types::DbId;
use sqlx::PgPool;

use crate::models::speech_project::{CreateSpeechProject, SpeechProject, SpeechProjectListQuery};

const COLUMNS: &str = "\
    id, user_id, project_type, text, language_id, voice_sample_id, source_audio_url, \
    parameters, call_id, status, progress, audio_url, error_message, created_at, updated_at";

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct SpeechProjectRepo;

impl SpeechProjectRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSpeechProject,
    ) -> Result<SpeechProject, sqlx::Error> {
        let query = format!(
            "INSERT INTO speech_projects \
                (user_id, project_type, text, language_id, voice_sample_id, source_audio_url, \
                 parameters, status, progress) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'queued', 0) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SpeechProject>(&query)
            .bind(&input.user_id)
            .bind(input.project_type.as_str())
            .bind(&input.text)
            .bind(&input.language_id)
            .bind(input.voice_sample_id)
            .bind(&input.source_audio_url)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SpeechProject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM speech_projects WHERE id = $1");
        sqlx::query_as::<_, SpeechProject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects newest first, optionally filtered by user and type.
    pub async fn list(
        pool: &PgPool,
        params: &SpeechProjectListQuery,
    ) -> Result<Vec<SpeechProject>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM speech_projects \
             WHERE ($1::TEXT IS NULL OR user_id = $1) \
               AND ($2::TEXT IS NULL OR project_type = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, SpeechProject>(&query)
            .bind(&params.user_id)
            .bind(&params.project_type)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM speech_projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
