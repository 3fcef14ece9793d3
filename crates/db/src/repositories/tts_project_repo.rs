//! Repository for the `tts_projects` table.

use creatorify_core::paging::clamp_limit;
use creatorify_core::types::DbId;
use sqlx::PgPool;

use crate::models::tts_project::{CreateTtsProject, TtsProject, TtsProjectListQuery};

const COLUMNS: &str = "\
    id, user_id, text, voice, speed, lang_code, call_id, status, progress, \
    audio_url, error_message, created_at, updated_at";

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct TtsProjectRepo;

impl TtsProjectRepo {
    pub async fn create(pool: &PgPool, input: &CreateTtsProject) -> Result<TtsProject, sqlx::Error> {
        let query = format!(
            "INSERT INTO tts_projects (user_id, text, voice, speed, lang_code, status, progress) \
             VALUES ($1, $2, $3, $4, $5, 'queued', 0) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TtsProject>(&query)
            .bind(&input.user_id)
            .bind(&input.text)
            .bind(&input.voice)
            .bind(input.speed)
            .bind(&input.lang_code)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TtsProject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tts_projects WHERE id = $1");
        sqlx::query_as::<_, TtsProject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &TtsProjectListQuery,
    ) -> Result<Vec<TtsProject>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM tts_projects \
             WHERE ($1::TEXT IS NULL OR user_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, TtsProject>(&query)
            .bind(&params.user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tts_projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
