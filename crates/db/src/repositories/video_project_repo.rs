//! Repository for the `video_projects` table.

use creatorify_core::paging::clamp_limit;
use creatorify_core::types::DbId;
use sqlx::PgPool;

use crate::models::video_project::{CreateVideoProject, VideoProject, VideoProjectListQuery};

const COLUMNS: &str = "\
    id, user_id, title, description, project_type, image_url, audio_url, audio_url_2, \
    audio_order, prompt, parameters, call_id, status, progress, video_url, error_message, \
    created_at, updated_at";

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct VideoProjectRepo;

impl VideoProjectRepo {
    /// Insert a new project with `status = 'queued'` and progress 0.
    pub async fn create(
        pool: &PgPool,
        input: &CreateVideoProject,
    ) -> Result<VideoProject, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_projects \
                (user_id, title, description, project_type, image_url, audio_url, audio_url_2, \
                 audio_order, prompt, parameters, status, progress) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'queued', 0) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoProject>(&query)
            .bind(&input.user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.project_type.as_str())
            .bind(&input.image_url)
            .bind(&input.audio_url)
            .bind(&input.audio_url_2)
            .bind(input.audio_order.as_str())
            .bind(&input.prompt)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VideoProject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_projects WHERE id = $1");
        sqlx::query_as::<_, VideoProject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects newest first, optionally filtered by user and type.
    pub async fn list(
        pool: &PgPool,
        params: &VideoProjectListQuery,
    ) -> Result<Vec<VideoProject>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM video_projects \
             WHERE ($1::TEXT IS NULL OR user_id = $1) \
               AND ($2::TEXT IS NULL OR project_type = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, VideoProject>(&query)
            .bind(&params.user_id)
            .bind(&params.project_type)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Permanently delete a project. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM video_projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
