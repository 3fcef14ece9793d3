//! Repository for the `voice_samples` table.

use creatorify_core::paging::clamp_limit;
use creatorify_core::types::DbId;
use sqlx::PgPool;

use crate::models::voice_sample::{CreateVoiceSample, VoiceSample, VoiceSampleListQuery};

const COLUMNS: &str = "\
    id, user_id, name, description, audio_url, duration_seconds, sample_rate, \
    language_hint, is_public, metadata, created_at, updated_at";

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

pub struct VoiceSampleRepo;

impl VoiceSampleRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateVoiceSample,
    ) -> Result<VoiceSample, sqlx::Error> {
        let query = format!(
            "INSERT INTO voice_samples \
                (user_id, name, description, audio_url, duration_seconds, sample_rate, \
                 language_hint, is_public, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VoiceSample>(&query)
            .bind(&input.user_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.audio_url)
            .bind(input.duration_seconds)
            .bind(input.sample_rate)
            .bind(&input.language_hint)
            .bind(input.is_public)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VoiceSample>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM voice_samples WHERE id = $1");
        sqlx::query_as::<_, VoiceSample>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List samples newest first.
    ///
    /// With a user and `include_public`, returns the user's samples plus all
    /// public ones; with a user only, just the user's; with neither user nor
    /// `include_public`, everything; otherwise only public samples.
    pub async fn list(
        pool: &PgPool,
        params: &VoiceSampleListQuery,
    ) -> Result<Vec<VoiceSample>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let filter = match (&params.user_id, params.include_public) {
            (Some(_), true) => "WHERE user_id = $1 OR is_public",
            (Some(_), false) => "WHERE user_id = $1",
            (None, true) => "WHERE $1::TEXT IS NULL AND is_public",
            (None, false) => "WHERE $1::TEXT IS NULL",
        };
        let query = format!(
            "SELECT {COLUMNS} FROM voice_samples {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, VoiceSample>(&query)
            .bind(&params.user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete a sample, restricted to `owner` when given.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        owner: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM voice_samples WHERE id = $1 AND ($2::TEXT IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
