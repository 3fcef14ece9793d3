//! Repository for the `avatars` table.

use creatorify_core::paging::clamp_limit;
use creatorify_core::types::DbId;
use sqlx::PgPool;

use crate::models::avatar::{Avatar, AvatarListQuery, CreateAvatar};

const COLUMNS: &str = "id, user_id, name, image_url, created_at";

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct AvatarRepo;

impl AvatarRepo {
    pub async fn create(pool: &PgPool, input: &CreateAvatar) -> Result<Avatar, sqlx::Error> {
        let query = format!(
            "INSERT INTO avatars (user_id, name, image_url) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Avatar>(&query)
            .bind(&input.user_id)
            .bind(&input.name)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Avatar>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM avatars WHERE id = $1");
        sqlx::query_as::<_, Avatar>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, params: &AvatarListQuery) -> Result<Vec<Avatar>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM avatars \
             WHERE ($1::TEXT IS NULL OR user_id = $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Avatar>(&query)
            .bind(&params.user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete an avatar row, returning it so the caller can clean up the
    /// stored image.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Avatar>, sqlx::Error> {
        let query = format!("DELETE FROM avatars WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Avatar>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
