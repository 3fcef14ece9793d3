//! Avatar image model.

use creatorify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `avatars` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Avatar {
    pub id: DbId,
    pub user_id: String,
    pub name: String,
    pub image_url: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateAvatar {
    pub user_id: String,
    pub name: String,
    pub image_url: String,
}

/// Query parameters for `GET /api/v1/avatars`.
#[derive(Debug, Default, Deserialize)]
pub struct AvatarListQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}
