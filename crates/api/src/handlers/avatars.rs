//! Handlers for avatar images (`/avatars`).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use creatorify_cloud::media::{self, ResourceType, UploadOptions};
use creatorify_core::audio;
use creatorify_core::error::CoreError;
use creatorify_core::types::{user_or_anonymous, DbId};
use creatorify_db::models::avatar::{Avatar, AvatarListQuery, CreateAvatar};
use creatorify_db::repositories::AvatarRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

pub const AVATAR_FOLDER: &str = "creatorify_avatars";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Avatar",
        id,
    })
}

/// POST /api/v1/avatars/upload
///
/// Multipart fields: `name`, `file`, `user_id`.
pub async fn upload(
    _key: ApiKey,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Avatar>)> {
    let media = state.media()?.clone();

    let mut form = FormData::read(multipart, &["file"]).await?;
    let file = form.take_file("file")?;
    let name = form.require_text("name")?.to_string();
    let user_id = user_or_anonymous(form.text("user_id"));

    audio::ensure_image(&file.bytes, file.content_type.as_deref())?;

    let options = UploadOptions {
        resource_type: ResourceType::Image,
        folder: Some(AVATAR_FOLDER.to_string()),
        public_id: None,
        filename: file.filename,
    };
    let image_url = media.upload(file.bytes, &options).await?;

    let avatar = AvatarRepo::create(
        &state.pool,
        &CreateAvatar {
            user_id,
            name,
            image_url,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(avatar)))
}

/// GET /api/v1/avatars
pub async fn list(
    _key: ApiKey,
    State(state): State<AppState>,
    Query(params): Query<AvatarListQuery>,
) -> AppResult<Json<Vec<Avatar>>> {
    let avatars = AvatarRepo::list(&state.pool, &params).await?;
    Ok(Json(avatars))
}

/// GET /api/v1/avatars/{id}
pub async fn get_by_id(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Avatar>> {
    let avatar = AvatarRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(avatar))
}

/// DELETE /api/v1/avatars/{id}
///
/// The row goes first; removing the stored image is best effort.
pub async fn delete(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let avatar = AvatarRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let public_id = media::public_id_from_url(&avatar.image_url, AVATAR_FOLDER);
    if let (Some(store), Some(public_id)) = (state.media.as_ref(), public_id) {
        match store.destroy(&public_id, ResourceType::Image).await {
            Ok(true) => tracing::info!(avatar_id = id, public_id = %public_id, "Avatar image deleted"),
            Ok(false) => {
                tracing::warn!(avatar_id = id, public_id = %public_id, "Avatar image not found in media store")
            }
            Err(e) => {
                tracing::warn!(avatar_id = id, public_id = %public_id, error = %e, "Failed to delete avatar image")
            }
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
