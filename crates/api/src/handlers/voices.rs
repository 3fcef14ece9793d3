//! Handlers for the voice sample library (`/voices`).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use creatorify_cloud::media::{public_id_segment, ResourceType, UploadOptions};
use creatorify_core::audio;
use creatorify_core::error::CoreError;
use creatorify_core::types::{user_or_anonymous, DbId};
use creatorify_db::models::voice_sample::{CreateVoiceSample, VoiceSample, VoiceSampleListQuery};
use creatorify_db::repositories::VoiceSampleRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::handlers::form::FormData;
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

/// Media store folder for uploaded reference voices.
const SAMPLE_FOLDER: &str = "voice_samples";

#[derive(Debug, Default, Deserialize)]
pub struct OwnerQuery {
    pub user_id: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Voice sample",
        id,
    })
}

/// Load a voice sample or fail with 404.
pub(crate) async fn voice_sample_or_404(state: &AppState, id: DbId) -> AppResult<VoiceSample> {
    VoiceSampleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Decode the container headers off the async runtime.
async fn probe_upload(bytes: Vec<u8>, extension: String) -> AppResult<audio::AudioInfo> {
    let info = tokio::task::spawn_blocking(move || audio::probe(bytes, &extension))
        .await
        .map_err(|e| AppError::InternalError(format!("Audio probe task failed: {e}")))??;
    Ok(info)
}

/// POST /api/v1/voices/upload
///
/// Multipart fields: `audio_file`, `name`, `description`, `language_hint`,
/// `user_id`, `is_public`.
pub async fn upload(
    _key: ApiKey,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<VoiceSample>)> {
    let mut form = FormData::read(multipart, &["audio_file"]).await?;
    let file = form.take_file("audio_file")?;
    let name = form.require_text("name")?.to_string();
    let is_public = form.flag("is_public")?;
    let user_id = user_or_anonymous(form.text("user_id"));

    let extension = audio::validate_extension(&file.filename)?;
    let info = probe_upload(file.bytes.clone(), extension.clone()).await?;
    audio::validate_duration(info.duration_secs)?;

    let media = state.media()?;
    let options = UploadOptions {
        resource_type: ResourceType::Video,
        folder: None,
        public_id: Some(format!(
            "{SAMPLE_FOLDER}/{}_{}",
            public_id_segment(&user_id),
            uuid::Uuid::new_v4()
        )),
        filename: file.filename.clone(),
    };
    let audio_url = media.upload(file.bytes, &options).await?;

    let create = CreateVoiceSample {
        user_id,
        name,
        description: form.text("description").map(str::to_string),
        audio_url,
        duration_seconds: info.duration_secs,
        sample_rate: i32::try_from(info.sample_rate).unwrap_or(i32::MAX),
        language_hint: form.text("language_hint").map(str::to_string),
        is_public,
        metadata: json!({
            "original_filename": file.filename,
            "format": extension.trim_start_matches('.'),
        }),
    };
    let sample = VoiceSampleRepo::create(&state.pool, &create).await?;

    tracing::info!(
        voice_sample_id = sample.id,
        user_id = %sample.user_id,
        duration_secs = sample.duration_seconds,
        "Voice sample uploaded"
    );
    Ok((StatusCode::CREATED, Json(sample)))
}

/// GET /api/v1/voices
pub async fn list(
    _key: ApiKey,
    State(state): State<AppState>,
    Query(params): Query<VoiceSampleListQuery>,
) -> AppResult<Json<Vec<VoiceSample>>> {
    let samples = VoiceSampleRepo::list(&state.pool, &params).await?;
    Ok(Json(samples))
}

/// GET /api/v1/voices/{id}
pub async fn get_by_id(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<VoiceSample>> {
    Ok(Json(voice_sample_or_404(&state, id).await?))
}

/// DELETE /api/v1/voices/{id}?user_id=
///
/// With `user_id`, only that user's sample is deleted; someone else's
/// sample reads as missing.
pub async fn delete(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(owner): Query<OwnerQuery>,
) -> AppResult<StatusCode> {
    let owner = owner.user_id.as_deref().filter(|u| !u.is_empty());
    if VoiceSampleRepo::delete(&state.pool, id, owner).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
