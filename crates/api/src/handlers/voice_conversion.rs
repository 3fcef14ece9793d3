//! Handlers for voice conversion (`/voice-conversion`).
//!
//! Conversion jobs are speech projects of type `voice_conversion`; their
//! status is read through `/chatterbox/projects/{id}/status`.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use creatorify_cloud::media::{public_id_segment, ResourceType, UploadOptions};
use creatorify_core::audio;
use creatorify_core::chatterbox::{SpeechProjectType, MAX_SOURCE_AUDIO_BYTES};
use creatorify_core::error::CoreError;
use creatorify_core::types::{user_or_anonymous, DbId};
use creatorify_db::models::speech_project::{CreateSpeechProject, SpeechProject};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::chatterbox::create_and_spawn;
use crate::handlers::form::FormData;
use crate::handlers::voices::voice_sample_or_404;
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

/// Media store folder for uploaded source recordings.
const SOURCE_FOLDER: &str = "voice_conversion";

/// Request body for `POST /api/v1/voice-conversion/convert`.
#[derive(Debug, Deserialize, Validate)]
pub struct ConvertRequest {
    #[validate(url)]
    pub source_audio_url: String,
    pub target_voice_sample_id: DbId,
    pub user_id: Option<String>,
}

async fn convert_inner(
    state: &AppState,
    user_id: String,
    source_audio_url: String,
    target_voice_sample_id: DbId,
) -> AppResult<SpeechProject> {
    let target = voice_sample_or_404(state, target_voice_sample_id).await?;

    let create = CreateSpeechProject {
        user_id,
        project_type: SpeechProjectType::VoiceConversion,
        text: None,
        language_id: None,
        voice_sample_id: Some(target.id),
        source_audio_url: Some(source_audio_url.clone()),
        parameters: json!({}),
    };
    create_and_spawn(state, create, |id| {
        json!({
            "project_id": id,
            "source_audio_url": source_audio_url,
            "target_voice_url": target.audio_url,
        })
    })
    .await
}

/// POST /api/v1/voice-conversion/convert
pub async fn convert(
    _key: ApiKey,
    State(state): State<AppState>,
    Json(input): Json<ConvertRequest>,
) -> AppResult<(StatusCode, Json<SpeechProject>)> {
    input
        .validate()
        .map_err(CoreError::from)?;
    let project = convert_inner(
        &state,
        user_or_anonymous(input.user_id.as_deref()),
        input.source_audio_url,
        input.target_voice_sample_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// POST /api/v1/voice-conversion/convert-upload
///
/// Multipart fields: `source_audio`, `target_voice_sample_id`, `user_id`.
/// The recording is pushed to the media store before the job is created.
pub async fn convert_upload(
    _key: ApiKey,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<SpeechProject>)> {
    let mut form = FormData::read(multipart, &["source_audio"]).await?;
    let file = form.take_file("source_audio")?;
    let target_id: DbId = form
        .require_text("target_voice_sample_id")?
        .parse()
        .map_err(|_| AppError::BadRequest("target_voice_sample_id must be an integer".into()))?;
    let user_id = user_or_anonymous(form.text("user_id"));

    if file.bytes.len() > MAX_SOURCE_AUDIO_BYTES {
        return Err(AppError::BadRequest(format!(
            "Source audio exceeds {} MiB",
            MAX_SOURCE_AUDIO_BYTES / (1024 * 1024)
        )));
    }
    audio::ensure_audio(&file.bytes, file.content_type.as_deref())?;

    // Fail on an unknown target before anything is uploaded.
    voice_sample_or_404(&state, target_id).await?;

    let options = UploadOptions {
        resource_type: ResourceType::Video,
        folder: None,
        public_id: Some(format!(
            "{SOURCE_FOLDER}/{}_{}",
            public_id_segment(&user_id),
            uuid::Uuid::new_v4()
        )),
        filename: file.filename,
    };
    let source_audio_url = state.media()?.upload(file.bytes, &options).await?;

    let project = convert_inner(&state, user_id, source_audio_url, target_id).await?;
    Ok((StatusCode::CREATED, Json(project)))
}
