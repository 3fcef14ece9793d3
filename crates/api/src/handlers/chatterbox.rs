//! Handlers for Chatterbox voice-cloning and multilingual TTS
//! (`/chatterbox`). Voice conversion jobs live in the same table and are
//! listed here too.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use creatorify_cloud::media::ResourceType;
use creatorify_core::chatterbox::{self, SamplingParams, SpeechProjectType, SUPPORTED_LANGUAGES};
use creatorify_core::error::CoreError;
use creatorify_core::text_chunker::TextChunker;
use creatorify_core::types::{user_or_anonymous, DbId};
use creatorify_db::models::job_state::JobTable;
use creatorify_db::models::speech_project::{
    CreateSpeechProject, SpeechProject, SpeechProjectListQuery,
};
use creatorify_db::repositories::SpeechProjectRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::voices::voice_sample_or_404;
use crate::lifecycle::{self, UploadTarget};
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

pub const OUTPUT_FOLDER: &str = "creatorify_speech";

/// Optional sampling fields of a generate request. Missing fields take the
/// model's defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SamplingOverrides {
    pub exaggeration: Option<f64>,
    pub temperature: Option<f64>,
    pub cfg_weight: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub min_p: Option<f64>,
    pub top_p: Option<f64>,
}

impl SamplingOverrides {
    /// Overlay the given fields on `base` and validate the result.
    pub fn resolve(&self, base: SamplingParams) -> Result<SamplingParams, CoreError> {
        let params = SamplingParams {
            exaggeration: self.exaggeration.unwrap_or(base.exaggeration),
            temperature: self.temperature.unwrap_or(base.temperature),
            cfg_weight: self.cfg_weight.unwrap_or(base.cfg_weight),
            repetition_penalty: self.repetition_penalty.unwrap_or(base.repetition_penalty),
            min_p: self.min_p.unwrap_or(base.min_p),
            top_p: self.top_p.unwrap_or(base.top_p),
        };
        params.validate()?;
        Ok(params)
    }
}

/// Request body for `POST /api/v1/chatterbox/tts/generate`.
#[derive(Debug, Deserialize)]
pub struct VoiceCloneRequest {
    pub text: String,
    pub voice_sample_id: DbId,
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub sampling: SamplingOverrides,
}

/// Request body for `POST /api/v1/chatterbox/multilingual/generate`.
#[derive(Debug, Deserialize)]
pub struct MultilingualRequest {
    pub text: String,
    pub language_id: String,
    /// Reference voice for cross-lingual cloning.
    pub voice_sample_id: Option<DbId>,
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub sampling: SamplingOverrides,
}

#[derive(Debug, Serialize)]
pub struct LanguageEntry {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MultilingualLanguagesResponse {
    pub languages: Vec<LanguageEntry>,
    pub total: usize,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Speech project",
        id,
    })
}

fn require_text(text: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".into()));
    }
    Ok(())
}

/// Arguments shared by both TTS remote functions. `chunks` always holds at
/// least one entry.
fn tts_payload(
    project_id: DbId,
    text: &str,
    voice_sample_url: Option<&str>,
    sampling: &SamplingParams,
) -> serde_json::Value {
    let chunks = TextChunker::default().split_text(text);
    let mut payload = json!({
        "project_id": project_id,
        "text": text,
        "chunks": chunks,
        "voice_sample_url": voice_sample_url,
    });
    if let (Some(map), serde_json::Value::Object(params)) =
        (payload.as_object_mut(), json!(sampling))
    {
        map.extend(params);
    }
    payload
}

/// Insert the row, spawn its remote function and return the stored row.
pub(crate) async fn create_and_spawn(
    state: &AppState,
    create: CreateSpeechProject,
    build_payload: impl FnOnce(DbId) -> serde_json::Value,
) -> AppResult<SpeechProject> {
    let function = create.project_type.remote_function();
    let project = SpeechProjectRepo::create(&state.pool, &create).await?;

    lifecycle::spawn_job(
        state,
        JobTable::SpeechProjects,
        project.id,
        function,
        build_payload(project.id),
    )
    .await?;

    SpeechProjectRepo::find_by_id(&state.pool, project.id)
        .await?
        .ok_or_else(|| not_found(project.id))
}

/// POST /api/v1/chatterbox/tts/generate
pub async fn generate_tts(
    _key: ApiKey,
    State(state): State<AppState>,
    Json(input): Json<VoiceCloneRequest>,
) -> AppResult<(StatusCode, Json<SpeechProject>)> {
    require_text(&input.text)?;
    let sampling = input.sampling.resolve(SamplingParams::english())?;
    let sample = voice_sample_or_404(&state, input.voice_sample_id).await?;

    let create = CreateSpeechProject {
        user_id: user_or_anonymous(input.user_id.as_deref()),
        project_type: SpeechProjectType::Tts,
        text: Some(input.text.clone()),
        language_id: None,
        voice_sample_id: Some(sample.id),
        source_audio_url: None,
        parameters: json!(sampling),
    };
    let project = create_and_spawn(&state, create, |id| {
        tts_payload(id, &input.text, Some(&sample.audio_url), &sampling)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// POST /api/v1/chatterbox/multilingual/generate
pub async fn generate_multilingual(
    _key: ApiKey,
    State(state): State<AppState>,
    Json(input): Json<MultilingualRequest>,
) -> AppResult<(StatusCode, Json<SpeechProject>)> {
    require_text(&input.text)?;
    let language_id = chatterbox::normalize_language(&input.language_id)?;
    let sampling = input.sampling.resolve(SamplingParams::multilingual())?;
    let sample = match input.voice_sample_id {
        Some(id) => Some(voice_sample_or_404(&state, id).await?),
        None => None,
    };

    let create = CreateSpeechProject {
        user_id: user_or_anonymous(input.user_id.as_deref()),
        project_type: SpeechProjectType::MultilingualTts,
        text: Some(input.text.clone()),
        language_id: Some(language_id.to_string()),
        voice_sample_id: sample.as_ref().map(|s| s.id),
        source_audio_url: None,
        parameters: json!(sampling),
    };
    let sample_url = sample.as_ref().map(|s| s.audio_url.as_str());
    let project = create_and_spawn(&state, create, |id| {
        let mut payload = tts_payload(id, &input.text, sample_url, &sampling);
        payload["language_id"] = json!(language_id);
        payload
    })
    .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/chatterbox/multilingual/languages
pub async fn multilingual_languages(_key: ApiKey) -> Json<MultilingualLanguagesResponse> {
    let languages: Vec<LanguageEntry> = SUPPORTED_LANGUAGES
        .iter()
        .map(|&(code, name)| LanguageEntry { code, name })
        .collect();
    Json(MultilingualLanguagesResponse {
        total: languages.len(),
        languages,
    })
}

/// GET /api/v1/chatterbox/projects
pub async fn list(
    _key: ApiKey,
    State(state): State<AppState>,
    Query(params): Query<SpeechProjectListQuery>,
) -> AppResult<Json<Vec<SpeechProject>>> {
    let projects = SpeechProjectRepo::list(&state.pool, &params).await?;
    Ok(Json(projects))
}

/// GET /api/v1/chatterbox/projects/{id}
pub async fn get_by_id(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SpeechProject>> {
    let project = SpeechProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/chatterbox/projects/{id}
pub async fn delete(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SpeechProjectRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/chatterbox/projects/{id}/status
pub async fn status(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SpeechProject>> {
    let target = UploadTarget {
        resource_type: ResourceType::Video,
        folder: OUTPUT_FOLDER,
        public_id: Some(format!("speech_{id}")),
    };
    lifecycle::check_status(&state, JobTable::SpeechProjects, id, target).await?;

    let project = SpeechProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn overrides_fall_back_to_model_defaults() {
        let overrides: SamplingOverrides =
            serde_json::from_str(r#"{"temperature": 0.3}"#).unwrap();
        let params = overrides.resolve(SamplingParams::multilingual()).unwrap();
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.repetition_penalty, 2.0);
        assert_eq!(params.exaggeration, 0.5);
    }

    #[test]
    fn out_of_range_overrides_fail_validation() {
        let overrides = SamplingOverrides {
            cfg_weight: Some(1.5),
            ..Default::default()
        };
        assert_matches!(
            overrides.resolve(SamplingParams::english()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn sampling_fields_are_read_from_the_request_body() {
        let input: VoiceCloneRequest = serde_json::from_str(
            r#"{"text": "Hi", "voice_sample_id": 4, "exaggeration": 1.1}"#,
        )
        .unwrap();
        assert_eq!(input.voice_sample_id, 4);
        assert_eq!(input.sampling.exaggeration, Some(1.1));
    }

    #[test]
    fn payload_carries_chunks_and_flattened_sampling() {
        let text = format!("{}\n\n{}", "a".repeat(600), "b".repeat(600));
        let payload = tts_payload(9, &text, Some("https://cdn.test/v.wav"), &SamplingParams::english());
        assert_eq!(payload["project_id"], 9);
        assert_eq!(payload["chunks"].as_array().unwrap().len(), 2);
        assert_eq!(payload["repetition_penalty"], 1.2);
        assert_eq!(payload["voice_sample_url"], "https://cdn.test/v.wav");
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_matches!(require_text(" \n"), Err(AppError::BadRequest(_)));
    }
}
