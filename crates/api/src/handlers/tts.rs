//! Handlers for Kokoro text-to-speech (`/tts`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use creatorify_cloud::media::ResourceType;
use creatorify_core::error::CoreError;
use creatorify_core::kokoro::{self, Language, Voice, DEFAULT_LANG_CODE, DEFAULT_VOICE};
use creatorify_core::types::{user_or_anonymous, DbId};
use creatorify_db::models::job_state::JobTable;
use creatorify_db::models::tts_project::{CreateTtsProject, TtsProject, TtsProjectListQuery};
use creatorify_db::repositories::TtsProjectRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::lifecycle::{self, UploadTarget};
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

const TTS_FUNCTION: &str = "process_tts";

pub const OUTPUT_FOLDER: &str = "creatorify_tts";

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_lang_code() -> String {
    DEFAULT_LANG_CODE.to_string()
}

fn default_speed() -> f64 {
    1.0
}

/// Request body for `POST /api/v1/tts/generate`.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "voice_matches_language"))]
pub struct GenerateTtsRequest {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_speed")]
    #[validate(range(exclusive_min = 0.0))]
    pub speed: f64,
    #[serde(default = "default_lang_code")]
    pub lang_code: String,
    pub user_id: Option<String>,
}

fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("text must not be empty".into()));
    }
    Ok(())
}

/// The language must exist and the voice must belong to it.
fn voice_matches_language(input: &GenerateTtsRequest) -> Result<(), ValidationError> {
    if kokoro::language(&input.lang_code).is_none() {
        return Err(ValidationError::new("lang_code").with_message(
            format!(
                "Unknown language code '{}'. Available codes: {}",
                input.lang_code,
                kokoro::language_codes()
            )
            .into(),
        ));
    }
    match kokoro::find_voice(&input.voice) {
        Some(voice) if voice.lang == input.lang_code => Ok(()),
        Some(_) => Err(ValidationError::new("voice").with_message(
            format!(
                "Voice '{}' does not belong to language '{}'",
                input.voice, input.lang_code
            )
            .into(),
        )),
        None => Err(ValidationError::new("voice")
            .with_message(format!("Unknown voice '{}'", input.voice).into())),
    }
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [Language],
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<&'static Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'static Language>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    pub lang_code: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TTS project",
        id,
    })
}

fn language_or_404(code: &str) -> AppResult<&'static Language> {
    kokoro::language(code).ok_or_else(|| {
        AppError::NotFound(format!(
            "Language code '{code}' not found. Available codes: {}",
            kokoro::language_codes()
        ))
    })
}

/// POST /api/v1/tts/generate
pub async fn generate(
    _key: ApiKey,
    State(state): State<AppState>,
    Json(input): Json<GenerateTtsRequest>,
) -> AppResult<(StatusCode, Json<TtsProject>)> {
    input.validate().map_err(CoreError::from)?;

    let create = CreateTtsProject {
        user_id: user_or_anonymous(input.user_id.as_deref()),
        text: input.text,
        voice: input.voice,
        speed: input.speed,
        lang_code: input.lang_code,
    };
    let project = TtsProjectRepo::create(&state.pool, &create).await?;

    let payload = json!({
        "tts_id": project.id,
        "text": project.text,
        "voice": project.voice,
        "speed": project.speed,
        "lang_code": project.lang_code,
    });
    lifecycle::spawn_job(&state, JobTable::TtsProjects, project.id, TTS_FUNCTION, payload).await?;

    let project = TtsProjectRepo::find_by_id(&state.pool, project.id)
        .await?
        .ok_or_else(|| not_found(project.id))?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/tts/languages
pub async fn list_languages(_key: ApiKey) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: kokoro::LANGUAGES,
        total: kokoro::LANGUAGES.len(),
    })
}

/// GET /api/v1/tts/languages/{code}
pub async fn get_language(_key: ApiKey, Path(code): Path<String>) -> AppResult<Json<Language>> {
    Ok(Json(*language_or_404(&code)?))
}

/// GET /api/v1/tts/voices
///
/// All voices, or only those of `lang_code` when given.
pub async fn list_voices(
    _key: ApiKey,
    Query(params): Query<VoicesQuery>,
) -> AppResult<Json<VoicesResponse>> {
    let Some(code) = params.lang_code.filter(|c| !c.is_empty()) else {
        let voices: Vec<&'static Voice> = kokoro::VOICES.iter().collect();
        return Ok(Json(VoicesResponse {
            total: voices.len(),
            voices,
            language: None,
        }));
    };

    let voices = kokoro::voices_for(&code);
    if voices.is_empty() {
        return Err(AppError::NotFound(format!(
            "No voices found for language code '{code}'"
        )));
    }
    Ok(Json(VoicesResponse {
        total: voices.len(),
        voices,
        language: kokoro::language(&code),
    }))
}

/// GET /api/v1/tts/voices/{code}
pub async fn voices_for_language(
    _key: ApiKey,
    Path(code): Path<String>,
) -> AppResult<Json<VoicesResponse>> {
    let language = language_or_404(&code)?;
    let voices = kokoro::voices_for(language.code);
    Ok(Json(VoicesResponse {
        total: voices.len(),
        voices,
        language: Some(language),
    }))
}

/// GET /api/v1/tts
pub async fn list(
    _key: ApiKey,
    State(state): State<AppState>,
    Query(params): Query<TtsProjectListQuery>,
) -> AppResult<Json<Vec<TtsProject>>> {
    let projects = TtsProjectRepo::list(&state.pool, &params).await?;
    Ok(Json(projects))
}

/// GET /api/v1/tts/{id}
pub async fn get_by_id(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TtsProject>> {
    let project = TtsProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/tts/{id}
pub async fn delete(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TtsProjectRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/tts/{id}/status
pub async fn status(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TtsProject>> {
    let target = UploadTarget {
        resource_type: ResourceType::Video,
        folder: OUTPUT_FOLDER,
        public_id: Some(format!("tts_{id}")),
    };
    lifecycle::check_status(&state, JobTable::TtsProjects, id, target).await?;

    let project = TtsProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(text: &str, voice: &str, lang_code: &str, speed: f64) -> GenerateTtsRequest {
        GenerateTtsRequest {
            text: text.into(),
            voice: voice.into(),
            speed,
            lang_code: lang_code.into(),
            user_id: None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let input: GenerateTtsRequest = serde_json::from_str(r#"{"text": "Hello"}"#).unwrap();
        assert_eq!(input.voice, "af_heart");
        assert_eq!(input.lang_code, "a");
        assert_eq!(input.speed, 1.0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn rejects_blank_text_and_bad_speed() {
        let errors = request("   ", "af_heart", "a", 1.0).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("text"));

        let errors = request("hi", "af_heart", "a", 0.0).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("speed"));
    }

    #[test]
    fn voice_must_match_language() {
        assert!(request("hi", "bf_emma", "b", 1.0).validate().is_ok());
        assert_matches!(
            request("hi", "bf_emma", "a", 1.0).validate(),
            Err(errors) if errors.to_string().contains("does not belong")
        );
        assert_matches!(
            request("hi", "af_heart", "x", 1.0).validate(),
            Err(errors) if errors.to_string().contains("Unknown language")
        );
        assert_matches!(
            request("hi", "zz_nobody", "a", 1.0).validate(),
            Err(errors) if errors.to_string().contains("Unknown voice")
        );
    }

    #[test]
    fn validation_failure_maps_to_bad_request() {
        let err = AppError::from(CoreError::from(
            request("hi", "bf_emma", "a", 1.0).validate().unwrap_err(),
        ));
        assert_matches!(err, AppError::Core(CoreError::Validation(msg)) if msg.contains("bf_emma"));
    }
}
