//! Handlers for talking-head video projects (`/projects`).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use creatorify_cloud::media::ResourceType;
use creatorify_core::error::CoreError;
use creatorify_core::frames::{self, FramePlan};
use creatorify_core::generation::{AudioOrder, GenerationParams, VideoProjectType, DEFAULT_PROMPT};
use creatorify_core::types::{user_or_anonymous, DbId};
use creatorify_db::models::job_state::JobTable;
use creatorify_db::models::video_project::{CreateVideoProject, VideoProject, VideoProjectListQuery};
use creatorify_db::repositories::VideoProjectRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::lifecycle::{self, UploadTarget};
use crate::middleware::auth::ApiKey;
use crate::state::AppState;

/// Remote function that renders a talking-head video.
const SUBMIT_FUNCTION: &str = "submit";

/// Media store folder for rendered videos.
pub const OUTPUT_FOLDER: &str = "creatorify_outputs";

/// Request body for `POST /api/v1/projects`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    pub user_id: Option<String>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: String,
    #[validate(url)]
    pub audio_url: String,
    /// Second speaker; makes this a multi-person project.
    #[validate(url)]
    pub audio_url_2: Option<String>,
    #[serde(default)]
    pub audio_order: AudioOrder,
    pub prompt: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub parameters: GenerationParams,
    /// Length of the first audio track, when the client already knows it.
    #[validate(range(exclusive_min = 0.0))]
    pub audio_duration_secs: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub audio_duration_2_secs: Option<f64>,
}

/// Request body for `POST /api/v1/projects/frame-plan`.
#[derive(Debug, Deserialize, Validate)]
pub struct FramePlanRequest {
    #[validate(range(exclusive_min = 0.0))]
    pub audio_duration_secs: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub audio_duration_2_secs: Option<f64>,
    #[serde(default)]
    pub audio_order: AudioOrder,
    #[validate(range(min = 5))]
    pub frame_num: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FramePlanResponse {
    pub total_audio_secs: f64,
    /// Remote `audio_type` for two-speaker projects.
    pub audio_type: Option<&'static str>,
    #[serde(flatten)]
    pub plan: FramePlan,
}

fn plan_for(
    first: f64,
    second: Option<f64>,
    order: AudioOrder,
    frame_num: Option<i64>,
) -> FramePlanResponse {
    let total = frames::total_audio_duration(first, second, order);
    FramePlanResponse {
        total_audio_secs: total,
        audio_type: second.map(|_| order.audio_type()),
        plan: frames::plan_frames(total, frame_num),
    }
}

/// Arguments for the remote `submit` function.
fn submit_payload(project: &VideoProject, input: &CreateProjectRequest) -> serde_json::Value {
    let mut payload = json!({
        "project_id": project.id,
        "image_url": project.image_url,
        "audio_url": project.audio_url,
        "audio_url_2": project.audio_url_2,
        "audio_order": input.audio_order.as_str(),
        "prompt": project.prompt.as_deref().unwrap_or(DEFAULT_PROMPT),
        "params": input.parameters,
    });

    if input.audio_url_2.is_some() {
        payload["audio_type"] = json!(input.audio_order.audio_type());
    }
    if let Some(first) = input.audio_duration_secs {
        let plan = plan_for(
            first,
            input.audio_duration_2_secs,
            input.audio_order,
            input.parameters.frame_num,
        );
        payload["frame_plan"] = json!(plan.plan);
    }
    payload
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// POST /api/v1/projects
pub async fn create(
    _key: ApiKey,
    State(state): State<AppState>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<VideoProject>)> {
    input.validate().map_err(CoreError::from)?;
    if input.audio_duration_2_secs.is_some() && input.audio_url_2.is_none() {
        return Err(AppError::BadRequest(
            "audio_duration_2_secs requires audio_url_2".into(),
        ));
    }

    let create = CreateVideoProject {
        user_id: user_or_anonymous(input.user_id.as_deref()),
        title: input.title.clone(),
        description: input.description.clone(),
        project_type: VideoProjectType::for_second_audio(input.audio_url_2.as_deref()),
        image_url: input.image_url.clone(),
        audio_url: input.audio_url.clone(),
        audio_url_2: input.audio_url_2.clone(),
        audio_order: input.audio_order,
        prompt: input.prompt.clone(),
        parameters: json!(input.parameters),
    };
    let project = VideoProjectRepo::create(&state.pool, &create).await?;

    let payload = submit_payload(&project, &input);
    lifecycle::spawn_job(&state, JobTable::VideoProjects, project.id, SUBMIT_FUNCTION, payload)
        .await?;

    let project = VideoProjectRepo::find_by_id(&state.pool, project.id)
        .await?
        .ok_or_else(|| not_found(project.id))?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn list(
    _key: ApiKey,
    State(state): State<AppState>,
    Query(params): Query<VideoProjectListQuery>,
) -> AppResult<Json<Vec<VideoProject>>> {
    let projects = VideoProjectRepo::list(&state.pool, &params).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<VideoProject>> {
    let project = VideoProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if VideoProjectRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/projects/{id}/status
///
/// Polls the remote render if it is still running and returns the row.
pub async fn status(
    _key: ApiKey,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<VideoProject>> {
    let target = UploadTarget {
        resource_type: ResourceType::Video,
        folder: OUTPUT_FOLDER,
        public_id: Some(format!("project_{id}")),
    };
    lifecycle::check_status(&state, JobTable::VideoProjects, id, target).await?;

    let project = VideoProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// POST /api/v1/projects/frame-plan
///
/// Preview the frame count and render mode for the given audio lengths.
pub async fn frame_plan(
    _key: ApiKey,
    Json(input): Json<FramePlanRequest>,
) -> AppResult<Json<FramePlanResponse>> {
    input.validate().map_err(CoreError::from)?;
    Ok(Json(plan_for(
        input.audio_duration_secs,
        input.audio_duration_2_secs,
        input.audio_order,
        input.frame_num,
    )))
}
