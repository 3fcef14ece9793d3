//! Spawning remote jobs and checking their status.
//!
//! Every job type follows the same lifecycle; handlers only supply the
//! table, the remote function and payload, and where finished artifacts go.

use creatorify_cloud::media::ResourceType;
use creatorify_core::error::CoreError;
use creatorify_core::lifecycle::{self, JobSnapshot, Transition};
use creatorify_core::status::JobStatus;
use creatorify_core::types::DbId;
use creatorify_db::models::job_state::JobTable;
use creatorify_db::repositories::JobStateRepo;

use crate::background::uploader::UploadJob;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Where a job's finished artifact is stored.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub resource_type: ResourceType,
    pub folder: &'static str,
    pub public_id: Option<String>,
}

/// Spawn `function` for an already inserted row and store the call handle.
///
/// On failure the row is marked `failed_to_spawn` and the platform error is
/// returned.
pub async fn spawn_job(
    state: &AppState,
    table: JobTable,
    id: DbId,
    function: &str,
    payload: serde_json::Value,
) -> AppResult<String> {
    match state.platform.spawn(function, payload).await {
        Ok(call_id) => {
            if let Err(e) = JobStateRepo::set_call_id(&state.pool, table, id, &call_id).await {
                tracing::error!(
                    table = table.table_name(),
                    project_id = id,
                    function,
                    call_id = %call_id,
                    error = %e,
                    "Failed to record call handle; remote job is orphaned"
                );
                mark_failed_to_spawn(state, table, id).await;
                return Err(e.into());
            }
            tracing::info!(
                table = table.table_name(),
                project_id = id,
                function,
                call_id = %call_id,
                "Remote job spawned"
            );
            Ok(call_id)
        }
        Err(e) => {
            tracing::error!(
                table = table.table_name(),
                project_id = id,
                function,
                error = %e,
                "Failed to spawn remote job"
            );
            mark_failed_to_spawn(state, table, id).await;
            Err(AppError::Platform(e))
        }
    }
}

async fn mark_failed_to_spawn(state: &AppState, table: JobTable, id: DbId) {
    if let Err(e) = JobStateRepo::set_status(&state.pool, table, id, JobStatus::FailedToSpawn).await {
        tracing::error!(project_id = id, error = %e, "Failed to mark job failed_to_spawn");
    }
}

/// Poll the row's call handle if it still needs polling and persist the
/// resulting transition. Returns the row's lifecycle state afterwards.
///
/// Platform errors never fail the request; the last known state is
/// returned instead.
pub async fn check_status(
    state: &AppState,
    table: JobTable,
    id: DbId,
    target: UploadTarget,
) -> AppResult<JobSnapshot> {
    let mut snapshot = load(state, table, id).await?;

    let now = chrono::Utc::now();
    let Some(call_id) = lifecycle::poll_target(&snapshot, now) else {
        return Ok(snapshot);
    };
    if snapshot.upload_stalled(now) {
        tracing::warn!(
            table = table.table_name(),
            project_id = id,
            call_id = %call_id,
            "Upload never completed; polling again"
        );
    }

    let outcome = match state.platform.poll(call_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(project_id = id, call_id = %call_id, error = %e, "Status poll failed");
            return Ok(snapshot);
        }
    };

    match lifecycle::advance(&snapshot, outcome) {
        Transition::Unchanged => Ok(snapshot),
        Transition::Update(update) => {
            JobStateRepo::apply_update(&state.pool, table, id, &update).await?;
            update.apply(&mut snapshot);
            Ok(snapshot)
        }
        Transition::Upload { output, update } => {
            if !JobStateRepo::claim_upload(&state.pool, table, id).await? {
                // Another status check got there first.
                return load(state, table, id).await;
            }
            update.apply(&mut snapshot);

            let job = UploadJob {
                table,
                project_id: id,
                filename: output,
                resource_type: target.resource_type,
                folder: target.folder.to_string(),
                public_id: target.public_id,
                success_status: table.success_status(),
            };
            if !state.uploads.try_enqueue(job) {
                let fallback = lifecycle::upload_unavailable(table.success_status());
                JobStateRepo::apply_update(&state.pool, table, id, &fallback).await?;
                fallback.apply(&mut snapshot);
            }
            Ok(snapshot)
        }
    }
}

async fn load(state: &AppState, table: JobTable, id: DbId) -> AppResult<JobSnapshot> {
    JobStateRepo::snapshot(&state.pool, table, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: table.entity(),
            id,
        }))
}
