//! Lifecycle updates through `JobStateRepo`.

use creatorify_core::generation::{AudioOrder, VideoProjectType};
use creatorify_core::lifecycle::{self, CallOutcome, Transition, PROGRESS_UPLOADING};
use creatorify_core::status::JobStatus;
use creatorify_db::models::job_state::JobTable;
use creatorify_db::models::tts_project::CreateTtsProject;
use creatorify_db::models::video_project::CreateVideoProject;
use creatorify_db::repositories::{JobStateRepo, TtsProjectRepo, VideoProjectRepo};
use sqlx::PgPool;

async fn queued_video(pool: &PgPool) -> i64 {
    VideoProjectRepo::create(
        pool,
        &CreateVideoProject {
            user_id: "anonymous".to_string(),
            title: "t".to_string(),
            description: None,
            project_type: VideoProjectType::SinglePerson,
            image_url: "https://cdn.test/i.png".to_string(),
            audio_url: "https://cdn.test/a.wav".to_string(),
            audio_url_2: None,
            audio_order: AudioOrder::LeftRight,
            prompt: None,
            parameters: serde_json::json!({}),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_snapshot_and_call_id(pool: PgPool) {
    let id = queued_video(&pool).await;
    let table = JobTable::VideoProjects;

    assert!(JobStateRepo::set_call_id(&pool, table, id, "fc-1").await.unwrap());
    let snap = JobStateRepo::snapshot(&pool, table, id).await.unwrap().unwrap();
    assert_eq!(snap.status, JobStatus::Queued);
    assert_eq!(snap.call_id.as_deref(), Some("fc-1"));
    assert!(JobStateRepo::snapshot(&pool, table, id + 1000)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_video_lifecycle(pool: PgPool) {
    let id = queued_video(&pool).await;
    let table = JobTable::VideoProjects;
    JobStateRepo::set_call_id(&pool, table, id, "fc-1").await.unwrap();

    let snap = JobStateRepo::snapshot(&pool, table, id).await.unwrap().unwrap();
    let Transition::Update(update) = lifecycle::advance(&snap, CallOutcome::Pending) else {
        panic!("pending on a queued row should move it to processing");
    };
    JobStateRepo::apply_update(&pool, table, id, &update).await.unwrap();

    assert!(JobStateRepo::claim_upload(&pool, table, id).await.unwrap());
    // A second claimant loses.
    assert!(!JobStateRepo::claim_upload(&pool, table, id).await.unwrap());

    let snap = JobStateRepo::snapshot(&pool, table, id).await.unwrap().unwrap();
    assert_eq!(snap.progress, PROGRESS_UPLOADING);
    assert_eq!(lifecycle::poll_target(&snap, chrono::Utc::now()), None);

    let done = lifecycle::upload_succeeded("https://cdn.test/out.mp4".to_string(), table.success_status());
    JobStateRepo::apply_update(&pool, table, id, &done).await.unwrap();

    let row = VideoProjectRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status, "finished");
    assert_eq!(row.progress, 100);
    assert_eq!(row.video_url.as_deref(), Some("https://cdn.test/out.mp4"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_terminal_rows_are_frozen(pool: PgPool) {
    let id = queued_video(&pool).await;
    let table = JobTable::VideoProjects;

    assert!(JobStateRepo::set_status(&pool, table, id, JobStatus::FailedToSpawn)
        .await
        .unwrap());
    let late = lifecycle::upload_succeeded("https://cdn.test/x.mp4".to_string(), JobStatus::Finished);
    assert!(!JobStateRepo::apply_update(&pool, table, id, &late).await.unwrap());
    assert!(!JobStateRepo::claim_upload(&pool, table, id).await.unwrap());

    let row = VideoProjectRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.status, "failed_to_spawn");
    assert!(row.video_url.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audio_output_column(pool: PgPool) {
    let project = TtsProjectRepo::create(
        &pool,
        &CreateTtsProject {
            user_id: "anonymous".to_string(),
            text: "hi".to_string(),
            voice: "af_heart".to_string(),
            speed: 1.0,
            lang_code: "a".to_string(),
        },
    )
    .await
    .unwrap();
    let table = JobTable::TtsProjects;

    let failed = lifecycle::upload_failed("Media upload failed: boom".to_string());
    JobStateRepo::apply_update(&pool, table, project.id, &failed).await.unwrap();

    let snap = JobStateRepo::snapshot(&pool, table, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snap.status, JobStatus::Failed);
    assert_eq!(snap.error_message.as_deref(), Some("Media upload failed: boom"));
    assert!(snap.output_url.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stalled_upload_can_be_reclaimed(pool: PgPool) {
    let id = queued_video(&pool).await;
    let table = JobTable::VideoProjects;
    JobStateRepo::set_call_id(&pool, table, id, "fc-1").await.unwrap();
    assert!(JobStateRepo::claim_upload(&pool, table, id).await.unwrap());

    sqlx::query("UPDATE video_projects SET updated_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let snap = JobStateRepo::snapshot(&pool, table, id).await.unwrap().unwrap();
    assert!(snap.upload_stalled(chrono::Utc::now()));
    assert_eq!(lifecycle::poll_target(&snap, chrono::Utc::now()), Some("fc-1"));

    // The first re-claim refreshes `updated_at`, so a concurrent one loses.
    assert!(JobStateRepo::claim_upload(&pool, table, id).await.unwrap());
    assert!(!JobStateRepo::claim_upload(&pool, table, id).await.unwrap());

    let snap = JobStateRepo::snapshot(&pool, table, id).await.unwrap().unwrap();
    assert_eq!(snap.progress, PROGRESS_UPLOADING);
    assert!(!snap.upload_stalled(chrono::Utc::now()));
}
