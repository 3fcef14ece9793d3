//! Kokoro TTS endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, wait_for_status};
use creatorify_core::lifecycle::CallOutcome;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn generate_applies_defaults_and_spawns(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(&app, "/api/v1/tts/generate", json!({"text": "Hello world"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["voice"], "af_heart");
    assert_eq!(json["lang_code"], "a");
    assert_eq!(json["speed"], 1.0);
    assert_eq!(json["status"], "queued");

    let (function, payload) = &app.platform.spawned()[0];
    assert_eq!(function, "process_tts");
    assert_eq!(payload["tts_id"], json["id"]);
    assert_eq!(payload["text"], "Hello world");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generate_validates_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    for body in [
        json!({"text": ""}),
        json!({"text": "hi", "speed": 0}),
        json!({"text": "hi", "lang_code": "x"}),
        json!({"text": "hi", "voice": "bf_emma"}),
    ] {
        let response = post_json(&app, "/api/v1/tts/generate", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
    assert!(app.platform.spawned().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn finished_audio_is_marked_completed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let created = body_json(post_json(&app, "/api/v1/tts/generate", json!({"text": "Hi"})).await).await;
    let id = created["id"].as_i64().unwrap();

    app.platform.put_output("tts_out.wav", b"RIFF....");
    app.platform
        .set_outcome("fc-1", CallOutcome::Succeeded(Some("tts_out.wav".into())));

    let json = wait_for_status(&app, &format!("/api/v1/tts/{id}/status"), "completed").await;
    assert_eq!(json["progress"], 100);
    assert!(json["audio_url"].as_str().unwrap().contains(&format!("tts_{id}")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn catalog_endpoints(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = body_json(get(&app, "/api/v1/tts/languages").await).await;
    assert_eq!(json["total"], 9);

    let json = body_json(get(&app, "/api/v1/tts/languages/b").await).await;
    assert_eq!(json["name"], "British English");
    assert_eq!(get(&app, "/api/v1/tts/languages/q").await.status(), StatusCode::NOT_FOUND);

    let json = body_json(get(&app, "/api/v1/tts/voices").await).await;
    assert_eq!(json["total"], 28);
    assert!(json.get("language").is_none());

    let json = body_json(get(&app, "/api/v1/tts/voices?lang_code=a").await).await;
    assert_eq!(json["total"], 9);
    assert_eq!(json["language"]["code"], "a");
    assert_eq!(
        get(&app, "/api/v1/tts/voices?lang_code=q").await.status(),
        StatusCode::NOT_FOUND
    );

    let json = body_json(get(&app, "/api/v1/tts/voices/j").await).await;
    assert_eq!(json["total"], 2);
    assert_eq!(get(&app, "/api/v1/tts/voices/q").await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_get_delete(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(&app, "/api/v1/tts/generate", json!({"text": "a", "user_id": "u1"})).await;
    let created = body_json(post_json(&app, "/api/v1/tts/generate", json!({"text": "b"})).await).await;
    let id = created["id"].as_i64().unwrap();

    let mine = body_json(get(&app, "/api/v1/tts?user_id=u1").await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    assert_eq!(get(&app, &format!("/api/v1/tts/{id}")).await.status(), StatusCode::OK);
    assert_eq!(delete(&app, &format!("/api/v1/tts/{id}")).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &format!("/api/v1/tts/{id}")).await.status(), StatusCode::NOT_FOUND);
}
