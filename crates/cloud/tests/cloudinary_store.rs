//! `CloudinaryStore` against a local stand-in for the upload API.

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use axum::extract::Path;
use axum::routing::post;
use axum::{Json, Router};
use creatorify_cloud::media::{
    CloudinaryConfig, CloudinaryStore, MediaError, MediaStore, ResourceType, UploadOptions,
};
use serde_json::{json, Value};

async fn upload(Path((cloud, resource_type)): Path<(String, String)>) -> Json<Value> {
    if cloud == "slow" {
        tokio::time::sleep(Duration::from_secs(10)).await;
    }
    Json(json!({
        "secure_url": format!("https://res.media.test/{cloud}/{resource_type}/upload/v1/out.mp4")
    }))
}

async fn start_store(cloud_name: &str, timeout: Duration) -> CloudinaryStore {
    let app = Router::new().route("/{cloud}/{resource_type}/upload", post(upload));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    CloudinaryStore::with_api_base(
        CloudinaryConfig {
            cloud_name: cloud_name.to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            timeout,
        },
        format!("http://{addr}"),
    )
    .unwrap()
}

fn video_options() -> UploadOptions {
    UploadOptions {
        resource_type: ResourceType::Video,
        folder: Some("creatorify_outputs".to_string()),
        public_id: Some("project_1".to_string()),
        filename: "project_1.mp4".to_string(),
    }
}

#[tokio::test]
async fn upload_returns_secure_url() {
    let store = start_store("demo", Duration::from_secs(5)).await;
    let url = store.upload(b"fake-mp4".to_vec(), &video_options()).await.unwrap();
    assert_eq!(url, "https://res.media.test/demo/video/upload/v1/out.mp4");
}

#[tokio::test]
async fn stalled_upload_times_out() {
    let store = start_store("slow", Duration::from_millis(200)).await;

    let started = Instant::now();
    let result = store.upload(b"fake-mp4".to_vec(), &video_options()).await;

    assert_matches!(result, Err(MediaError::Request(e)) if e.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(5));
}
