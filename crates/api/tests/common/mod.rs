#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use creatorify_api::background::uploader::{UploadQueue, Uploader};
use creatorify_api::config::ServerConfig;
use creatorify_api::router::build_app_router;
use creatorify_api::state::AppState;
use creatorify_cloud::media::{MediaError, MediaStore, ResourceType, UploadOptions};
use creatorify_cloud::platform::{GpuPlatform, PlatformConfig, PlatformError};
use creatorify_core::lifecycle::CallOutcome;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-key";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        api_key: Some(TEST_API_KEY.to_string()),
        upload_queue_capacity: 8,
        platform: PlatformConfig {
            base_url: "http://platform.invalid".to_string(),
            app_name: "creatorify".to_string(),
            token: None,
            timeout: Duration::from_secs(5),
        },
        cloudinary: None,
    }
}

// ---------------------------------------------------------------------------
// Fake GPU platform
// ---------------------------------------------------------------------------

/// In-memory platform. Spawned calls stay pending until a test sets their
/// outcome.
#[derive(Default)]
pub struct FakePlatform {
    next_id: AtomicU64,
    fail_spawn: AtomicBool,
    fail_poll: AtomicBool,
    polls: AtomicU64,
    spawned: Mutex<Vec<(String, serde_json::Value)>>,
    outcomes: Mutex<HashMap<String, CallOutcome>>,
    outputs: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakePlatform {
    pub fn fail_spawns(&self) {
        self.fail_spawn.store(true, Ordering::SeqCst);
    }

    pub fn fail_polls(&self) {
        self.fail_poll.store(true, Ordering::SeqCst);
    }

    pub fn set_outcome(&self, call_id: &str, outcome: CallOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(call_id.to_string(), outcome);
    }

    pub fn put_output(&self, filename: &str, bytes: &[u8]) {
        self.outputs
            .lock()
            .unwrap()
            .insert(filename.to_string(), bytes.to_vec());
    }

    /// Number of `poll` calls so far.
    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }

    /// `(function, payload)` of every spawn so far.
    pub fn spawned(&self) -> Vec<(String, serde_json::Value)> {
        self.spawned.lock().unwrap().clone()
    }
}

#[async_trait]
impl GpuPlatform for FakePlatform {
    async fn spawn(
        &self,
        function: &str,
        payload: serde_json::Value,
    ) -> Result<String, PlatformError> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(PlatformError::ApiError {
                status: 503,
                body: "no capacity".to_string(),
            });
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.spawned
            .lock()
            .unwrap()
            .push((function.to_string(), payload));
        Ok(format!("fc-{n}"))
    }

    async fn poll(&self, call_id: &str) -> Result<CallOutcome, PlatformError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self.fail_poll.load(Ordering::SeqCst) {
            return Err(PlatformError::Decode("connection reset".to_string()));
        }
        Ok(self
            .outcomes
            .lock()
            .unwrap()
            .get(call_id)
            .cloned()
            .unwrap_or(CallOutcome::Pending))
    }

    async fn fetch_output(&self, filename: &str) -> Result<Option<Vec<u8>>, PlatformError> {
        Ok(self.outputs.lock().unwrap().get(filename).cloned())
    }
}

// ---------------------------------------------------------------------------
// Fake media store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeMediaStore {
    uploads: Mutex<Vec<(String, ResourceType, usize)>>,
    destroyed: Mutex<Vec<String>>,
}

impl FakeMediaStore {
    /// `(public id or folder/filename, resource type, byte count)`.
    pub fn uploads(&self) -> Vec<(String, ResourceType, usize)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn upload(&self, bytes: Vec<u8>, options: &UploadOptions) -> Result<String, MediaError> {
        let stem = options
            .filename
            .rsplit_once('.')
            .map_or(options.filename.as_str(), |(stem, _)| stem);
        let id = match (&options.folder, &options.public_id) {
            (Some(folder), Some(public_id)) => format!("{folder}/{public_id}"),
            (None, Some(public_id)) => public_id.clone(),
            (Some(folder), None) => format!("{folder}/{stem}"),
            (None, None) => stem.to_string(),
        };
        self.uploads
            .lock()
            .unwrap()
            .push((id.clone(), options.resource_type, bytes.len()));
        Ok(format!(
            "https://res.media.test/demo/{}/upload/v1/{id}.bin",
            options.resource_type.as_str()
        ))
    }

    async fn destroy(
        &self,
        public_id: &str,
        _resource_type: ResourceType,
    ) -> Result<bool, MediaError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub platform: Arc<FakePlatform>,
    pub media: Arc<FakeMediaStore>,
    pub cancel: CancellationToken,
}

/// Build the full application router with the fakes and a running uploader.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_with(pool, test_config(), true)
}

/// Same as [`build_test_app`] but with the media store disabled.
pub fn build_test_app_without_media(pool: PgPool) -> TestApp {
    build_with(pool, test_config(), false)
}

/// Build with a stopped uploader: every upload hand-off is rejected.
pub fn build_test_app_without_uploader(pool: PgPool) -> TestApp {
    assemble(pool, test_config(), true, false)
}

pub fn build_with(pool: PgPool, config: ServerConfig, with_media: bool) -> TestApp {
    assemble(pool, config, with_media, true)
}

fn assemble(pool: PgPool, config: ServerConfig, with_media: bool, run_uploader: bool) -> TestApp {
    let platform = Arc::new(FakePlatform::default());
    let media = Arc::new(FakeMediaStore::default());
    let media_dyn: Option<Arc<dyn MediaStore>> = if with_media {
        Some(media.clone())
    } else {
        None
    };

    let (uploads, rx) = UploadQueue::new(config.upload_queue_capacity);
    let cancel = CancellationToken::new();
    let uploader = Uploader {
        pool: pool.clone(),
        platform: platform.clone(),
        media: media_dyn.clone(),
    };
    if run_uploader {
        tokio::spawn(uploader.run(rx, cancel.clone()));
    } else {
        drop(rx);
    }

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        platform: platform.clone(),
        media: media_dyn,
        uploads,
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        platform,
        media,
        cancel,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("x-api-key", TEST_API_KEY)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("x-api-key", TEST_API_KEY)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-api-key", TEST_API_KEY)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a multipart form. `files` are `(field, filename, content type, bytes)`.
pub async fn post_multipart(
    app: &TestApp,
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> Response<Body> {
    const BOUNDARY: &str = "creatorify-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-api-key", TEST_API_KEY)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `uri` until the row reaches `status` or give up after ~5 s.
pub async fn wait_for_status(app: &TestApp, uri: &str, status: &str) -> serde_json::Value {
    for _ in 0..100 {
        let json = body_json(get(app, uri).await).await;
        if json["status"] == status {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{uri} never reached status {status}");
}

/// Minimal 16-bit mono PCM WAV of the given length.
pub fn wav_bytes(sample_rate: u32, seconds: f64) -> Vec<u8> {
    let samples = (f64::from(sample_rate) * seconds) as u32;
    let data_len = samples * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
