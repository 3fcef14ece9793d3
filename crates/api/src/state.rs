use std::sync::Arc;

use creatorify_cloud::media::{MediaError, MediaStore};
use creatorify_cloud::platform::GpuPlatform;

use crate::background::uploader::UploadQueue;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: creatorify_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Remote GPU platform running the generation functions.
    pub platform: Arc<dyn GpuPlatform>,
    /// Media store; `None` when no credentials are configured.
    pub media: Option<Arc<dyn MediaStore>>,
    /// Hand-off to the background uploader.
    pub uploads: UploadQueue,
}

impl AppState {
    /// The media store, or [`MediaError::Disabled`].
    pub fn media(&self) -> Result<&Arc<dyn MediaStore>, MediaError> {
        self.media.as_ref().ok_or(MediaError::Disabled)
    }
}
