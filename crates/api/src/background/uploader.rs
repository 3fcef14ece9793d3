//! Best-effort artifact uploader.
//!
//! Status checks that observe a finished remote call hand the output
//! filename to this task instead of blocking the request. The task reads
//! the file from the platform's output volume, pushes it to the media store
//! and records the final status on the project row.

use std::sync::Arc;

use creatorify_cloud::media::{MediaError, MediaStore, ResourceType, UploadOptions};
use creatorify_cloud::platform::GpuPlatform;
use creatorify_core::lifecycle;
use creatorify_core::status::JobStatus;
use creatorify_core::types::DbId;
use creatorify_db::models::job_state::JobTable;
use creatorify_db::repositories::JobStateRepo;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One artifact to move from the output volume to the media store.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub table: JobTable,
    pub project_id: DbId,
    /// Filename in the platform's output volume.
    pub filename: String,
    pub resource_type: ResourceType,
    pub folder: String,
    pub public_id: Option<String>,
    /// Status written once the upload succeeds.
    pub success_status: JobStatus,
}

/// Sending half of the bounded upload queue.
#[derive(Clone)]
pub struct UploadQueue {
    tx: mpsc::Sender<UploadJob>,
}

impl UploadQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<UploadJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue without waiting. Returns `false` when the queue is full or
    /// the uploader has stopped.
    pub fn try_enqueue(&self, job: UploadJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(e) => {
                let job = match &e {
                    mpsc::error::TrySendError::Full(job) | mpsc::error::TrySendError::Closed(job) => job,
                };
                tracing::warn!(
                    table = job.table.table_name(),
                    project_id = job.project_id,
                    error = %e,
                    "Upload queue unavailable"
                );
                false
            }
        }
    }
}

/// Everything the worker needs besides its queue.
#[derive(Clone)]
pub struct Uploader {
    pub pool: PgPool,
    pub platform: Arc<dyn GpuPlatform>,
    pub media: Option<Arc<dyn MediaStore>>,
}

impl Uploader {
    /// Process jobs until `cancel` fires, then drain whatever is already
    /// buffered so no accepted job is left at the uploading stage.
    pub async fn run(self, mut rx: mpsc::Receiver<UploadJob>, cancel: CancellationToken) {
        tracing::info!("Upload worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Upload worker stopping");
                    break;
                }
                job = rx.recv() => match job {
                    Some(job) => self.process(job).await,
                    None => break,
                }
            }
        }

        rx.close();
        while let Some(job) = rx.recv().await {
            self.process(job).await;
        }
        tracing::info!("Upload worker stopped");
    }

    /// Upload one artifact and persist the outcome.
    pub async fn process(&self, job: UploadJob) {
        let update = match self.transfer(&job).await {
            Ok(url) => lifecycle::upload_succeeded(url, job.success_status),
            Err(message) => {
                tracing::error!(
                    table = job.table.table_name(),
                    project_id = job.project_id,
                    error = %message,
                    "Artifact upload failed"
                );
                lifecycle::upload_failed(message)
            }
        };

        if let Err(e) = JobStateRepo::apply_update(&self.pool, job.table, job.project_id, &update).await {
            tracing::error!(
                table = job.table.table_name(),
                project_id = job.project_id,
                error = %e,
                "Failed to record upload result"
            );
        }
    }

    async fn transfer(&self, job: &UploadJob) -> Result<String, String> {
        let bytes = match self.platform.fetch_output(&job.filename).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Err(format!("Output file missing: {}", job.filename)),
            Err(e) => return Err(format!("Failed to read output {}: {e}", job.filename)),
        };

        let media = self
            .media
            .as_ref()
            .ok_or_else(|| format!("Media upload failed: {}", MediaError::Disabled))?;

        let options = UploadOptions {
            resource_type: job.resource_type,
            folder: Some(job.folder.clone()),
            public_id: job.public_id.clone(),
            filename: job.filename.clone(),
        };
        let url = media
            .upload(bytes, &options)
            .await
            .map_err(|e| format!("Media upload failed: {e}"))?;

        tracing::info!(
            table = job.table.table_name(),
            project_id = job.project_id,
            url = %url,
            "Artifact uploaded"
        );
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(project_id: DbId) -> UploadJob {
        UploadJob {
            table: JobTable::VideoProjects,
            project_id,
            filename: format!("out_{project_id}.mp4"),
            resource_type: ResourceType::Video,
            folder: "creatorify_outputs".to_string(),
            public_id: Some(format!("project_{project_id}")),
            success_status: JobStatus::Finished,
        }
    }

    #[tokio::test]
    async fn full_queue_rejects_without_blocking() {
        let (queue, mut rx) = UploadQueue::new(1);
        assert!(queue.try_enqueue(job(1)));
        assert!(!queue.try_enqueue(job(2)));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.project_id, 1);
        assert!(queue.try_enqueue(job(3)));
    }

    #[tokio::test]
    async fn closed_queue_rejects() {
        let (queue, rx) = UploadQueue::new(4);
        drop(rx);
        assert!(!queue.try_enqueue(job(1)));
    }
}
