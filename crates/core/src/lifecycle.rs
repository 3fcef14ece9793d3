//! Job lifecycle state machine.
//!
//! A status check loads the stored row, asks [`poll_target`] whether the
//! remote call handle still needs to be polled, feeds the poll result into
//! [`advance`], and persists whatever [`StatusUpdate`] comes back. Completed
//! calls do not finish the job directly: they request a best-effort upload
//! of the produced artifact, which later resolves through
//! [`upload_succeeded`], [`upload_failed`] or [`upload_unavailable`].
//!
//! Uploads are handed to an in-process worker, so a restart can lose one.
//! A row left at the uploading stage for longer than
//! [`UPLOAD_STALE_AFTER_SECS`] is polled again and may be re-claimed.

use crate::status::JobStatus;
use crate::types::Timestamp;

/// Progress reported once the remote call is known to be running.
pub const PROGRESS_RUNNING: i32 = 10;

/// Progress reported while the artifact is being pushed to the media store.
pub const PROGRESS_UPLOADING: i32 = 95;

/// Progress of a finished job.
pub const PROGRESS_DONE: i32 = 100;

/// Seconds after which an upload that never reported back is presumed lost.
pub const UPLOAD_STALE_AFTER_SECS: i64 = 15 * 60;

/// Result of a non-blocking poll on a remote call handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call has not finished yet.
    Pending,
    /// The call returned. Carries the output location (a filename in the
    /// platform's output volume), if the function produced one.
    Succeeded(Option<String>),
    /// The call raised. Carries the platform's error text.
    Failed(String),
}

/// The lifecycle-relevant columns of a project row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub progress: i32,
    pub call_id: Option<String>,
    pub output_url: Option<String>,
    pub error_message: Option<String>,
    pub updated_at: Timestamp,
}

impl JobSnapshot {
    /// The row is at the uploading stage.
    pub fn upload_in_flight(&self) -> bool {
        self.status == JobStatus::Processing && self.progress >= PROGRESS_UPLOADING
    }

    /// The row has sat at the uploading stage for too long as of `now`.
    pub fn upload_stalled(&self, now: Timestamp) -> bool {
        self.upload_in_flight()
            && now - self.updated_at >= chrono::TimeDelta::seconds(UPLOAD_STALE_AFTER_SECS)
    }
}

/// A change to persist on a project row. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub progress: Option<i32>,
    pub output_url: Option<String>,
    pub error_message: Option<String>,
}

impl StatusUpdate {
    fn status(status: JobStatus) -> Self {
        Self {
            status,
            progress: None,
            output_url: None,
            error_message: None,
        }
    }

    fn with_progress(mut self, progress: i32) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Apply the update to an in-memory snapshot, mirroring what the
    /// repository does to the row.
    pub fn apply(&self, snapshot: &mut JobSnapshot) {
        snapshot.status = self.status;
        if let Some(progress) = self.progress {
            snapshot.progress = progress;
        }
        if let Some(url) = &self.output_url {
            snapshot.output_url = Some(url.clone());
        }
        if let Some(message) = &self.error_message {
            snapshot.error_message = Some(message.clone());
        }
    }
}

/// What a status check should do after polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to persist.
    Unchanged,
    /// Persist the update and return.
    Update(StatusUpdate),
    /// Persist the update, then schedule an upload of `output`.
    Upload { output: String, update: StatusUpdate },
}

/// Return the call handle to poll, or `None` when the stored row should be
/// returned as-is: terminal rows, rows that never got a handle, and rows
/// whose artifact upload is in flight and not yet stalled.
pub fn poll_target(snapshot: &JobSnapshot, now: Timestamp) -> Option<&str> {
    if snapshot.status.is_terminal() {
        return None;
    }
    if snapshot.upload_in_flight() && !snapshot.upload_stalled(now) {
        return None;
    }
    snapshot.call_id.as_deref().filter(|id| !id.is_empty())
}

/// Decide the row update for a poll outcome.
pub fn advance(snapshot: &JobSnapshot, outcome: CallOutcome) -> Transition {
    match outcome {
        CallOutcome::Pending => {
            if snapshot.status == JobStatus::Queued {
                Transition::Update(
                    StatusUpdate::status(JobStatus::Processing).with_progress(PROGRESS_RUNNING),
                )
            } else {
                Transition::Unchanged
            }
        }
        CallOutcome::Succeeded(Some(output)) if !output.trim().is_empty() => Transition::Upload {
            output,
            update: StatusUpdate::status(JobStatus::Processing).with_progress(PROGRESS_UPLOADING),
        },
        CallOutcome::Succeeded(_) => Transition::Update(StatusUpdate {
            error_message: Some("Job finished but no output was returned".to_string()),
            ..StatusUpdate::status(JobStatus::Failed)
        }),
        CallOutcome::Failed(message) => Transition::Update(StatusUpdate {
            error_message: Some(format!("Remote job execution failed: {message}")),
            ..StatusUpdate::status(JobStatus::Failed)
        }),
    }
}

/// The artifact reached the media store.
pub fn upload_succeeded(url: String, success: JobStatus) -> StatusUpdate {
    StatusUpdate {
        output_url: Some(url),
        ..StatusUpdate::status(success).with_progress(PROGRESS_DONE)
    }
}

/// The artifact could not be fetched or stored.
pub fn upload_failed(message: String) -> StatusUpdate {
    StatusUpdate {
        error_message: Some(message),
        ..StatusUpdate::status(JobStatus::Failed)
    }
}

/// The upload step could not be scheduled at all. The generation itself
/// succeeded, so the job is finished without an output URL.
pub fn upload_unavailable(success: JobStatus) -> StatusUpdate {
    StatusUpdate::status(success).with_progress(PROGRESS_DONE)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use chrono::{TimeDelta, Utc};

    use super::*;

    fn snapshot(status: JobStatus, progress: i32) -> JobSnapshot {
        JobSnapshot {
            status,
            progress,
            call_id: Some("fc-123".to_string()),
            output_url: None,
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn terminal_rows_are_not_polled() {
        for status in [
            JobStatus::Finished,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::FailedToSpawn,
        ] {
            assert_eq!(poll_target(&snapshot(status, 0), Utc::now()), None);
        }
    }

    #[test]
    fn rows_without_handle_are_not_polled() {
        let mut row = snapshot(JobStatus::Queued, 0);
        row.call_id = None;
        assert_eq!(poll_target(&row, Utc::now()), None);
        row.call_id = Some(String::new());
        assert_eq!(poll_target(&row, Utc::now()), None);
    }

    #[test]
    fn upload_in_flight_is_not_polled() {
        assert_eq!(poll_target(&snapshot(JobStatus::Processing, 95), Utc::now()), None);
    }

    #[test]
    fn stalled_upload_is_polled_again() {
        let mut row = snapshot(JobStatus::Processing, 95);
        let now = Utc::now();

        row.updated_at = now - TimeDelta::seconds(UPLOAD_STALE_AFTER_SECS - 1);
        assert!(!row.upload_stalled(now));
        assert_eq!(poll_target(&row, now), None);

        row.updated_at = now - TimeDelta::seconds(UPLOAD_STALE_AFTER_SECS);
        assert!(row.upload_stalled(now));
        assert_eq!(poll_target(&row, now), Some("fc-123"));
    }

    #[test]
    fn stalled_upload_of_finished_call_requests_upload_again() {
        let mut row = snapshot(JobStatus::Processing, 95);
        row.updated_at = Utc::now() - TimeDelta::hours(1);
        let transition = advance(&row, CallOutcome::Succeeded(Some("abc.mp4".into())));
        assert_matches!(transition, Transition::Upload { .. });
        assert_eq!(advance(&row, CallOutcome::Pending), Transition::Unchanged);
    }

    #[test]
    fn running_rows_are_polled() {
        let now = Utc::now();
        assert_eq!(poll_target(&snapshot(JobStatus::Queued, 0), now), Some("fc-123"));
        assert_eq!(poll_target(&snapshot(JobStatus::Processing, 10), now), Some("fc-123"));
    }

    #[test]
    fn pending_call_moves_queued_to_processing() {
        let transition = advance(&snapshot(JobStatus::Queued, 0), CallOutcome::Pending);
        assert_matches!(
            transition,
            Transition::Update(StatusUpdate { status: JobStatus::Processing, progress: Some(10), .. })
        );
    }

    #[test]
    fn pending_call_leaves_processing_alone() {
        let transition = advance(&snapshot(JobStatus::Processing, 10), CallOutcome::Pending);
        assert_eq!(transition, Transition::Unchanged);
    }

    #[test]
    fn successful_call_requests_upload() {
        let transition = advance(
            &snapshot(JobStatus::Processing, 10),
            CallOutcome::Succeeded(Some("abc.mp4".into())),
        );
        match transition {
            Transition::Upload { output, update } => {
                assert_eq!(output, "abc.mp4");
                assert_eq!(update.status, JobStatus::Processing);
                assert_eq!(update.progress, Some(PROGRESS_UPLOADING));
            }
            other => panic!("expected upload, got {other:?}"),
        }
    }

    #[test]
    fn successful_call_without_output_fails() {
        for output in [None, Some(String::new()), Some("  ".to_string())] {
            let transition = advance(
                &snapshot(JobStatus::Processing, 10),
                CallOutcome::Succeeded(output),
            );
            assert_matches!(
                transition,
                Transition::Update(StatusUpdate { status: JobStatus::Failed, error_message: Some(_), .. })
            );
        }
    }

    #[test]
    fn failed_call_records_message_and_keeps_progress() {
        let transition = advance(
            &snapshot(JobStatus::Processing, 10),
            CallOutcome::Failed("CUDA out of memory".into()),
        );
        let Transition::Update(update) = transition else {
            panic!("expected update");
        };
        assert_eq!(update.status, JobStatus::Failed);
        assert_eq!(update.progress, None);
        assert_eq!(
            update.error_message.as_deref(),
            Some("Remote job execution failed: CUDA out of memory")
        );
    }

    #[test]
    fn upload_outcomes() {
        let done = upload_succeeded("https://cdn/x.mp4".into(), JobStatus::Finished);
        assert_eq!(done.status, JobStatus::Finished);
        assert_eq!(done.progress, Some(100));
        assert_eq!(done.output_url.as_deref(), Some("https://cdn/x.mp4"));

        let fallback = upload_unavailable(JobStatus::Completed);
        assert_eq!(fallback.status, JobStatus::Completed);
        assert_eq!(fallback.progress, Some(100));
        assert_eq!(fallback.output_url, None);

        let failed = upload_failed("Media upload failed: boom".into());
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.progress, None);
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut row = snapshot(JobStatus::Processing, 10);
        row.output_url = Some("old".into());
        upload_failed("nope".into()).apply(&mut row);
        assert_eq!(row.status, JobStatus::Failed);
        assert_eq!(row.progress, 10);
        assert_eq!(row.output_url.as_deref(), Some("old"));
        assert_eq!(row.error_message.as_deref(), Some("nope"));
    }
}
