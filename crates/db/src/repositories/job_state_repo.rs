//! Lifecycle updates shared by every project table.
//!
//! Status-check handlers and the background uploader go through this
//! repository rather than the per-table ones, so the update rules live in
//! one place. Rows already in a terminal status are never modified.

use creatorify_core::lifecycle::{
    JobSnapshot, StatusUpdate, PROGRESS_UPLOADING, UPLOAD_STALE_AFTER_SECS,
};
use creatorify_core::status::JobStatus;
use creatorify_core::types::DbId;
use sqlx::PgPool;

use crate::models::job_state::{JobStateRow, JobTable};

/// `status NOT IN (...)` guard protecting terminal rows.
const NOT_TERMINAL: &str =
    "status NOT IN ('finished', 'completed', 'failed', 'failed_to_spawn')";

pub struct JobStateRepo;

impl JobStateRepo {
    /// Load the lifecycle columns of a row.
    ///
    /// Returns `Ok(None)` if the row does not exist, and a decode error if
    /// the stored status is not a known value.
    pub async fn snapshot(
        pool: &PgPool,
        table: JobTable,
        id: DbId,
    ) -> Result<Option<JobSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT status, progress, call_id, {out} AS output_url, error_message, updated_at \
             FROM {table} WHERE id = $1",
            out = table.output_column(),
            table = table.table_name(),
        );
        let row = sqlx::query_as::<_, JobStateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.map(JobSnapshot::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))
    }

    /// Store the remote call handle returned by a spawn.
    pub async fn set_call_id(
        pool: &PgPool,
        table: JobTable,
        id: DbId,
        call_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET call_id = $2, updated_at = NOW() WHERE id = $1",
            table.table_name()
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(call_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the status only, e.g. `failed_to_spawn` after a spawn error.
    pub async fn set_status(
        pool: &PgPool,
        table: JobTable,
        id: DbId,
        status: JobStatus,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET status = $2, updated_at = NOW() WHERE id = $1 AND {NOT_TERMINAL}",
            table.table_name()
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist a lifecycle update. `None` fields keep their stored value.
    ///
    /// Returns `false` when the row is missing or already terminal.
    pub async fn apply_update(
        pool: &PgPool,
        table: JobTable,
        id: DbId,
        update: &StatusUpdate,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {table} SET \
                status = $2, \
                progress = COALESCE($3, progress), \
                {out} = COALESCE($4, {out}), \
                error_message = COALESCE($5, error_message), \
                updated_at = NOW() \
             WHERE id = $1 AND {NOT_TERMINAL}",
            table = table.table_name(),
            out = table.output_column(),
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(update.status.as_str())
            .bind(update.progress)
            .bind(&update.output_url)
            .bind(&update.error_message)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a running row into the uploading phase.
    ///
    /// Only one caller can win: concurrent status checks that all observe
    /// the finished call race on this update, and the losers get `false`
    /// and must not schedule a second upload. A row whose upload has been
    /// in flight for [`UPLOAD_STALE_AFTER_SECS`] can be claimed again.
    pub async fn claim_upload(
        pool: &PgPool,
        table: JobTable,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET status = $2, progress = $3, updated_at = NOW() \
             WHERE id = $1 AND status IN ('queued', 'processing') \
               AND (progress < $3 OR updated_at < NOW() - make_interval(secs => $4))",
            table.table_name()
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(JobStatus::Processing.as_str())
            .bind(PROGRESS_UPLOADING)
            .bind(UPLOAD_STALE_AFTER_SECS as f64)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
