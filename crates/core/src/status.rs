//! Job status values stored in the `status` column of every project table.
//!
//! The set is flat: there is no transition table, only the distinction
//! between terminal and non-terminal values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    /// Success marker used by video projects.
    Finished,
    /// Success marker used by audio projects.
    Completed,
    Failed,
    FailedToSpawn,
}

impl JobStatus {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Finished => "finished",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::FailedToSpawn => "failed_to_spawn",
        }
    }

    /// Terminal rows are never polled again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Finished
                | JobStatus::Completed
                | JobStatus::Failed
                | JobStatus::FailedToSpawn
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            // Rows written by older clients used `pending` for queued work.
            "pending" => Ok(JobStatus::Queued),
            "processing" => Ok(JobStatus::Processing),
            "finished" => Ok(JobStatus::Finished),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "failed_to_spawn" => Ok(JobStatus::FailedToSpawn),
            other => Err(CoreError::Validation(format!(
                "Unknown job status '{other}'"
            ))),
        }
    }
}
