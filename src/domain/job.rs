use serde::{Deserialize, Serialize};

use super::{AssetId, JobId, JobStatus};

/// One submitted document's processing lifecycle as tracked by the client.
///
/// The same shape is returned by `POST /process/{asset_id}` and
/// `GET /jobs/{job_id}/status`, and is what gets persisted in the job cache.
/// Extra fields sent by the server (timestamps, database ids) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub asset_id: AssetId,
    pub file_name: String,
    pub status: JobStatus,
    #[serde(default)]
    pub message: String,
}

impl Job {
    pub fn new(job_id: JobId, asset_id: AssetId, file_name: impl Into<String>) -> Self {
        Self {
            job_id,
            asset_id,
            file_name: file_name.into(),
            status: JobStatus::Pending,
            message: String::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Replaces this record with a fresher one from the server.
    ///
    /// Returns `false` and leaves the record alone when it is already terminal
    /// or when nothing changed.
    pub fn merge(&mut self, update: Job) -> bool {
        if self.is_terminal() || *self == update {
            return false;
        }
        *self = update;
        true
    }

    pub fn stall(&mut self, reason: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Stalled;
        self.message = reason.into();
        true
    }
}
