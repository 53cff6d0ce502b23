use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{AssetId, Job, JobId, ResultArtifact, StagedFile};

use super::ApiError;

/// Upload, processing and job-status endpoints of the service.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// `POST /upload`.
    async fn upload(&self, file: &StagedFile) -> Result<AssetId, ApiError>;

    /// `POST /process/{asset_id}`, returning the freshly created job.
    async fn process(&self, asset_id: AssetId) -> Result<Job, ApiError>;

    /// `GET /jobs/{job_id}/status`.
    async fn job_status(&self, job_id: &JobId) -> Result<Job, ApiError>;

    async fn fetch_artifact(
        &self,
        job_id: &JobId,
        artifact: ResultArtifact,
    ) -> Result<Bytes, ApiError>;
}
