use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::application::ports::{ApiError, DocumentApi};
use crate::domain::{AssetId, Job, JobId, ResultArtifact, StagedFile};

use super::api_client::{ApiClient, decode};

#[derive(Deserialize)]
pub struct UploadResponse {
    pub asset_id: AssetId,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct HttpDocumentClient {
    client: ApiClient,
}

impl HttpDocumentClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentApi for HttpDocumentClient {
    #[tracing::instrument(skip(self, file), fields(file_name = %file.name, size_bytes = file.size_bytes))]
    async fn upload(&self, file: &StagedFile) -> Result<AssetId, ApiError> {
        let data = tokio::fs::read(&file.path).await?;
        let part = Part::bytes(data)
            .file_name(file.name.clone())
            .mime_str(file.mime_type())
            .map_err(|e| ApiError::Transport(format!("invalid mime type: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .send(Method::POST, "/upload", |r| r.multipart(form))
            .await?;
        let body: UploadResponse = decode(response).await?;
        if let Some(message) = &body.message {
            tracing::debug!(asset_id = %body.asset_id, message = %message, "Upload accepted");
        }

        Ok(body.asset_id)
    }

    async fn process(&self, asset_id: AssetId) -> Result<Job, ApiError> {
        let response = self
            .client
            .send(Method::POST, &format!("/process/{}", asset_id), |r| r)
            .await?;
        decode(response).await
    }

    async fn job_status(&self, job_id: &JobId) -> Result<Job, ApiError> {
        let path = self.client.route(&["jobs", job_id.as_str(), "status"])?;
        self.client.get_json(&path).await
    }

    async fn fetch_artifact(
        &self,
        job_id: &JobId,
        artifact: ResultArtifact,
    ) -> Result<Bytes, ApiError> {
        let path = self
            .client
            .route(&["jobs", job_id.as_str(), artifact.file_name()])?;
        let response = self.client.send(Method::GET, &path, |r| r).await?;
        response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}
