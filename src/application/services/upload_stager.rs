use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::Instrument;

use crate::application::ports::{ApiError, DocumentApi, Notification, Notifier};
use crate::domain::{Job, Permission, Role, StagedFile};

use super::JobStore;

pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 1;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub added: usize,
    pub duplicates: usize,
}

#[derive(Debug)]
pub struct FailedUpload {
    pub file_name: String,
    pub error: UploadError,
}

/// Result of one [`UploadStager::submit`] run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<Job>,
    pub failures: Vec<FailedUpload>,
}

impl BatchReport {
    pub fn submitted(&self) -> usize {
        self.jobs.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Collects files picked by the user and submits them as one batch.
///
/// Each file goes through `upload` then `process`; the resulting job is
/// appended to the [`JobStore`]. A file that fails is reported and skipped,
/// the rest of the batch carries on.
pub struct UploadStager {
    store: Arc<JobStore>,
    api: Arc<dyn DocumentApi>,
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
    staged: Vec<StagedFile>,
}

impl UploadStager {
    pub fn new(
        store: Arc<JobStore>,
        api: Arc<dyn DocumentApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            api,
            notifier,
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            staged: Vec::new(),
        }
    }

    /// Number of files uploaded at once. `1` submits strictly in order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Adds files to the batch, dropping any whose name and size match a file
    /// already staged.
    pub fn stage(&mut self, files: impl IntoIterator<Item = StagedFile>) -> StageOutcome {
        let mut outcome = StageOutcome::default();

        for file in files {
            if self.staged.iter().any(|s| s.is_duplicate_of(&file)) {
                tracing::debug!(
                    file_name = %file.name,
                    size_bytes = file.size_bytes,
                    "Skipping duplicate staged file"
                );
                self.notifier.notify(Notification::warning(format!(
                    "{} is already staged",
                    file.name
                )));
                outcome.duplicates += 1;
                continue;
            }
            self.staged.push(file);
            outcome.added += 1;
        }

        outcome
    }

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn unstage(&mut self, name: &str, size_bytes: u64) -> bool {
        let before = self.staged.len();
        self.staged
            .retain(|f| !(f.name == name && f.size_bytes == size_bytes));
        self.staged.len() != before
    }

    pub fn clear(&mut self) {
        self.staged.clear();
    }

    /// Uploads and processes the whole batch. The batch is empty afterwards no
    /// matter how many files failed.
    ///
    /// Fails up front, keeping the batch, when the session may not upload.
    pub async fn submit(&mut self) -> Result<BatchReport, UploadError> {
        let session = self.store.session();
        for permission in [Permission::UploadCreate, Permission::ProcessCreate] {
            if !session.can(permission) {
                return Err(UploadError::PermissionDenied {
                    role: session.role,
                    permission,
                });
            }
        }

        let batch = std::mem::take(&mut self.staged);
        if batch.is_empty() {
            return Ok(BatchReport::default());
        }
        tracing::info!(
            file_count = batch.len(),
            concurrency = self.concurrency,
            "Submitting staged batch"
        );

        let this = &*self;
        let outcomes: Vec<(String, Result<Job, UploadError>)> = stream::iter(batch)
            .map(|file| async move {
                let span = tracing::info_span!(
                    "upload",
                    file_name = %file.name,
                    size_bytes = file.size_bytes
                );
                let result = this.submit_one(&file).instrument(span).await;
                (file.name, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (file_name, result) in outcomes {
            match result {
                Ok(job) => report.jobs.push(job),
                Err(error) => report.failures.push(FailedUpload { file_name, error }),
            }
        }
        tracing::info!(
            submitted = report.submitted(),
            failed = report.failed(),
            "Staged batch finished"
        );

        Ok(report)
    }

    async fn submit_one(&self, file: &StagedFile) -> Result<Job, UploadError> {
        let result = self.upload_and_process(file).await;

        match &result {
            Ok(job) => {
                tracing::info!(job_id = %job.job_id, asset_id = %job.asset_id, "Processing started");
                self.notifier.notify(Notification::success(format!(
                    "{} uploaded, processing started",
                    file.name
                )));
            }
            Err(e) => {
                tracing::error!(error = %e, "Upload failed");
                self.notifier
                    .notify(Notification::error(format!("Failed to upload {}", file.name)));
            }
        }

        result
    }

    async fn upload_and_process(&self, file: &StagedFile) -> Result<Job, UploadError> {
        let asset_id = self.api.upload(file).await.map_err(UploadError::Upload)?;
        tracing::debug!(asset_id = %asset_id, "File uploaded");

        let job = self
            .api
            .process(asset_id)
            .await
            .map_err(UploadError::Process)?;

        if let Err(e) = self.store.append(job.clone()).await {
            tracing::warn!(job_id = %job.job_id, error = %e, "Job tracked but not persisted");
        }

        Ok(job)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload: {0}")]
    Upload(ApiError),
    #[error("process: {0}")]
    Process(ApiError),
    #[error("role {role} lacks the {permission} permission")]
    PermissionDenied { role: Role, permission: Permission },
}
