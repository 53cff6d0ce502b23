use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::application::ports::{ApiError, DocumentApi, JobCache, Notifier};
use crate::domain::{JobId, JobStatus, ResultArtifact, Session};

use super::{JobStore, PollPolicy, Poller, UploadStager};

/// Everything a signed-in dashboard needs besides the session itself.
#[derive(Clone)]
pub struct DashboardDeps {
    pub api: Arc<dyn DocumentApi>,
    pub cache: Arc<dyn JobCache>,
    pub notifier: Arc<dyn Notifier>,
    pub poll_policy: PollPolicy,
    pub upload_concurrency: usize,
}

/// Per-session composition of job store, poller and upload stager.
///
/// Opened on sign-in, closed on sign-out. Switching users means closing one
/// dashboard and opening another; the two never share a job list.
///
/// Dropping a dashboard without [`Dashboard::close`] still stops its poller.
pub struct Dashboard {
    store: Arc<JobStore>,
    poller: Arc<Poller>,
    stager: UploadStager,
    api: Arc<dyn DocumentApi>,
    shutdown: CancellationToken,
    _stop_on_drop: DropGuard,
    poller_task: JoinHandle<()>,
}

impl Dashboard {
    pub async fn open(session: Session, deps: DashboardDeps) -> Self {
        let store = Arc::new(JobStore::open(session, Arc::clone(&deps.cache)).await);
        let poller = Arc::new(Poller::new(
            Arc::clone(&store),
            Arc::clone(&deps.api),
            Arc::clone(&deps.notifier),
            deps.poll_policy,
        ));
        let stager = UploadStager::new(
            Arc::clone(&store),
            Arc::clone(&deps.api),
            Arc::clone(&deps.notifier),
        )
        .with_concurrency(deps.upload_concurrency);

        let shutdown = CancellationToken::new();
        let poller_task = Arc::clone(&poller).spawn(shutdown.clone());

        Self {
            store,
            poller,
            stager,
            api: deps.api,
            _stop_on_drop: shutdown.clone().drop_guard(),
            shutdown,
            poller_task,
        }
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn poller(&self) -> &Arc<Poller> {
        &self.poller
    }

    pub fn stager(&self) -> &UploadStager {
        &self.stager
    }

    pub fn stager_mut(&mut self) -> &mut UploadStager {
        &mut self.stager
    }

    /// Resolves once every tracked job is terminal.
    pub async fn wait_until_settled(&self, check_every: Duration) {
        loop {
            if self.store.active_job_ids().await.is_empty() {
                return;
            }
            tokio::time::sleep(check_every).await;
        }
    }

    /// Saves a result artifact of a completed job to `destination`, returning
    /// the number of bytes written.
    ///
    /// A job still active locally is refreshed from the server once first,
    /// since the poller may not have run since it was submitted.
    pub async fn download_artifact(
        &self,
        job_id: &JobId,
        artifact: ResultArtifact,
        destination: &Path,
    ) -> Result<u64, ArtifactError> {
        let job = self
            .store
            .get(job_id)
            .await
            .ok_or_else(|| ArtifactError::UnknownJob(job_id.clone()))?;

        let mut status = job.status;
        if !status.is_terminal() {
            let fresh = self
                .api
                .job_status(job_id)
                .await
                .map_err(ArtifactError::Api)?;
            status = fresh.status;
            if let Err(e) = self.store.apply_update(job_id, fresh).await {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to record refreshed job status");
            }
        }
        if status != JobStatus::Complete {
            return Err(ArtifactError::NotComplete {
                job_id: job_id.clone(),
                status,
            });
        }

        let bytes = self
            .api
            .fetch_artifact(job_id, artifact)
            .await
            .map_err(ArtifactError::Api)?;
        tokio::fs::write(destination, &bytes).await?;
        tracing::info!(
            job_id = %job_id,
            artifact = %artifact,
            path = %destination.display(),
            size_bytes = bytes.len(),
            "Artifact saved"
        );

        Ok(bytes.len() as u64)
    }

    /// Stops the poller and hands the session back for sign-out.
    pub async fn close(self) -> Session {
        self.shutdown.cancel();
        if let Err(e) = self.poller_task.await {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
        self.store.session().clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("job {0} is not tracked by this session")]
    UnknownJob(JobId),
    #[error("job {job_id} is {status}, results exist only for complete jobs")]
    NotComplete { job_id: JobId, status: JobStatus },
    #[error("artifact api: {0}")]
    Api(ApiError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
