use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{JobCache, JobCacheError};
use crate::domain::{Job, JobCacheKey, JobId, Session};

/// In-memory job list of one signed-in user, mirrored to the job cache.
///
/// Every mutation rewrites the whole list under `active_jobs_<username>`. The
/// lock is held across the write so the cache always sees mutations in order.
pub struct JobStore {
    session: Session,
    key: JobCacheKey,
    cache: Arc<dyn JobCache>,
    jobs: Mutex<Vec<Job>>,
}

impl JobStore {
    /// Rehydrates the list for `session`. Never fails: a missing entry, a read
    /// error or a corrupt entry all start an empty list.
    pub async fn open(session: Session, cache: Arc<dyn JobCache>) -> Self {
        let key = JobCacheKey::for_user(&session.username);
        let jobs = Self::rehydrate(&key, cache.as_ref()).await;
        tracing::debug!(
            username = %session.username,
            job_count = jobs.len(),
            "Job store opened"
        );

        Self {
            session,
            key,
            cache,
            jobs: Mutex::new(jobs),
        }
    }

    async fn rehydrate(key: &JobCacheKey, cache: &dyn JobCache) -> Vec<Job> {
        let raw = match cache.load(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(JobCacheError::Corrupt(reason)) => {
                Self::discard(key, cache, &reason).await;
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Failed to read cached jobs");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Job>>(&raw) {
            Ok(jobs) => jobs,
            Err(e) => {
                Self::discard(key, cache, &e.to_string()).await;
                Vec::new()
            }
        }
    }

    async fn discard(key: &JobCacheKey, cache: &dyn JobCache, reason: &str) {
        tracing::warn!(error = %reason, key = %key, "Discarding unparsable cached jobs");
        if let Err(e) = cache.remove(key).await {
            tracing::warn!(error = %e, key = %key, "Failed to clear corrupt job cache");
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache_key(&self) -> &JobCacheKey {
        &self.key
    }

    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().await.clone()
    }

    pub async fn get(&self, job_id: &JobId) -> Option<Job> {
        self.jobs
            .lock()
            .await
            .iter()
            .find(|j| &j.job_id == job_id)
            .cloned()
    }

    /// Ids of jobs still waiting on the server, in list order.
    pub async fn active_job_ids(&self) -> Vec<JobId> {
        self.jobs
            .lock()
            .await
            .iter()
            .filter(|j| !j.is_terminal())
            .map(|j| j.job_id.clone())
            .collect()
    }

    /// Adds a job. A job with the same id replaces the existing entry.
    pub async fn append(&self, job: Job) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.lock().await;
        match jobs.iter_mut().find(|j| j.job_id == job.job_id) {
            Some(existing) => *existing = job,
            None => jobs.push(job),
        }
        self.persist(&jobs).await
    }

    /// Merges a status response into the job it was fetched for.
    ///
    /// Returns whether the stored record changed. Responses for terminal or
    /// unknown jobs are ignored.
    pub async fn apply_update(&self, job_id: &JobId, update: Job) -> Result<bool, JobStoreError> {
        if &update.job_id != job_id {
            return Err(JobStoreError::MismatchedJob {
                expected: job_id.clone(),
                actual: update.job_id,
            });
        }

        let mut jobs = self.jobs.lock().await;
        let changed = match jobs.iter_mut().find(|j| &j.job_id == job_id) {
            Some(existing) => existing.merge(update),
            None => false,
        };
        if changed {
            self.persist(&jobs).await?;
        }
        Ok(changed)
    }

    /// Moves a non-terminal job to `stalled`.
    pub async fn mark_stalled(
        &self,
        job_id: &JobId,
        reason: impl Into<String>,
    ) -> Result<bool, JobStoreError> {
        let mut jobs = self.jobs.lock().await;
        let changed = match jobs.iter_mut().find(|j| &j.job_id == job_id) {
            Some(existing) => existing.stall(reason),
            None => false,
        };
        if changed {
            self.persist(&jobs).await?;
        }
        Ok(changed)
    }

    async fn persist(&self, jobs: &[Job]) -> Result<(), JobStoreError> {
        let contents = serde_json::to_string(jobs)
            .map_err(|e| JobStoreError::Serialization(e.to_string()))?;
        self.cache
            .save(&self.key, &contents)
            .await
            .map_err(JobStoreError::Cache)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("job cache: {0}")]
    Cache(JobCacheError),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("status response for {actual} does not match polled job {expected}")]
    MismatchedJob { expected: JobId, actual: JobId },
}
