mod admin_service;
mod auth_service;
mod dashboard;
mod job_store;
mod poller;
mod upload_stager;

pub use admin_service::{AdminService, AdminServiceError, DEFAULT_USAGE_DAYS};
pub use auth_service::{AuthService, AuthServiceError};
pub use dashboard::{ArtifactError, Dashboard, DashboardDeps};
pub use job_store::{JobStore, JobStoreError};
pub use poller::{
    DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_CONSECUTIVE_FAILURES,
    DEFAULT_POLL_INTERVAL, PollPolicy, Poller, TickReport,
};
pub use upload_stager::{
    BatchReport, DEFAULT_UPLOAD_CONCURRENCY, FailedUpload, StageOutcome, UploadError,
    UploadStager,
};
