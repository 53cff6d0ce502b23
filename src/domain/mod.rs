mod admin;
mod artifact;
mod job;
mod job_cache_key;
mod job_id;
mod job_status;
mod role;
mod session;
mod staged_file;

pub use admin::{AnalyticsSummary, NewUser, UsagePoint, UsageSeries, UserAccount};
pub use artifact::ResultArtifact;
pub use job::Job;
pub use job_cache_key::JobCacheKey;
pub use job_id::{AssetId, JobId};
pub use job_status::JobStatus;
pub use role::{Permission, Role};
pub use session::Session;
pub use staged_file::StagedFile;
