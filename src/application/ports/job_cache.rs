use std::io;

use async_trait::async_trait;

use crate::domain::JobCacheKey;

/// Local key/value storage for serialized job lists.
#[async_trait]
pub trait JobCache: Send + Sync {
    async fn load(&self, key: &JobCacheKey) -> Result<Option<String>, JobCacheError>;

    async fn save(&self, key: &JobCacheKey, contents: &str) -> Result<(), JobCacheError>;

    /// Removing a key that does not exist is not an error.
    async fn remove(&self, key: &JobCacheKey) -> Result<(), JobCacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobCacheError {
    #[error("read failed: {0}")]
    ReadFailed(String),
    /// The entry exists but its bytes cannot be decoded.
    #[error("corrupt entry: {0}")]
    Corrupt(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
