use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::{JobCache, JobCacheError};
use crate::domain::JobCacheKey;

/// Process-local job cache. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryJobCache {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryJobCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw contents under `key`, bypassing any serialization.
    pub async fn insert_raw(&self, key: &JobCacheKey, contents: impl Into<String>) {
        self.entries
            .lock()
            .await
            .insert(key.as_str().to_string(), contents.into());
    }

    pub async fn get_raw(&self, key: &JobCacheKey) -> Option<String> {
        self.entries.lock().await.get(key.as_str()).cloned()
    }

    pub async fn contains(&self, key: &JobCacheKey) -> bool {
        self.entries.lock().await.contains_key(key.as_str())
    }
}

#[async_trait]
impl JobCache for InMemoryJobCache {
    async fn load(&self, key: &JobCacheKey) -> Result<Option<String>, JobCacheError> {
        Ok(self.get_raw(key).await)
    }

    async fn save(&self, key: &JobCacheKey, contents: &str) -> Result<(), JobCacheError> {
        self.insert_raw(key, contents).await;
        Ok(())
    }

    async fn remove(&self, key: &JobCacheKey) -> Result<(), JobCacheError> {
        self.entries.lock().await.remove(key.as_str());
        Ok(())
    }
}
