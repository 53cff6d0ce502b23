use std::fmt;

const KEY_PREFIX: &str = "active_jobs_";

/// Storage key of one user's job list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobCacheKey(String);

impl JobCacheKey {
    pub fn for_user(username: &str) -> Self {
        Self(format!("{}{}", KEY_PREFIX, username))
    }

    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
