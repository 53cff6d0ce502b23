use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::application::ports::{JobCache, JobCacheError};
use crate::domain::JobCacheKey;

/// Job cache backed by one JSON file per key under a directory.
///
/// Keys are escaped into file names so arbitrary usernames cannot escape the
/// directory or collide with one another.
pub struct FileJobCache {
    directory: PathBuf,
}

impl FileJobCache {
    pub fn new(directory: PathBuf) -> Result<Self, JobCacheError> {
        std::fs::create_dir_all(&directory).map_err(JobCacheError::Io)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, key: &JobCacheKey) -> PathBuf {
        self.directory.join(format!("{}.json", escape_key(key.as_str())))
    }
}

fn escape_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            escaped.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(escaped, "%{:02X}", byte);
            }
        }
    }
    escaped
}

#[async_trait]
impl JobCache for FileJobCache {
    async fn load(&self, key: &JobCacheKey) -> Result<Option<String>, JobCacheError> {
        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(JobCacheError::Io(e)),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| JobCacheError::Corrupt(format!("{}: {}", key, e)))
    }

    async fn save(&self, key: &JobCacheKey, contents: &str) -> Result<(), JobCacheError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| JobCacheError::WriteFailed(format!("{}: {}", tmp.display(), e)))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(JobCacheError::WriteFailed(format!(
                "{}: {}",
                path.display(),
                e
            )));
        }
        Ok(())
    }

    async fn remove(&self, key: &JobCacheKey) -> Result<(), JobCacheError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JobCacheError::Io(e)),
        }
    }
}
