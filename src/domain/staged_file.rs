use std::io;
use std::path::{Path, PathBuf};

/// A file picked for upload but not yet submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, size_bytes: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            path: path.into(),
        }
    }

    /// Builds a staged file from a path on disk, taking name and size from the
    /// filesystem.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("file name is not valid UTF-8: {}", path.display()),
                )
            })?
            .to_string();

        Ok(Self::new(name, metadata.len(), path))
    }

    /// Two staged files with the same name and size are treated as the same
    /// document.
    pub fn is_duplicate_of(&self, other: &StagedFile) -> bool {
        self.name == other.name && self.size_bytes == other.size_bytes
    }

    pub fn mime_type(&self) -> &'static str {
        let extension = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Some("pptx") => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("tif") | Some("tiff") => "image/tiff",
            Some("txt") => "text/plain",
            Some("csv") => "text/csv",
            _ => "application/octet-stream",
        }
    }
}
