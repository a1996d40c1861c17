//! Filesystem writes for generated projects

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::core::{Error, Result};

/// Absolute form of `path`, with `.` and `..` resolved when it exists
pub fn resolve_path(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Where generated files land
#[async_trait]
pub trait OutputService: Send + Sync {
    async fn ensure_directory(&self, path: &Path) -> Result<()>;

    /// Replace the whole file, creating parent directories first
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    /// File contents, or `None` when it does not exist
    async fn read_file(&self, path: &Path) -> Result<Option<String>>;
}

/// Output service that writes to the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn ensure_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| Error::filesystem(path, e))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_directory(parent).await?;
        }

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| Error::filesystem(path, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::filesystem(path, e))?;
        file.flush().await.map_err(|e| Error::filesystem(path, e))?;
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::filesystem(path, e)),
        }
    }
}
