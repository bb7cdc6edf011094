//! Uploaded images on the local filesystem.
//!
//! Paths handed to this module are the relative `film-images/<digest>.<ext>`
//! values stored in `films.image`; they are served back under `/media/`.

use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// URL prefix the media root is mounted at.
pub const MEDIA_URL: &str = "/media";

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: Arc<PathBuf>,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to `relative`, creating parent directories.
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await
    }

    /// Remove a stored file. Failures are logged, never returned.
    pub async fn delete(&self, relative: &str) {
        let result = match self.resolve(relative) {
            Ok(path) => tokio::fs::remove_file(path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => tracing::debug!(path = relative, "Removed media file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = relative, error = %e, "Failed to remove media file"),
        }
    }

    /// Await `commit` for a freshly saved file and remove the file again if
    /// the commit fails, so a rejected insert or update leaves nothing behind.
    pub async fn discard_on_error<T, E>(
        &self,
        relative: &str,
        commit: impl Future<Output = Result<T, E>>,
    ) -> Result<T, E> {
        let result = commit.await;
        if result.is_err() {
            self.delete(relative).await;
        }
        result
    }

    /// Join a stored relative path onto the root, refusing anything that
    /// could escape it.
    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let candidate = Path::new(relative);
        let safe = candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing media path '{relative}'"),
            ));
        }
        Ok(self.root.join(candidate))
    }
}
