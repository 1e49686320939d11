//! Filesystem object store for local runs.

use super::check_object_path;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use snowday_error::{SnowdayResult, StorageError, StorageErrorKind};
use snowday_interface::ObjectStore;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

fn io_error(path: &Path, err: std::io::Error) -> StorageError {
    let message = format!("{}: {}", path.display(), err);
    match err.kind() {
        std::io::ErrorKind::PermissionDenied => StorageError::new(StorageErrorKind::PermissionDenied(message)),
        _ => StorageError::new(StorageErrorKind::Io(message)),
    }
}

fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Writes objects below a root directory and serves them from a base URL.
///
/// Writing identical bytes to an existing path leaves the file untouched.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    /// Store under `root`; `base_url` defaults to a `file://` URL of the root.
    pub fn new(root: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        let root = root.into();
        let base_url = base_url.unwrap_or_else(|| format!("file://{}", root.display()));
        Self { root, base_url }
    }

    /// Directory objects are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    #[instrument(skip(self, bytes, _content_type), fields(bytes = bytes.len()))]
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> SnowdayResult<String> {
        check_object_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let new_digest = digest(&bytes);
        let unchanged = match tokio::fs::read(&target).await {
            Ok(existing) => digest(&existing) == new_digest,
            Err(_) => false,
        };
        if unchanged {
            debug!(digest = %new_digest, "Object unchanged, skipping write");
        } else {
            tokio::fs::write(&target, &bytes)
                .await
                .map_err(|e| io_error(&target, e))?;
            debug!(digest = %new_digest, path = %target.display(), "Wrote object");
        }

        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), path))
    }
}
