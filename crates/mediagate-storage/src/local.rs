use crate::fetcher::RemoteFetcher;
use crate::keys::ObjectKey;
use crate::token::{PathCodec, PresignedToken};
use crate::traits::{FetchedObject, StorageDriver, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Filesystem storage (local disk or an NFS mount)
#[derive(Clone)]
pub struct FilesystemStorage {
    base_path: PathBuf,
    codec: Arc<PathCodec>,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl FilesystemStorage {
    /// Create a new FilesystemStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/mnt/nfs/media")
    /// * `codec` - Token codec; also provides the URL clients PUT uploads to
    /// * `fetcher` - HTTP client used by remote-URL stores
    ///
    /// The root is created lazily by the first write.
    pub fn new(
        base_path: impl Into<PathBuf>,
        codec: Arc<PathCodec>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        FilesystemStorage {
            base_path: base_path.into(),
            codec,
            fetcher,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert an object key to a filesystem path under the root.
    fn key_to_path(&self, key: &ObjectKey) -> StorageResult<PathBuf> {
        let key = key.as_str();
        let traverses = key.split('/').any(|c| c == ".." || c == ".");
        if traverses || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    /// Write `content` to `path`, creating parent directories as needed.
    ///
    /// I/O errors are logged and reported as `WriteFailed` naming the path only.
    pub async fn store_raw_bytes(&self, content: &[u8], path: &Path) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let write_failed = |stage: &str, e: std::io::Error| {
            tracing::error!(
                path = %path.display(),
                error = %e,
                stage,
                "An error occurred while writing the file"
            );
            StorageError::WriteFailed(path.display().to_string())
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed("create_dir", e))?;
        }

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| write_failed("create", e))?;
        file.write_all(content)
            .await
            .map_err(|e| write_failed("write", e))?;
        file.sync_all()
            .await
            .map_err(|e| write_failed("sync", e))?;

        tracing::info!(
            path = %path.display(),
            size_bytes = content.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File written successfully"
        );

        Ok(())
    }
}

#[async_trait]
impl StorageDriver for FilesystemStorage {
    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Nfs
    }

    fn codec(&self) -> &PathCodec {
        &self.codec
    }

    fn fetcher(&self) -> &dyn RemoteFetcher {
        self.fetcher.as_ref()
    }

    async fn store_at_key(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.store_raw_bytes(&data, &path).await
    }

    async fn fetch(&self, key: &ObjectKey) -> StorageResult<FetchedObject> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        Ok(FetchedObject::LocalPath {
            path,
            filename: key.filename().to_string(),
        })
    }

    async fn upload_url(&self, key: &ObjectKey, token: &PresignedToken) -> StorageResult<String> {
        self.key_to_path(key)?;
        Ok(self.codec.media_url(token))
    }
}
