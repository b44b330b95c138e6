//! Backend registry
//!
//! Maps a backend tag to the function constructing its driver. The table is
//! assembled at startup, before the server accepts requests, and only read
//! afterwards. The configured tag is resolved once; every request goes to the
//! driver it produced.

use crate::fetcher::RemoteFetcher;
#[cfg(feature = "storage-local")]
use crate::local::FilesystemStorage;
#[cfg(feature = "storage-s3")]
use crate::s3::S3Storage;
use crate::token::PathCodec;
use crate::traits::{StorageDriver, StorageError, StorageResult};
#[cfg(any(feature = "storage-local", feature = "storage-s3"))]
use crate::StorageBackend;
use mediagate_core::StorageConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a driver may be built from.
#[derive(Clone)]
pub struct DriverContext {
    pub config: StorageConfig,
    pub codec: Arc<PathCodec>,
    pub fetcher: Arc<dyn RemoteFetcher>,
}

/// Constructor registered for a backend tag.
pub type DriverFactory =
    Arc<dyn Fn(&DriverContext) -> StorageResult<Arc<dyn StorageDriver>> + Send + Sync>;

#[derive(Default, Clone)]
pub struct BackendRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl BackendRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every driver compiled into this build.
    pub fn builtin() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "storage-local")]
        registry
            .register(StorageBackend::Nfs.tag(), Arc::new(build_filesystem))
            .expect("empty registry has no duplicate tags");

        #[cfg(feature = "storage-s3")]
        registry
            .register(StorageBackend::S3.tag(), Arc::new(build_s3))
            .expect("empty registry has no duplicate tags");

        registry
    }

    /// Register `factory` under `tag`. A tag can be registered only once.
    pub fn register(&mut self, tag: &str, factory: DriverFactory) -> StorageResult<()> {
        if self.factories.contains_key(tag) {
            return Err(StorageError::DuplicateBackend(tag.to_string()));
        }
        self.factories.insert(tag.to_string(), factory);
        Ok(())
    }

    /// Factory for `tag`. Never falls back to a default backend.
    pub fn resolve(&self, tag: &str) -> StorageResult<&DriverFactory> {
        self.factories
            .get(tag)
            .ok_or_else(|| StorageError::UnknownBackend(tag.to_string()))
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Build the driver for the configured active backend.
    pub fn create_driver(&self, ctx: &DriverContext) -> StorageResult<Arc<dyn StorageDriver>> {
        let tag = ctx.config.storage_backend.as_str();
        let factory = self.resolve(tag).inspect_err(|_| {
            tracing::error!(
                backend = %tag,
                registered = ?self.tags(),
                "Configured storage backend is not registered"
            );
        })?;

        let driver = factory(ctx)?;
        tracing::info!(backend = %driver.backend_type(), "Storage driver initialized");
        Ok(driver)
    }
}

#[cfg(feature = "storage-local")]
fn build_filesystem(ctx: &DriverContext) -> StorageResult<Arc<dyn StorageDriver>> {
    let base_path = ctx
        .config
        .nfs_path
        .clone()
        .ok_or_else(|| StorageError::ConfigError("NFS_PATH not configured".to_string()))?;
    Ok(Arc::new(FilesystemStorage::new(
        base_path,
        ctx.codec.clone(),
        ctx.fetcher.clone(),
    )))
}

#[cfg(feature = "storage-s3")]
fn build_s3(ctx: &DriverContext) -> StorageResult<Arc<dyn StorageDriver>> {
    let storage = S3Storage::new(&ctx.config, ctx.codec.clone(), ctx.fetcher.clone())?;
    Ok(Arc::new(storage))
}
