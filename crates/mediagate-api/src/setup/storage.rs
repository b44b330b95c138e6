//! Storage setup and initialization

use anyhow::{Context, Result};
use mediagate_core::{Config, EncryptionService};
use mediagate_storage::{
    BackendRegistry, DriverContext, PathCodec, ReqwestFetcher, StorageDriver,
};
use std::sync::Arc;
use std::time::Duration;

/// Build the token codec and the configured driver from the builtin registry.
pub fn setup_storage(config: &Config) -> Result<(Arc<PathCodec>, Arc<dyn StorageDriver>)> {
    setup_storage_with(config, &BackendRegistry::builtin())
}

/// Same as [`setup_storage`] with a caller-assembled registry.
pub fn setup_storage_with(
    config: &Config,
    registry: &BackendRegistry,
) -> Result<(Arc<PathCodec>, Arc<dyn StorageDriver>)> {
    tracing::info!("Initializing storage driver...");

    let cipher = EncryptionService::from_base64_key(&config.encryption_key)
        .map_err(|e| anyhow::anyhow!("Invalid ENCRYPTION_KEY: {}", e))?;
    let codec = Arc::new(PathCodec::new(
        Arc::new(cipher),
        config.domain.clone(),
        config.storage.token_ttl_weeks,
    ));

    let fetcher = ReqwestFetcher::new(Duration::from_secs(
        config.storage.remote_fetch_timeout_secs,
    ))
    .context("Failed to build HTTP client for remote fetches")?;

    let ctx = DriverContext {
        config: config.storage.clone(),
        codec: codec.clone(),
        fetcher: Arc::new(fetcher),
    };
    let driver = registry
        .create_driver(&ctx)
        .context("Failed to initialize storage driver")?;

    Ok((codec, driver))
}
