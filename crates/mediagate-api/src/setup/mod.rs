//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use mediagate_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %config.environment,
        backend = %config.storage.storage_backend,
        "Configuration loaded and validated successfully"
    );

    let (codec, driver) = storage::setup_storage(&config)?;
    let state = Arc::new(AppState::new(config, codec, driver));

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
