//! Test helpers: build AppState and router over a temporary filesystem root.
//!
//! Run from workspace root: `cargo test -p mediagate-api`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use mediagate_api::setup::routes;
use mediagate_api::AppState;
use mediagate_core::{Config, EncryptionService, StorageConfig};
use mediagate_storage::{
    FilesystemStorage, PathCodec, RemoteFetcher, RemoteResponse, StorageDriver, StorageResult,
};
use std::sync::Arc;
use tempfile::TempDir;

pub const DOMAIN: &str = "http://media.test";
pub const SERVICE_KEY: &str = "test-service-key";

/// Serves a fixed body for every URL containing `/ok/`, 404 otherwise.
pub struct StubFetcher {
    pub body: Bytes,
}

#[async_trait]
impl RemoteFetcher for StubFetcher {
    async fn get(&self, url: &str) -> StorageResult<RemoteResponse> {
        let status = if url.contains("/ok/") { 200 } else { 404 };
        Ok(RemoteResponse {
            status,
            body: if status == 200 { self.body.clone() } else { Bytes::new() },
            headers: Vec::new(),
        })
    }
}

pub fn test_config(root: &std::path::Path, service_api_key: Option<&str>) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        domain: DOMAIN.to_string(),
        encryption_key: general_purpose::STANDARD.encode([9u8; 32]),
        service_api_key: service_api_key.map(String::from),
        storage: StorageConfig::local(root.to_string_lossy().to_string()),
    }
}

pub fn test_codec(config: &Config) -> Arc<PathCodec> {
    let cipher = EncryptionService::from_base64_key(&config.encryption_key).unwrap();
    Arc::new(PathCodec::new(
        Arc::new(cipher),
        config.domain.clone(),
        config.storage.token_ttl_weeks,
    ))
}

/// Test application: server plus the owned storage root.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn root(&self) -> &std::path::Path {
        self._temp_dir.path()
    }
}

pub fn setup_test_app(service_api_key: Option<&str>, remote_body: &'static [u8]) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path(), service_api_key);
    let codec = test_codec(&config);
    let driver: Arc<dyn StorageDriver> = Arc::new(FilesystemStorage::new(
        temp_dir.path(),
        codec.clone(),
        Arc::new(StubFetcher {
            body: Bytes::from_static(remote_body),
        }),
    ));
    setup_with_driver(config, codec, driver, temp_dir)
}

pub fn setup_with_driver(
    config: Config,
    codec: Arc<PathCodec>,
    driver: Arc<dyn StorageDriver>,
    temp_dir: TempDir,
) -> TestApp {
    let state = Arc::new(AppState::new(config, codec, driver));
    let app = routes::setup_routes(state.clone());
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Route path of a `{DOMAIN}/api/v1/media/{token}` URL.
pub fn media_path(url: &str) -> String {
    url.strip_prefix(DOMAIN)
        .unwrap_or_else(|| panic!("url {} is not under {}", url, DOMAIN))
        .to_string()
}
