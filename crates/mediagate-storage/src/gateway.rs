//! Retrieval gateway: token in, servable location out.

use crate::keys::ObjectKey;
use crate::token::PathCodec;
use crate::traits::{FetchedObject, StorageDriver, StorageResult};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Decodes media tokens and dispatches to the active driver.
#[derive(Clone)]
pub struct RetrievalGateway {
    codec: Arc<PathCodec>,
    driver: Arc<dyn StorageDriver>,
}

impl RetrievalGateway {
    pub fn new(codec: Arc<PathCodec>, driver: Arc<dyn StorageDriver>) -> Self {
        RetrievalGateway { codec, driver }
    }

    pub fn codec(&self) -> &Arc<PathCodec> {
        &self.codec
    }

    pub fn driver(&self) -> &Arc<dyn StorageDriver> {
        &self.driver
    }

    /// Validate `token` at `now` and locate the object it refers to.
    pub async fn resolve(&self, token: &str, now: DateTime<Utc>) -> StorageResult<FetchedObject> {
        let decoded = self.codec.parse_token(token, now)?;
        tracing::debug!(key = %decoded.key, expiry = decoded.expiry, "Media token accepted");
        self.driver.fetch(&decoded.key).await
    }

    /// Store an uploaded body under the key sealed in `token`.
    pub async fn accept_upload(
        &self,
        token: &str,
        data: Bytes,
        now: DateTime<Utc>,
    ) -> StorageResult<ObjectKey> {
        let decoded = self.codec.parse_token(token, now)?;
        let size = data.len();
        self.driver.store_at_key(&decoded.key, data).await?;

        tracing::info!(
            backend = %self.driver.backend_type(),
            key = %decoded.key,
            size_bytes = size,
            "Upload relayed to storage"
        );
        Ok(decoded.key)
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use crate::fetcher::{RemoteFetcher, RemoteResponse};
    use crate::keys::timestamp_filename;
    use crate::local::FilesystemStorage;
    use crate::traits::StorageError;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use mediagate_core::EncryptionService;

    struct NoFetch;

    #[async_trait]
    impl RemoteFetcher for NoFetch {
        async fn get(&self, url: &str) -> StorageResult<RemoteResponse> {
            Err(StorageError::FetchFailed(url.to_string()))
        }
    }

    fn gateway(root: &std::path::Path) -> RetrievalGateway {
        let cipher = EncryptionService::from_key_bytes(&[5u8; 32]).unwrap();
        let codec = Arc::new(PathCodec::new(Arc::new(cipher), "https://m.example.com", 260));
        let driver = Arc::new(FilesystemStorage::new(root, codec.clone(), Arc::new(NoFetch)));
        RetrievalGateway::new(codec, driver)
    }

    #[tokio::test]
    async fn test_expired_token_fails_but_reminted_token_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway(dir.path());
        let issued = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let key = ObjectKey::build(
            "user_responses",
            "bot42",
            &timestamp_filename("report.pdf", issued),
            issued,
        )
        .unwrap();
        gateway
            .driver()
            .store_at_key(&key, Bytes::from_static(b"pdf"))
            .await
            .unwrap();

        let now = issued + Duration::weeks(2);
        let stale = gateway.codec().make_token(&key, issued, 1, Some("pdf")).unwrap();
        assert!(matches!(
            gateway.resolve(stale.as_str(), now).await,
            Err(StorageError::Expired { .. })
        ));

        let fresh = gateway.codec().make_token(&key, now, 1, Some("pdf")).unwrap();
        match gateway.resolve(fresh.as_str(), now).await.unwrap() {
            FetchedObject::LocalPath { filename, .. } => {
                assert_eq!(filename, key.filename());
            }
            other => panic!("expected local path, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accept_upload_writes_under_token_key() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway(dir.path());
        let now = Utc::now();
        let key = ObjectKey::build("user_responses", "bot1", &timestamp_filename("a.ogg", now), now)
            .unwrap();
        let token = gateway.codec().make_token(&key, now, 1, Some("ogg")).unwrap();

        let stored = gateway
            .accept_upload(token.as_str(), Bytes::from_static(b"OggS"), now)
            .await
            .unwrap();
        assert_eq!(stored, key);
        assert_eq!(
            std::fs::read(dir.path().join(key.as_str())).unwrap(),
            b"OggS"
        );
    }

    #[tokio::test]
    async fn test_garbage_token_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway(dir.path());
        assert!(matches!(
            gateway.resolve("definitely-not-a-token", Utc::now()).await,
            Err(StorageError::DecodeError(_))
        ));
    }
}
