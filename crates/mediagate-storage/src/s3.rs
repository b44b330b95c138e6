use crate::content_type::detect_content_type;
use crate::fetcher::RemoteFetcher;
use crate::keys::ObjectKey;
use crate::token::{PathCodec, PresignedToken};
use crate::traits::{FetchedObject, StorageDriver, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use mediagate_core::StorageConfig;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use std::time::Duration;

/// S3 storage implementation
///
/// Objects are written through the `ObjectStore` API; reads and client uploads
/// go through native presigned URLs so the bytes never pass through this service.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn Signer>,
    bucket: String,
    url_expiry: Duration,
    infer_content_type: bool,
    codec: Arc<PathCodec>,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl S3Storage {
    /// Create a new S3Storage instance from configuration
    ///
    /// Credentials come from `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` when set,
    /// otherwise from the ambient AWS environment. A custom `s3_endpoint` targets
    /// S3-compatible providers (e.g. "http://localhost:9000" for MinIO).
    pub fn new(
        config: &StorageConfig,
        codec: Arc<PathCodec>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> StorageResult<Self> {
        let bucket = config
            .s3_bucket
            .clone()
            .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
        let region = config.region().map(String::from).ok_or_else(|| {
            StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
        })?;

        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let (Some(key_id), Some(secret)) =
            (&config.aws_access_key_id, &config.aws_secret_access_key)
        {
            builder = builder
                .with_access_key_id(key_id.clone())
                .with_secret_access_key(secret.clone());
        }

        if let Some(ref endpoint) = config.s3_endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        Ok(Self::with_store(
            store.clone(),
            store,
            bucket,
            Duration::from_secs(config.s3_presigned_url_expiry_secs),
            config.s3_infer_content_type,
            codec,
            fetcher,
        ))
    }

    /// Build on an existing store and signer (used for S3-compatible stores and tests).
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn Signer>,
        bucket: String,
        url_expiry: Duration,
        infer_content_type: bool,
        codec: Arc<PathCodec>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> Self {
        S3Storage {
            store,
            signer,
            bucket,
            url_expiry,
            infer_content_type,
            codec,
            fetcher,
        }
    }

    async fn sign(&self, method: Method, key: &ObjectKey) -> StorageResult<String> {
        let location = Path::from(key.as_str());
        let url = self
            .signer
            .signed_url(method, &location, self.url_expiry)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 URL signing failed"
                );
                StorageError::BackendError(e.to_string())
            })?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl StorageDriver for S3Storage {
    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    fn codec(&self) -> &PathCodec {
        &self.codec
    }

    fn fetcher(&self) -> &dyn RemoteFetcher {
        self.fetcher.as_ref()
    }

    async fn store_at_key(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = Path::from(key.as_str());
        let start = std::time::Instant::now();

        let mut opts = PutOptions::default();
        let content_type = self.infer_content_type.then(|| detect_content_type(&data));
        if let Some(content_type) = content_type {
            opts.attributes
                .insert(Attribute::ContentType, content_type.into());
        }

        self.store
            .put_opts(&location, PutPayload::from(data), opts)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::WriteFailed(format!("s3://{}/{}", self.bucket, key))
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            content_type = ?content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn fetch(&self, key: &ObjectKey) -> StorageResult<FetchedObject> {
        let url = self.sign(Method::GET, key).await?;
        Ok(FetchedObject::RedirectUrl {
            url,
            filename: key.filename().to_string(),
        })
    }

    async fn upload_url(&self, key: &ObjectKey, _token: &PresignedToken) -> StorageResult<String> {
        self.sign(Method::PUT, key).await
    }
}

#[cfg(all(test, feature = "storage-s3"))]
mod tests {
    use super::*;
    use crate::fetcher::RemoteResponse;
    use chrono::Utc;
    use mediagate_core::{EncryptionService, ResponseType};
    use object_store::memory::InMemory;
    use object_store::GetOptions;

    /// Produces predictable URLs instead of SigV4 signatures.
    #[derive(Debug)]
    struct TestSigner;

    #[async_trait]
    impl Signer for TestSigner {
        async fn signed_url(
            &self,
            method: Method,
            path: &Path,
            expires_in: Duration,
        ) -> object_store::Result<reqwest::Url> {
            Ok(reqwest::Url::parse(&format!(
                "https://bucket.s3.test/{}?method={}&expires={}",
                path,
                method,
                expires_in.as_secs()
            ))
            .unwrap())
        }
    }

    struct PngFetcher;

    #[async_trait]
    impl RemoteFetcher for PngFetcher {
        async fn get(&self, _url: &str) -> StorageResult<RemoteResponse> {
            Ok(RemoteResponse {
                status: 200,
                body: Bytes::from_static(b"\x89PNG\r\n\x1a\nrest-of-image"),
                headers: vec![("content-type".to_string(), "image/png".to_string())],
            })
        }
    }

    fn storage(infer_content_type: bool) -> (S3Storage, Arc<InMemory>) {
        let cipher = EncryptionService::from_key_bytes(&[9u8; 32]).unwrap();
        let codec = Arc::new(PathCodec::new(
            Arc::new(cipher),
            "https://media.example.com",
            260,
        ));
        let memory = Arc::new(InMemory::new());
        let storage = S3Storage::with_store(
            memory.clone(),
            Arc::new(TestSigner),
            "bucket".to_string(),
            Duration::from_secs(604_800),
            infer_content_type,
            codec,
            Arc::new(PngFetcher),
        );
        (storage, memory)
    }

    #[tokio::test]
    async fn test_store_from_bytes_then_fetch_redirects() {
        let (storage, memory) = storage(false);

        let token = storage
            .store_from_bytes(
                Bytes::from_static(b"hello"),
                "bot42",
                ResponseType::UserResponses,
                "note.txt",
            )
            .await
            .unwrap();

        let decoded = storage.codec().parse_token(token.as_str(), Utc::now()).unwrap();
        let stored = memory
            .get_opts(&Path::from(decoded.key.as_str()), GetOptions::default())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), b"hello");

        match storage.fetch(&decoded.key).await.unwrap() {
            FetchedObject::RedirectUrl { url, filename } => {
                assert!(url.starts_with("https://bucket.s3.test/user_responses/bot42/"));
                assert!(url.contains("method=GET"));
                assert!(url.contains("expires=604800"));
                assert_eq!(filename, decoded.key.filename());
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_content_type_tagging() {
        let (storage, memory) = storage(true);

        let token = storage
            .store_from_remote_url(
                "https://cdn.example.com/img/logo.png",
                "bot7",
                ResponseType::UserResponses,
                None,
            )
            .await
            .unwrap();
        assert!(token.as_str().ends_with(".png"));

        let decoded = storage.codec().parse_token(token.as_str(), Utc::now()).unwrap();
        let result = memory
            .get_opts(&Path::from(decoded.key.as_str()), GetOptions::default())
            .await
            .unwrap();
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.as_ref().to_string());
        assert_eq!(content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_no_content_type_unless_requested() {
        let (storage, memory) = storage(false);
        let key = ObjectKey::parse("user_responses/bot/2024/3/1_a.png").unwrap();

        storage
            .store_at_key(&key, Bytes::from_static(b"\x89PNG\r\n\x1a\n"))
            .await
            .unwrap();

        let result = memory
            .get_opts(&Path::from(key.as_str()), GetOptions::default())
            .await
            .unwrap();
        assert!(result.attributes.get(&Attribute::ContentType).is_none());
    }

    #[tokio::test]
    async fn test_presigned_upload_uses_native_put_url() {
        let (storage, _) = storage(false);

        let urls = storage
            .presigned_upload("bot42", ResponseType::AnalyticsReports, Some("q1.csv"))
            .await
            .unwrap();

        assert!(urls
            .upload_url
            .starts_with("https://bucket.s3.test/analytics_reports/bot42/"));
        assert!(urls.upload_url.contains("method=PUT"));
        assert!(urls
            .download_url
            .starts_with("https://media.example.com/api/v1/media/"));
        assert!(urls.download_url.ends_with(".csv"));
    }
}
