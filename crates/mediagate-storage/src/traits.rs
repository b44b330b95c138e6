//! Storage driver abstraction
//!
//! This module defines the StorageDriver trait that all backends must implement,
//! together with the error taxonomy shared by the codec, registry and drivers.

use crate::fetcher::{filename_from_url, RemoteFetcher};
use crate::keys::{file_extension, unique_filename, ObjectKey};
use crate::token::{PathCodec, PresignedToken};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use mediagate_core::{AppError, ResponseType, UploadUrls};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Malformed object key: {0}")]
    MalformedKey(String),

    #[error("Token decode error: {0}")]
    DecodeError(String),

    #[error("Token expired at {expiry}")]
    Expired { expiry: i64 },

    #[error("Unknown storage backend: {0}")]
    UnknownBackend(String),

    #[error("Storage backend already registered: {0}")]
    DuplicateBackend(String),

    #[error("Remote fetch failed: {0}")]
    FetchFailed(String),

    /// Carries only a description of the target; the OS error is logged, not propagated.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MalformedKey(msg) => AppError::MalformedKey(msg),
            StorageError::DecodeError(msg) => AppError::InvalidToken(msg),
            StorageError::Expired { expiry } => AppError::TokenExpired { expiry },
            StorageError::UnknownBackend(tag) => AppError::UnknownBackend(tag),
            StorageError::FetchFailed(msg) => AppError::FetchFailed(msg),
            StorageError::WriteFailed(msg) => AppError::WriteFailed(msg),
            StorageError::NotFound(key) => AppError::NotFound(format!("Media not found: {}", key)),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Where a fetched object can be read from.
///
/// Local drivers hand back a path the caller streams; cloud drivers hand back a
/// short-lived native URL the caller redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedObject {
    LocalPath { path: PathBuf, filename: String },
    RedirectUrl { url: String, filename: String },
}

impl FetchedObject {
    pub fn filename(&self) -> &str {
        match self {
            FetchedObject::LocalPath { filename, .. } | FetchedObject::RedirectUrl { filename, .. } => {
                filename
            }
        }
    }
}

/// Storage driver trait
///
/// Backends implement persistence, retrieval and upload-URL shape. The store
/// flows (remote URL, in-memory bytes, upload-URL issuance) are shared and
/// built on top of those through the provided methods.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Codec used to mint tokens for stored objects
    fn codec(&self) -> &PathCodec;

    /// HTTP client collaborator used by remote-URL stores
    fn fetcher(&self) -> &dyn RemoteFetcher;

    /// Persist `data` under `key`, overwriting any previous object.
    async fn store_at_key(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()>;

    /// Resolve `key` into a location the caller can serve.
    async fn fetch(&self, key: &ObjectKey) -> StorageResult<FetchedObject>;

    /// URL that accepts an HTTP PUT of the object's bytes.
    async fn upload_url(&self, key: &ObjectKey, token: &PresignedToken) -> StorageResult<String>;

    /// Download `source_url` and store the body.
    ///
    /// `filename` defaults to the last path segment of the URL. Nothing is
    /// persisted when the source does not answer 200.
    async fn store_from_remote_url(
        &self,
        source_url: &str,
        owner_id: &str,
        response_type: ResponseType,
        filename: Option<&str>,
    ) -> StorageResult<PresignedToken> {
        let url = reqwest::Url::parse(source_url).map_err(|e| {
            StorageError::FetchFailed(format!("Invalid source url {}: {}", source_url, e))
        })?;
        let response = self.fetcher().get(url.as_str()).await?;
        if response.status != 200 {
            tracing::error!(
                url = %source_url,
                status = response.status,
                "Error downloading media from source URL"
            );
            return Err(StorageError::FetchFailed(format!(
                "Unable to download media from url {} (status {})",
                source_url, response.status
            )));
        }

        let filename = match filename.filter(|f| !f.is_empty()) {
            Some(name) => name.to_string(),
            None => filename_from_url(&url),
        };

        self.store_from_bytes(response.body, owner_id, response_type, &filename)
            .await
    }

    /// Store in-memory content and return a token for it.
    async fn store_from_bytes(
        &self,
        data: Bytes,
        owner_id: &str,
        response_type: ResponseType,
        filename: &str,
    ) -> StorageResult<PresignedToken> {
        let now = Utc::now();
        let filename = unique_filename(filename, now);
        let key = ObjectKey::build(response_type.as_str(), owner_id, &filename, now)?;

        self.store_at_key(&key, data).await?;

        tracing::info!(
            backend = %self.backend_type(),
            key = %key,
            "Media stored"
        );

        self.codec().issue(&key, file_extension(&filename))
    }

    /// Reserve a key and return the URL pair for a client-side upload.
    async fn presigned_upload(
        &self,
        owner_id: &str,
        response_type: ResponseType,
        filename: Option<&str>,
    ) -> StorageResult<UploadUrls> {
        let now = Utc::now();
        let filename = match filename.filter(|f| !f.is_empty()) {
            Some(name) => name.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let filename = unique_filename(&filename, now);
        let key = ObjectKey::build(response_type.as_str(), owner_id, &filename, now)?;

        let token = self.codec().issue(&key, file_extension(&filename))?;
        let upload_url = self.upload_url(&key, &token).await?;

        Ok(UploadUrls {
            upload_url,
            download_url: self.codec().media_url(&token),
        })
    }
}
