//! Mediagate Storage Library
//!
//! Blob storage behind opaque, time-limited media tokens.
//!
//! # Object key format
//!
//! `{response_type}/{owner_id}/{year}/{month}/{timestamped_filename}`, built and
//! parsed only by the `keys` module so every backend stays consistent.
//!
//! # Tokens
//!
//! A token seals an object key and an absolute expiry with the configured cipher
//! (see `token`). Tokens are stateless: they stay valid until the embedded
//! expiry and are never revoked by use.

pub mod content_type;
pub mod fetcher;
pub mod gateway;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod registry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod token;
pub mod traits;

// Re-export commonly used types
pub use fetcher::{RemoteFetcher, RemoteResponse, ReqwestFetcher};
pub use gateway::RetrievalGateway;
pub use keys::ObjectKey;
#[cfg(feature = "storage-local")]
pub use local::FilesystemStorage;
pub use mediagate_core::StorageBackend;
pub use registry::{BackendRegistry, DriverContext, DriverFactory};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use token::{DecodedToken, PathCodec, PresignedToken};
pub use traits::{FetchedObject, StorageDriver, StorageError, StorageResult};
