//! Mediagate Core Library
//!
//! This crate provides the configuration, error types, token cipher and shared
//! enums used by the storage drivers and the HTTP layer.

pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, StorageConfig};
pub use encryption::{Cipher, EncryptionService};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ResponseType, UploadUrls};
pub use storage_types::StorageBackend;
