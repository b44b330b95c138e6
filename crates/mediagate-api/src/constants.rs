//! Application-wide constants

pub use mediagate_storage::token::MEDIA_ROUTE;

/// Largest body accepted by the relay upload route.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 512 * 1024 * 1024;

/// Bytes read from a stored file to sniff its content type.
pub const SNIFF_LEN: usize = 32;
