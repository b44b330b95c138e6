//! Presigned media tokens.
//!
//! A token seals an [`ObjectKey`] and an absolute expiry with the configured
//! [`Cipher`]. Payload before encryption: `key_len (u16 BE) || key || expiry (i64 BE)`.
//! The ciphertext is base64 encoded and every `/` is replaced by [`SLASH_SENTINEL`]
//! so the token fits in a single URL path segment. An optional `.{extension}`
//! suffix is appended after the substitution.

use crate::keys::ObjectKey;
use crate::traits::{StorageError, StorageResult};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use mediagate_core::Cipher;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Extensions are appended only when they cannot break out of the path segment.
fn is_transport_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Stands in for `/`. None of these characters belong to the base64 alphabet.
pub const SLASH_SENTINEL: &str = "@*!";

/// Route prefix media tokens are served under.
pub const MEDIA_ROUTE: &str = "/api/v1/media";

const LEN_PREFIX: usize = 2;
const EXPIRY_LEN: usize = 8;

/// Opaque, transport-safe token, including the extension suffix when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedToken(String);

impl PresignedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for PresignedToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Result of a successful [`PathCodec::parse_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub key: ObjectKey,
    /// Absolute expiry in epoch seconds.
    pub expiry: i64,
    pub extension: Option<String>,
}

/// Builds and parses presigned tokens and the URLs that carry them.
#[derive(Clone)]
pub struct PathCodec {
    cipher: Arc<dyn Cipher>,
    domain: String,
    ttl_weeks: i64,
}

impl PathCodec {
    /// # Arguments
    /// * `cipher` - Symmetric cipher sealing the payload
    /// * `domain` - Base domain prefix (e.g. "https://media.example.com")
    /// * `ttl_weeks` - Lifetime of tokens issued through [`PathCodec::issue`]
    pub fn new(cipher: Arc<dyn Cipher>, domain: impl Into<String>, ttl_weeks: i64) -> Self {
        let domain = domain.into();
        PathCodec {
            cipher,
            domain: domain.trim_end_matches('/').to_string(),
            ttl_weeks,
        }
    }

    pub fn ttl_weeks(&self) -> i64 {
        self.ttl_weeks
    }

    /// Seal `key` with an expiry of `now + ttl_weeks`.
    pub fn make_token(
        &self,
        key: &ObjectKey,
        now: DateTime<Utc>,
        ttl_weeks: i64,
        extension: Option<&str>,
    ) -> StorageResult<PresignedToken> {
        let expires_at = Duration::try_weeks(ttl_weeks)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                tracing::error!(ttl_weeks, "Token lifetime out of range");
                StorageError::ConfigError(format!(
                    "token lifetime of {} weeks is out of range",
                    ttl_weeks
                ))
            })?;
        self.seal(key, expires_at.timestamp(), extension)
    }

    /// Token for `key` using the configured lifetime and the current time.
    pub fn issue(&self, key: &ObjectKey, extension: Option<&str>) -> StorageResult<PresignedToken> {
        self.make_token(key, Utc::now(), self.ttl_weeks, extension)
    }

    /// Seal `key` with an explicit absolute expiry (epoch seconds).
    pub fn seal(
        &self,
        key: &ObjectKey,
        expiry: i64,
        extension: Option<&str>,
    ) -> StorageResult<PresignedToken> {
        let payload = encode_payload(key, expiry)?;
        let ciphertext = self.cipher.encrypt(&payload).map_err(|e| {
            tracing::error!(error = %e, "Failed to seal media token");
            StorageError::BackendError("token encryption failed".to_string())
        })?;

        let mut token = escape_slashes(&general_purpose::STANDARD.encode(ciphertext));
        if let Some(ext) = extension.filter(|ext| is_transport_safe_extension(ext)) {
            token.push('.');
            token.push_str(ext);
        }
        Ok(PresignedToken(token))
    }

    /// Decode and validate a token.
    ///
    /// Fails with `DecodeError` when the token is not one we issued and with
    /// `Expired` when `now` is past the embedded expiry.
    pub fn parse_token(&self, token: &str, now: DateTime<Utc>) -> StorageResult<DecodedToken> {
        let (sealed, extension) = match token.rsplit_once('.') {
            Some((sealed, ext)) => (sealed, Some(ext.to_string()).filter(|e| !e.is_empty())),
            None => (token, None),
        };

        let ciphertext = general_purpose::STANDARD
            .decode(unescape_slashes(sealed))
            .map_err(|_| StorageError::DecodeError("token is not valid base64".to_string()))?;
        let payload = self
            .cipher
            .decrypt(&ciphertext)
            .map_err(|_| StorageError::DecodeError("token failed decryption".to_string()))?;
        let (key, expiry) = decode_payload(&payload)?;

        let expires_at = DateTime::<Utc>::from_timestamp(expiry, 0)
            .ok_or_else(|| StorageError::DecodeError("expiry out of range".to_string()))?;
        if now > expires_at {
            return Err(StorageError::Expired { expiry });
        }

        Ok(DecodedToken {
            key,
            expiry,
            extension,
        })
    }

    /// Public retrieval URL: `{domain}/api/v1/media/{token}`.
    pub fn media_url(&self, token: &PresignedToken) -> String {
        format!("{}{}/{}", self.domain, MEDIA_ROUTE, token.as_str())
    }
}

/// Replace every `/` with the sentinel.
pub fn escape_slashes(encoded: &str) -> String {
    encoded.replace('/', SLASH_SENTINEL)
}

/// Inverse of [`escape_slashes`] for strings over the base64 alphabet.
pub fn unescape_slashes(escaped: &str) -> String {
    escaped.replace(SLASH_SENTINEL, "/")
}

fn encode_payload(key: &ObjectKey, expiry: i64) -> StorageResult<Vec<u8>> {
    let key_bytes = key.as_str().as_bytes();
    let key_len = u16::try_from(key_bytes.len())
        .map_err(|_| StorageError::MalformedKey("object key too long".to_string()))?;

    let mut payload = Vec::with_capacity(LEN_PREFIX + key_bytes.len() + EXPIRY_LEN);
    payload.extend_from_slice(&key_len.to_be_bytes());
    payload.extend_from_slice(key_bytes);
    payload.extend_from_slice(&expiry.to_be_bytes());
    Ok(payload)
}

fn decode_payload(payload: &[u8]) -> StorageResult<(ObjectKey, i64)> {
    let malformed = || StorageError::DecodeError("token payload is malformed".to_string());

    if payload.len() < LEN_PREFIX + EXPIRY_LEN {
        return Err(malformed());
    }
    let key_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    if payload.len() != LEN_PREFIX + key_len + EXPIRY_LEN {
        return Err(malformed());
    }

    let key_bytes = &payload[LEN_PREFIX..LEN_PREFIX + key_len];
    let mut expiry_bytes = [0u8; EXPIRY_LEN];
    expiry_bytes.copy_from_slice(&payload[LEN_PREFIX + key_len..]);

    let key = std::str::from_utf8(key_bytes).map_err(|_| malformed())?;
    let key = ObjectKey::parse(key).map_err(|_| malformed())?;
    Ok((key, i64::from_be_bytes(expiry_bytes)))
}
