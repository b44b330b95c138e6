//! Symmetric cipher used to seal media tokens.

use crate::AppError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};

const NONCE_LEN: usize = 12;

/// Black-box symmetric cipher.
///
/// Output may differ between calls for the same input, but
/// `decrypt(encrypt(x)) == x` must always hold.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, AppError>;

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, AppError>;
}

/// AES-256-GCM cipher. Output layout is `nonce (12 bytes) || ciphertext+tag`.
#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Create a new encryption service from raw 32-byte key (e.g. for tests; avoids env mutation).
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, AppError> {
        if key_bytes.len() != 32 {
            return Err(AppError::Internal(
                "Encryption key must be 32 bytes (256 bits)".to_string(),
            ));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create a new encryption service from a base64-encoded 32-byte key
    pub fn from_base64_key(key_str: &str) -> Result<Self, AppError> {
        let key_bytes = general_purpose::STANDARD
            .decode(key_str.trim())
            .map_err(|e| AppError::Internal(format!("Failed to decode encryption key: {}", e)))?;

        Self::from_key_bytes(&key_bytes)
    }
}

impl Cipher for EncryptionService {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| AppError::Internal(format!("Encryption failed: {}", e)))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    fn decrypt(&self, combined: &[u8]) -> Result<Vec<u8>, AppError> {
        if combined.len() < NONCE_LEN {
            return Err(AppError::InvalidInput("Encrypted data too short".to_string()));
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| AppError::InvalidInput(format!("Decryption failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> EncryptionService {
        let test_key = b"01234567890123456789012345678901";
        EncryptionService::from_key_bytes(test_key).unwrap()
    }

    #[test]
    fn test_encryption_decryption() {
        let service = test_service();
        let plaintext = b"user_responses/bot42/2024/3/1710460800_report.pdf";

        let encrypted = service.encrypt(plaintext).unwrap();
        assert_ne!(encrypted.as_slice(), plaintext.as_slice());

        let decrypted = service.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_nonce_makes_output_vary() {
        let service = test_service();
        let a = service.encrypt(b"same").unwrap();
        let b = service.encrypt(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let service = test_service();
        let mut encrypted = service.encrypt(b"payload").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;

        assert!(matches!(
            service.decrypt(&encrypted),
            Err(AppError::InvalidInput(_))
        ));
        assert!(service.decrypt(b"short").is_err());
    }

    #[test]
    fn test_key_length_enforced() {
        assert!(EncryptionService::from_key_bytes(b"too short").is_err());
        // 32 zero bytes, base64
        assert!(
            EncryptionService::from_base64_key("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=").is_ok()
        );
        assert!(EncryptionService::from_base64_key("not base64!").is_err());
    }
}
