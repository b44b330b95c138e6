//! Configuration module
//!
//! Everything is read once at startup from the environment and then passed
//! explicitly to the registry, the drivers and the HTTP layer.

use std::env;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const TOKEN_TTL_WEEKS: i64 = 260;
/// Upper bound on the token lifetime (100 years).
pub const MAX_TOKEN_TTL_WEEKS: i64 = 5200;
const REMOTE_FETCH_TIMEOUT_SECS: u64 = 60;
/// Native S3 presigned URLs cannot outlive seven days.
pub const MAX_S3_PRESIGNED_URL_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Settings the storage drivers are constructed from.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Tag of the active backend, resolved through the registry.
    pub storage_backend: String,
    pub nfs_path: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub s3_presigned_url_expiry_secs: u64,
    pub s3_infer_content_type: bool,
    pub token_ttl_weeks: i64,
    pub remote_fetch_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Base domain prefix for media token URLs, e.g. `https://media.example.com`.
    pub domain: String,
    /// Base64-encoded 32-byte AES key used to seal media tokens.
    pub encryption_key: String,
    /// Bearer secret for issuance and store endpoints. Unguarded when absent.
    pub service_api_key: Option<String>,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage = StorageConfig {
            storage_backend: env::var("BLOB_STORAGE_TYPE")
                .unwrap_or_else(|_| StorageBackend::Nfs.tag().to_string())
                .trim()
                .to_lowercase(),
            nfs_path: env::var("NFS_PATH").ok().filter(|s| !s.is_empty()),
            s3_bucket: env::var("S3_BUCKET")
                .or_else(|_| env::var("AWS_BUCKET"))
                .ok()
                .filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok().filter(|s| !s.is_empty()),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
            s3_presigned_url_expiry_secs: env::var("S3_PRESIGNED_URL_EXPIRY_SECS")
                .unwrap_or_else(|_| MAX_S3_PRESIGNED_URL_EXPIRY_SECS.to_string())
                .parse::<u64>()
                .unwrap_or(MAX_S3_PRESIGNED_URL_EXPIRY_SECS)
                .min(MAX_S3_PRESIGNED_URL_EXPIRY_SECS),
            s3_infer_content_type: env::var("S3_INFER_CONTENT_TYPE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            token_ttl_weeks: env::var("TOKEN_TTL_WEEKS")
                .unwrap_or_else(|_| TOKEN_TTL_WEEKS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("TOKEN_TTL_WEEKS must be a whole number"))?,
            remote_fetch_timeout_secs: env::var("REMOTE_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| REMOTE_FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REMOTE_FETCH_TIMEOUT_SECS),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            domain: env::var("DOMAIN")
                .map_err(|_| anyhow::anyhow!("DOMAIN must be set"))?
                .trim_end_matches('/')
                .to_string(),
            encryption_key: env::var("ENCRYPTION_KEY")
                .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be set"))?,
            service_api_key: env::var("SERVICE_API_KEY").ok().filter(|s| !s.is_empty()),
            storage,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.domain.is_empty() {
            return Err(anyhow::anyhow!("DOMAIN must not be empty"));
        }

        if self.encryption_key.trim().len() < 43 {
            return Err(anyhow::anyhow!(
                "ENCRYPTION_KEY must be a base64-encoded 32-byte key"
            ));
        }

        if self.storage.token_ttl_weeks <= 0 || self.storage.token_ttl_weeks > MAX_TOKEN_TTL_WEEKS {
            return Err(anyhow::anyhow!(
                "TOKEN_TTL_WEEKS must be between 1 and {}",
                MAX_TOKEN_TTL_WEEKS
            ));
        }

        // Unknown tags are left to the registry so the failure names the tag.
        match self.storage.storage_backend.parse::<StorageBackend>() {
            Ok(StorageBackend::S3) => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            Ok(StorageBackend::Nfs) => {
                if self.storage.nfs_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "NFS_PATH must be set when using nfs storage backend"
                    ));
                }
            }
            Err(_) => {}
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Region for the cloud driver, preferring the S3-specific setting.
    pub fn region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    /// Local-only settings, convenient for tests and single-node deployments.
    pub fn local(nfs_path: impl Into<String>) -> Self {
        StorageConfig {
            storage_backend: StorageBackend::Nfs.tag().to_string(),
            nfs_path: Some(nfs_path.into()),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            s3_presigned_url_expiry_secs: MAX_S3_PRESIGNED_URL_EXPIRY_SECS,
            s3_infer_content_type: false,
            token_ttl_weeks: TOKEN_TTL_WEEKS,
            remote_fetch_timeout_secs: REMOTE_FETCH_TIMEOUT_SECS,
        }
    }
}
