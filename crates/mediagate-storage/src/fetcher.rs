//! HTTP client collaborator for store-from-URL.

use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use uuid::Uuid;

/// Response of a remote GET.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Bytes,
    pub headers: Vec<(String, String)>,
}

/// Fetches remote content. Timeouts are the implementation's concern; no retries.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fails with `FetchFailed` only when no response was received at all.
    async fn get(&self, url: &str) -> StorageResult<RemoteResponse>;
}

/// `reqwest`-backed fetcher.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: std::time::Duration) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(ReqwestFetcher { client })
    }
}

#[async_trait]
impl RemoteFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> StorageResult<RemoteResponse> {
        let start = std::time::Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to download from URL");
            StorageError::FetchFailed(format!("Unable to reach {}", url))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to read response body");
            StorageError::FetchFailed(format!("Unable to read body from {}", url))
        })?;

        tracing::debug!(
            url = %url,
            status,
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote fetch finished"
        );

        Ok(RemoteResponse {
            status,
            body,
            headers,
        })
    }
}

/// Last path segment of `url`, percent-decoded. Query and fragment never contribute.
///
/// Falls back to a random name when the URL has no usable segment.
pub fn filename_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let name: String = decoded
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    if name.is_empty() || name == "." || name == ".." {
        Uuid::new_v4().to_string()
    } else {
        name
    }
}
