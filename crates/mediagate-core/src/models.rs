//! Shared request/response models.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Category of stored media. Becomes the first component of every object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    AnalyticsReports,
    #[default]
    UserResponses,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::AnalyticsReports => "analytics_reports",
            ResponseType::UserResponses => "user_responses",
        }
    }
}

impl Display for ResponseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Result of upload-URL issuance.
///
/// `upload_url` accepts an HTTP PUT of the raw bytes; its shape depends on the
/// active backend. `download_url` is always the opaque media token URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadUrls {
    pub upload_url: String,
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_type_serde_names() {
        let json = serde_json::to_string(&ResponseType::AnalyticsReports).unwrap();
        assert_eq!(json, "\"analytics_reports\"");

        let parsed: ResponseType = serde_json::from_str("\"user_responses\"").unwrap();
        assert_eq!(parsed, ResponseType::UserResponses);
        assert_eq!(parsed.as_str(), "user_responses");
    }
}
