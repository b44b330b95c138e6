//! Object key construction and parsing.
//!
//! Key format: `{response_type}/{owner_id}/{year}/{month}/{filename}`, where the
//! year and month come from the upload time and `month` is not zero-padded.
//! All backends use this layout so a key can move between them unchanged.

use crate::traits::{StorageError, StorageResult};
use chrono::{DateTime, Datelike, Utc};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

const KEY_COMPONENTS: usize = 5;

/// Canonical internal path identifying stored bytes. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Build the key for an upload. `filename` is expected to be timestamped
    /// already (see [`timestamp_filename`] / [`unique_filename`]).
    pub fn build(
        response_type: &str,
        owner_id: &str,
        filename: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Self> {
        validate_component("response type", response_type)?;
        validate_component("owner id", owner_id)?;
        validate_component("filename", filename)?;

        Ok(ObjectKey(format!(
            "{}/{}/{}/{}/{}",
            response_type,
            owner_id,
            now.year(),
            now.month(),
            filename
        )))
    }

    /// Parse a previously built key.
    pub fn parse(path: &str) -> StorageResult<Self> {
        let components: Vec<&str> = path.split('/').collect();
        if components.len() != KEY_COMPONENTS {
            return Err(StorageError::MalformedKey(format!(
                "expected {} components, found {}",
                KEY_COMPONENTS,
                components.len()
            )));
        }
        if components.iter().any(|c| c.is_empty()) {
            return Err(StorageError::MalformedKey(
                "key contains an empty component".to_string(),
            ));
        }
        Ok(ObjectKey(path.to_string()))
    }

    /// `(owner_id, filename)` recovered from the key.
    pub fn owner_and_filename(&self) -> (&str, &str) {
        let mut parts = self.0.split('/');
        let owner = parts.nth(1).unwrap_or_default();
        let filename = parts.nth(2).unwrap_or_default();
        (owner, filename)
    }

    pub fn filename(&self) -> &str {
        self.owner_and_filename().1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

fn validate_component(name: &str, value: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::MalformedKey(format!("{} must not be empty", name)));
    }
    if value.contains('/') || value == "." || value == ".." {
        return Err(StorageError::MalformedKey(format!(
            "{} must be a single path segment: {}",
            name, value
        )));
    }
    Ok(())
}

/// Prefix `filename` with the upload time in whole epoch seconds.
///
/// Two uploads of the same file for the same owner within one second collide.
pub fn timestamp_filename(filename: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.timestamp(), filename)
}

/// Timestamped filename with a random 8-hex-digit disambiguator, used by all drivers.
pub fn unique_filename(filename: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    timestamp_filename(&format!("{}_{}", &suffix[..8], filename), now)
}

/// Extension after the last `.`, if any.
pub fn file_extension(filename: &str) -> Option<&str> {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn march_15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_build_key_layout() {
        let now = march_15();
        let filename = timestamp_filename("report.pdf", now);
        let key = ObjectKey::build("user_responses", "bot42", &filename, now).unwrap();

        assert_eq!(
            key.as_str(),
            format!("user_responses/bot42/2024/3/{}_report.pdf", now.timestamp())
        );
        assert_eq!(now.timestamp(), 1_710_460_800);
    }

    #[test]
    fn test_build_then_parse_recovers_owner_and_filename() {
        let now = march_15();
        for (owner, name) in [("bot42", "report.pdf"), ("a-b_c", "no_extension"), ("7", "x.tar.gz")] {
            let filename = timestamp_filename(name, now);
            let key = ObjectKey::build("analytics_reports", owner, &filename, now).unwrap();
            let parsed = ObjectKey::parse(key.as_str()).unwrap();
            assert_eq!(parsed.owner_and_filename(), (owner, filename.as_str()));
        }
    }

    #[test]
    fn test_build_is_deterministic_within_a_month() {
        let a = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        let key_a = ObjectKey::build("user_responses", "bot", "1_f.png", a).unwrap();
        let key_b = ObjectKey::build("user_responses", "bot", "1_f.png", b).unwrap();
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn test_build_rejects_empty_or_nested_components() {
        let now = march_15();
        assert!(matches!(
            ObjectKey::build("", "bot", "f", now),
            Err(StorageError::MalformedKey(_))
        ));
        assert!(matches!(
            ObjectKey::build("user_responses", "", "f", now),
            Err(StorageError::MalformedKey(_))
        ));
        assert!(matches!(
            ObjectKey::build("user_responses", "bot", "", now),
            Err(StorageError::MalformedKey(_))
        ));
        assert!(matches!(
            ObjectKey::build("user_responses", "../bot", "f", now),
            Err(StorageError::MalformedKey(_))
        ));
        assert!(matches!(
            ObjectKey::build("user_responses", "..", "f", now),
            Err(StorageError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_component_count() {
        for path in ["a/b/c/d", "a/b/c/d/e/f", "", "a//c/d/e"] {
            assert!(
                matches!(ObjectKey::parse(path), Err(StorageError::MalformedKey(_))),
                "{path} should be malformed"
            );
        }
    }

    #[test]
    fn test_unique_filename_disambiguates_same_second() {
        let now = march_15();
        let a = unique_filename("photo.jpg", now);
        let b = unique_filename("photo.jpg", now);

        assert_ne!(a, b);
        assert!(a.starts_with("1710460800_"));
        assert!(a.ends_with("_photo.jpg"));
        assert_eq!(a.len(), "1710460800_".len() + 9 + "photo.jpg".len());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("1_report.pdf"), Some("pdf"));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}
