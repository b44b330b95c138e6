use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Each variant maps to the tag a driver is registered under. Configuration
/// carries the raw tag so an unknown value is caught by the registry at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Nfs,
}

impl StorageBackend {
    /// Registry tag for this backend.
    pub fn tag(&self) -> &'static str {
        match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Nfs => "nfs",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "nfs" => Ok(StorageBackend::Nfs),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.tag())
    }
}
