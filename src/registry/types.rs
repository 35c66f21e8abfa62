use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Anaconda API package record (only the fields the linter reads).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CondaPackage {
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
}

/// PyPI JSON API package record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PypiPackage {
    #[serde(default)]
    pub releases: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub info: PypiInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PypiInfo {
    #[serde(default)]
    pub version: Option<String>,
}

/// A memoised registry answer for one pinned dependency.
#[derive(Debug, Clone, PartialEq)]
pub enum PackageInfo {
    Conda(CondaPackage),
    Pypi(PypiPackage),
}

impl PackageInfo {
    /// Whether the registry knows `version` at all.
    pub fn has_version(&self, version: &str) -> bool {
        match self {
            Self::Conda(pkg) => pkg.versions.iter().any(|v| v == version),
            Self::Pypi(pkg) => pkg.releases.contains_key(version),
        }
    }

    /// Latest version as reported by the registry, when it says.
    pub fn latest(&self) -> Option<&str> {
        match self {
            Self::Conda(pkg) => pkg.latest_version.as_deref(),
            Self::Pypi(pkg) => pkg.info.version.as_deref(),
        }
    }
}

/// Why a registry lookup produced no package record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    Timeout { url: String },
    Connection { url: String, reason: String },
    NotFound { url: String, status: u16 },
    Invalid { url: String, reason: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { url } => write!(f, "request timed out: {url}"),
            Self::Connection { url, reason } => write!(f, "connection failed for {url}: {reason}"),
            Self::NotFound { url, status } => write!(f, "{url} answered HTTP {status}"),
            Self::Invalid { url, reason } => write!(f, "unreadable response from {url}: {reason}"),
        }
    }
}

impl std::error::Error for LookupError {}
