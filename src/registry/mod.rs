// Package registries: Anaconda and PyPI metadata lookups.
mod http;
mod types;

pub use http::HttpRegistry;
pub use types::{CondaPackage, LookupError, PackageInfo, PypiInfo, PypiPackage};

/// Read-only package metadata provider.
///
/// Implementations must distinguish timeouts, connection failures and
/// missing packages through [`LookupError`].
pub trait PackageRegistry {
    /// Endpoint queried for a conda package in `channel`; used in messages.
    fn conda_url(&self, channel: &str, name: &str) -> String;

    /// Endpoint queried for a PyPI package; used in messages.
    fn pypi_url(&self, name: &str) -> String;

    fn conda_package(&self, channel: &str, name: &str) -> Result<CondaPackage, LookupError>;

    fn pypi_package(&self, name: &str) -> Result<PypiPackage, LookupError>;
}
