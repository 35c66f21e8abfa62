// Shared fixtures for the rule unit tests.
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::registry::{CondaPackage, LookupError, PackageRegistry, PypiInfo, PypiPackage};
use crate::workflow::StaticConfig;

/// Write `content` to `dir/relative`, creating parent directories.
pub fn touch(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A flattened config that satisfies every config check.
pub fn valid_config() -> StaticConfig {
    [
        ("manifest.name", "'nf-core/demo'"),
        ("manifest.nextflowVersion", "'>=0.32.0'"),
        ("manifest.description", "'Demo pipeline'"),
        ("manifest.version", "'1.0'"),
        ("manifest.homePage", "'https://github.com/nf-core/demo'"),
        ("manifest.mainScript", "'main.nf'"),
        ("timeline.enabled", "true"),
        ("timeline.file", "'results/timeline.html'"),
        ("trace.enabled", "true"),
        ("trace.file", "'results/trace.txt'"),
        ("report.enabled", "true"),
        ("report.file", "'results/report.html'"),
        ("dag.enabled", "true"),
        ("dag.file", "'results/dag.svg'"),
        ("process.cpus", "1"),
        ("process.memory", "'8 GB'"),
        ("process.time", "'2d'"),
        ("process.container", "'nfcore/demo:1.0'"),
        ("params.outdir", "'./results'"),
        ("params.reads", "'data/*{1,2}.fastq.gz'"),
        ("params.container", "'nfcore/demo:1.0'"),
        ("params.singleEnd", "false"),
    ]
    .into_iter()
    .collect()
}

/// Registry that is never reachable.
pub struct NoRegistry;

impl PackageRegistry for NoRegistry {
    fn conda_url(&self, channel: &str, name: &str) -> String {
        format!("offline://conda/{channel}/{name}")
    }

    fn pypi_url(&self, name: &str) -> String {
        format!("offline://pypi/{name}")
    }

    fn conda_package(&self, channel: &str, name: &str) -> Result<CondaPackage, LookupError> {
        Err(LookupError::Connection {
            url: self.conda_url(channel, name),
            reason: "offline".into(),
        })
    }

    fn pypi_package(&self, name: &str) -> Result<PypiPackage, LookupError> {
        Err(LookupError::Connection {
            url: self.pypi_url(name),
            reason: "offline".into(),
        })
    }
}

/// In-memory registry that records every lookup.
///
/// Unknown packages answer `NotFound`; names registered with
/// [`FakeRegistry::timeout_on`] or [`FakeRegistry::connection_error_on`]
/// fail that way on every channel.
#[derive(Default)]
pub struct FakeRegistry {
    conda: BTreeMap<(String, String), CondaPackage>,
    pypi: BTreeMap<String, PypiPackage>,
    timeouts: BTreeSet<String>,
    unreachable: BTreeSet<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeRegistry {
    pub fn conda(
        mut self,
        channel: &str,
        name: &str,
        versions: &[&str],
        latest: Option<&str>,
    ) -> Self {
        self.conda.insert(
            (channel.to_string(), name.to_string()),
            CondaPackage {
                versions: versions.iter().map(|v| v.to_string()).collect(),
                latest_version: latest.map(str::to_string),
            },
        );
        self
    }

    pub fn pypi(mut self, name: &str, versions: &[&str], latest: Option<&str>) -> Self {
        self.pypi.insert(
            name.to_string(),
            PypiPackage {
                releases: versions
                    .iter()
                    .map(|v| (v.to_string(), serde_json::Value::Array(Vec::new())))
                    .collect(),
                info: PypiInfo {
                    version: latest.map(str::to_string),
                },
            },
        );
        self
    }

    pub fn timeout_on(mut self, name: &str) -> Self {
        self.timeouts.insert(name.to_string());
        self
    }

    pub fn connection_error_on(mut self, name: &str) -> Self {
        self.unreachable.insert(name.to_string());
        self
    }

    /// Lookups in call order, as `conda {channel}/{name}` or `pypi {name}`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn failure(&self, name: &str, url: String) -> Option<LookupError> {
        if self.timeouts.contains(name) {
            Some(LookupError::Timeout { url })
        } else if self.unreachable.contains(name) {
            Some(LookupError::Connection {
                url,
                reason: "connection refused".into(),
            })
        } else {
            None
        }
    }
}

impl PackageRegistry for FakeRegistry {
    fn conda_url(&self, channel: &str, name: &str) -> String {
        format!("fake://conda/{channel}/{name}")
    }

    fn pypi_url(&self, name: &str) -> String {
        format!("fake://pypi/{name}")
    }

    fn conda_package(&self, channel: &str, name: &str) -> Result<CondaPackage, LookupError> {
        self.calls.borrow_mut().push(format!("conda {channel}/{name}"));
        let url = self.conda_url(channel, name);
        if let Some(err) = self.failure(name, url.clone()) {
            return Err(err);
        }
        self.conda
            .get(&(channel.to_string(), name.to_string()))
            .cloned()
            .ok_or(LookupError::NotFound { url, status: 404 })
    }

    fn pypi_package(&self, name: &str) -> Result<PypiPackage, LookupError> {
        self.calls.borrow_mut().push(format!("pypi {name}"));
        let url = self.pypi_url(name);
        if let Some(err) = self.failure(name, url.clone()) {
            return Err(err);
        }
        self.pypi
            .get(name)
            .cloned()
            .ok_or(LookupError::NotFound { url, status: 404 })
    }
}
