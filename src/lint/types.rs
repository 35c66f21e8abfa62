use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ledger::Ledger;
use crate::registry::PackageInfo;
use crate::workflow::{FlatConfig, unquote};

/// Mutable state shared by the rules of a single lint run.
///
/// Fields start empty and are filled by the rule that owns them; see
/// [`Field`] and the rule table for who writes what.
#[derive(Debug, Clone, Default)]
pub struct LintContext {
    pub root: PathBuf,
    pub release_mode: bool,
    /// Relative paths confirmed present, including every alternative
    /// spelling of a satisfied file group.
    pub files: BTreeSet<String>,
    pub config: FlatConfig,
    /// Lower-cased pipeline name without the `nf-core/` prefix.
    pub pipeline_name: Option<String>,
    pub min_nextflow_version: Option<String>,
    pub dockerfile: Vec<String>,
    pub singularity: Vec<String>,
    pub conda_env: Option<CondaEnv>,
    /// Registry answers keyed by the dependency string as written.
    pub package_cache: HashMap<String, PackageInfo>,
}

impl LintContext {
    pub fn new(root: &Path, release_mode: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            release_mode,
            ..Self::default()
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn has_file(&self, relative: &str) -> bool {
        self.files.contains(relative)
    }

    /// Config value with surrounding quotes and whitespace removed.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(|v| unquote(v))
    }
}

/// Context fields, used to declare rule inputs and outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Files,
    Config,
    PipelineName,
    MinNextflowVersion,
    Dockerfile,
    Singularity,
    CondaEnv,
    PackageCache,
}

/// What the engine should do after a rule returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The directory is not a pipeline at all; abort the whole run.
    Critical(String),
}

/// Release-tag information taken from the CI environment by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseEnv {
    pub tag: Option<String>,
    pub repo_slug: Option<String>,
}

/// Parsed `environment.yml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CondaEnv {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<CondaDependency>,
}

impl CondaEnv {
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// One entry of the `dependencies` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CondaDependency {
    /// `[channel::]name=version`
    Pinned(String),
    Pip { pip: Vec<String> },
    Other(serde_yaml::Value),
}

/// Why the engine stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stop {
    Completed,
    /// A rule recorded at least one failure.
    Halted { rule: &'static str },
    Critical { message: String },
}

/// Result of one lint run.
#[derive(Debug, Clone)]
pub struct LintReport {
    pub ledger: Ledger,
    pub stop: Stop,
    pub release_mode: bool,
    /// Names of the rules that ran, in order.
    pub executed: Vec<&'static str>,
    pub context: LintContext,
}

impl LintReport {
    pub fn halted_early(&self) -> bool {
        self.stop != Stop::Completed
    }

    pub fn is_critical(&self) -> bool {
        matches!(self.stop, Stop::Critical { .. })
    }

    /// True when nothing failed and the run was not aborted.
    pub fn is_success(&self) -> bool {
        !self.is_critical() && !self.ledger.has_failures()
    }
}
