use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use super::WorkflowConfigSource;
use super::flat::{FlatConfig, parse_flat_config};

/// Fetches configuration by running `nextflow config -flat <dir>`.
pub struct NextflowCli {
    binary: String,
}

impl NextflowCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl WorkflowConfigSource for NextflowCli {
    fn fetch(&self, pipeline_dir: &Path) -> Result<FlatConfig> {
        log::debug!("running `{} config -flat {}`", self.binary, pipeline_dir.display());
        let output = Command::new(&self.binary)
            .arg("config")
            .arg("-flat")
            .arg(pipeline_dir)
            .stdin(Stdio::null())
            .output()
            .with_context(|| {
                format!("failed to invoke `{}`; is Nextflow installed and on PATH?", self.binary)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{} config -flat` failed ({}): {}",
                self.binary,
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_flat_config(&stdout))
    }
}

/// A configuration that was flattened ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub FlatConfig);

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl WorkflowConfigSource for StaticConfig {
    fn fetch(&self, _pipeline_dir: &Path) -> Result<FlatConfig> {
        Ok(self.0.clone())
    }
}
