use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tool settings. Every field has a default so a partial `.nflint.yml` is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable used to flatten the pipeline configuration.
    pub nextflow_binary: String,
    /// Per-request bound for registry lookups, in seconds.
    pub http_timeout: u64,
    pub anaconda_api: String,
    pub pypi_api: String,
    /// Prefix of the per-rule documentation anchors in the report.
    pub errors_url: String,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nextflow_binary: "nextflow".to_string(),
            http_timeout: 10,
            anaconda_api: "https://api.anaconda.org/package".to_string(),
            pypi_api: "https://pypi.python.org/pypi".to_string(),
            errors_url: "http://nf-co.re/errors".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: Config = serde_yaml::from_str("http_timeout: 3\n").unwrap();
        assert_eq!(cfg.http_timeout, 3);
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.nextflow_binary, "nextflow");
        assert_eq!(cfg.errors_url, "http://nf-co.re/errors");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg: Config = serde_yaml::from_str("colour: always\n").unwrap();
        assert_eq!(cfg, Config::default());
    }
}
