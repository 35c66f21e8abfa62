use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ledger::Ledger;
use crate::registry::{LookupError, PackageInfo, PackageRegistry};
use crate::workflow::unquote;

use super::engine::Linter;
use super::nextflow_config::NAME_PREFIX;
use super::types::{CondaDependency, CondaEnv, Flow, LintContext};

pub const RULE_ID: u32 = 8;

pub const ENV_FILE: &str = "environment.yml";

pub fn load_env(path: &Path) -> Result<CondaEnv> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&raw).context("invalid conda environment")
}

/// `nf-core-<name>-<version>`
pub fn expected_env_name(pipeline_name: &str, version: &str) -> String {
    format!(
        "{}-{}-{version}",
        NAME_PREFIX.trim_end_matches('/'),
        pipeline_name.to_lowercase()
    )
}

/// Check the environment name and that every dependency is pinned to a
/// known, ideally latest, version.
pub fn check_conda_env_yaml(
    linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if !ctx.has_file(ENV_FILE) {
        return Ok(Flow::Continue);
    }
    let LintContext {
        conda_env: Some(env),
        config,
        pipeline_name,
        package_cache,
        ..
    } = ctx
    else {
        return Ok(Flow::Continue);
    };

    match pipeline_name {
        Some(pipeline_name) => {
            let version = config
                .get("manifest.version")
                .map(|v| unquote(v))
                .unwrap_or_default();
            let expected = expected_env_name(pipeline_name, version);
            if env.name.as_deref() == Some(expected.as_str()) {
                ledger.pass(
                    RULE_ID,
                    format!("Conda environment name was correct ({expected})"),
                );
            } else {
                ledger.fail(
                    RULE_ID,
                    format!(
                        "Conda environment name is incorrect ({}, should be {expected})",
                        env.name.as_deref().unwrap_or("<unset>")
                    ),
                );
            }
        }
        None => log::debug!("pipeline name unknown, skipping conda environment name check"),
    }

    let mut lookups = Lookups {
        registry: linter.registry(),
        channels: &env.channels,
        cache: package_cache,
        ledger,
    };
    for dep in &env.dependencies {
        match dep {
            CondaDependency::Pinned(spec) => lookups.check_conda(spec),
            CondaDependency::Pip { pip } => pip.iter().for_each(|spec| lookups.check_pip(spec)),
            CondaDependency::Other(value) => log::debug!("ignoring dependency entry {value:?}"),
        }
    }

    Ok(Flow::Continue)
}

/// Exactly one `=` between name and version.
pub fn split_pin(spec: &str) -> Option<(&str, &str)> {
    if spec.matches('=').count() != 1 {
        return None;
    }
    spec.split_once('=')
}

struct Lookups<'a> {
    registry: &'a dyn PackageRegistry,
    channels: &'a [String],
    cache: &'a mut HashMap<String, PackageInfo>,
    ledger: &'a mut Ledger,
}

impl Lookups<'_> {
    fn check_conda(&mut self, spec: &str) {
        let Some((name, version)) = split_pin(spec) else {
            self.ledger.fail(
                RULE_ID,
                format!("Conda dependency did not have pinned version number: {spec}"),
            );
            return;
        };
        self.ledger.pass(
            RULE_ID,
            format!("Conda dependency had pinned version number: {spec}"),
        );

        if !self.cache.contains_key(spec) {
            match self.fetch_conda(spec, name) {
                Some(info) => {
                    self.cache.insert(spec.to_string(), info);
                }
                None => return,
            }
        }
        let Some(info) = self.cache.get(spec) else {
            return;
        };

        if !info.has_version(version) {
            self.ledger.fail(
                RULE_ID,
                format!("Conda dependency had an unknown version: {spec}"),
            );
            return;
        }
        match info.latest() {
            Some(latest) if latest != version => self.ledger.warn(
                RULE_ID,
                format!("Conda package is not latest available: {spec}, {latest} available"),
            ),
            _ => self.ledger.pass(
                RULE_ID,
                format!("Conda package is latest available: {spec}"),
            ),
        }
    }

    /// Query channels last-to-first until one knows the package.
    fn fetch_conda(&mut self, spec: &str, name: &str) -> Option<PackageInfo> {
        let (channels, package): (Vec<&str>, &str) = match name.split_once("::") {
            Some((channel, package)) => (vec![channel], package),
            None => (self.channels.iter().map(String::as_str).collect(), name),
        };

        for channel in channels.into_iter().rev() {
            match self.registry.conda_package(channel, package) {
                Ok(pkg) => return Some(PackageInfo::Conda(pkg)),
                Err(LookupError::NotFound { .. }) => continue,
                Err(LookupError::Timeout { url }) => {
                    self.ledger.warn(RULE_ID, format!("Anaconda API timed out: {url}"));
                    return None;
                }
                Err(LookupError::Connection { .. }) => {
                    self.ledger.warn(RULE_ID, "Could not connect to Anaconda API");
                    return None;
                }
                Err(LookupError::Invalid { url, .. }) => {
                    self.ledger.warn(
                        RULE_ID,
                        format!("Anaconda API returned an unreadable response: {url}"),
                    );
                    return None;
                }
            }
        }

        self.ledger.fail(
            RULE_ID,
            format!("Could not find Conda dependency using the Anaconda API: {spec}"),
        );
        None
    }

    fn check_pip(&mut self, spec: &str) {
        let Some((name, version)) = split_pin(spec) else {
            self.ledger.fail(
                RULE_ID,
                format!("Pip dependency did not have pinned version number: {spec}"),
            );
            return;
        };
        self.ledger.pass(
            RULE_ID,
            format!("Pip dependency had pinned version number: {spec}"),
        );

        if !self.cache.contains_key(spec) {
            match self.fetch_pip(spec, name) {
                Some(info) => {
                    self.cache.insert(spec.to_string(), info);
                }
                None => return,
            }
        }
        let Some(info) = self.cache.get(spec) else {
            return;
        };

        if !info.has_version(version) {
            self.ledger.fail(
                RULE_ID,
                format!("PyPi package had an unknown version: {version}"),
            );
            return;
        }
        match info.latest() {
            Some(latest) if latest != version => self.ledger.warn(
                RULE_ID,
                format!("PyPi package is not latest available: {version}, {latest} available"),
            ),
            _ => self.ledger.pass(
                RULE_ID,
                format!("PyPi package is latest available: {version}"),
            ),
        }
    }

    fn fetch_pip(&mut self, spec: &str, name: &str) -> Option<PackageInfo> {
        match self.registry.pypi_package(name) {
            Ok(pkg) => Some(PackageInfo::Pypi(pkg)),
            Err(LookupError::Timeout { url }) => {
                self.ledger.warn(RULE_ID, format!("PyPi API timed out: {url}"));
                None
            }
            Err(LookupError::Connection { url, .. }) => {
                self.ledger.warn(RULE_ID, format!("PyPi API Connection error: {url}"));
                None
            }
            Err(LookupError::Invalid { url, .. }) => {
                self.ledger.warn(
                    RULE_ID,
                    format!("PyPi API returned an unreadable response: {url}"),
                );
                None
            }
            Err(LookupError::NotFound { .. }) => {
                self.ledger.fail(
                    RULE_ID,
                    format!("Could not find pip dependency using the PyPi API: {spec}"),
                );
                None
            }
        }
    }
}
