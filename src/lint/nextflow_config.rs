use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;

use crate::ledger::Ledger;
use crate::workflow::unquote;

use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 4;

pub const NAME_PREFIX: &str = "nf-core/";
const HOMEPAGE_PREFIX: &str = "https://github.com/nf-core/";

const REQUIRED_KEYS: [&str; 13] = [
    "manifest.name",
    "manifest.nextflowVersion",
    "manifest.description",
    "manifest.version",
    "manifest.homePage",
    "timeline.enabled",
    "trace.enabled",
    "report.enabled",
    "dag.enabled",
    "process.cpus",
    "process.memory",
    "process.time",
    "params.outdir",
];

const RECOMMENDED_KEYS: [&str; 9] = [
    "manifest.mainScript",
    "timeline.file",
    "trace.file",
    "report.file",
    "dag.file",
    "params.reads",
    "process.container",
    "params.container",
    "params.singleEnd",
];

const DEPRECATED_KEYS: [&str; 2] = ["params.version", "params.nf_required_version"];

const ENABLED_FLAGS: [&str; 4] = [
    "timeline.enabled",
    "report.enabled",
    "trace.enabled",
    "dag.enabled",
];

/// `process.$name.setting` is the pre-`withName` selector syntax.
const DEPRECATED_PROCESS_PATTERN: &str = r"^(process\.\$.*?)\.+.*$";

/// Fetch the flattened config and check it against the guideline keys.
///
/// Populates `config`, and on success `pipeline_name` and
/// `min_nextflow_version`.
pub fn check_nextflow_config(
    linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    ctx.config = linter
        .workflow()
        .fetch(&ctx.root)
        .context("failed to read the pipeline configuration")?;

    for key in REQUIRED_KEYS {
        if ctx.config.contains_key(key) {
            ledger.pass(RULE_ID, format!("Config variable found: {key}"));
        } else {
            ledger.fail(RULE_ID, format!("Config variable not found: {key}"));
        }
    }
    for key in RECOMMENDED_KEYS {
        if ctx.config.contains_key(key) {
            ledger.pass(RULE_ID, format!("Config variable found: {key}"));
        } else {
            ledger.warn(RULE_ID, format!("Config variable not found: {key}"));
        }
    }
    for key in DEPRECATED_KEYS {
        if ctx.config.contains_key(key) {
            ledger.fail(
                RULE_ID,
                format!("Config variable (incorrectly) found: {key}"),
            );
        } else {
            ledger.pass(
                RULE_ID,
                format!("Config variable (correctly) not found: {key}"),
            );
        }
    }

    let deprecated = Regex::new(DEPRECATED_PROCESS_PATTERN)
        .context("invalid deprecated process pattern")?;
    let selectors: BTreeSet<&str> = ctx
        .config
        .keys()
        .filter_map(|key| deprecated.captures(key))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();
    for selector in selectors {
        ledger.warn(
            RULE_ID,
            format!("Process configuration is done with deprecated_syntax: {selector}"),
        );
    }

    for key in ENABLED_FLAGS {
        match ctx.config.get(key).map(String::as_str) {
            Some("true") => ledger.pass(
                RULE_ID,
                format!("Config variable '{key}' had correct value: true"),
            ),
            other => ledger.fail(
                RULE_ID,
                format!(
                    "Config variable '{key}' did not have correct value: {}",
                    other.unwrap_or("<unset>")
                ),
            ),
        }
    }

    ctx.pipeline_name = check_name(ctx, ledger);
    check_homepage(ctx, ledger);

    if let Some(dag_file) = ctx.config_str("dag.file") {
        if dag_file.ends_with(".svg") {
            ledger.pass(RULE_ID, "Config variable 'dag.file' ended with .svg");
        } else {
            ledger.fail(RULE_ID, "Config variable 'dag.file' did not end with .svg");
        }
    }

    ctx.min_nextflow_version = check_nextflow_version(ctx, ledger);

    Ok(Flow::Continue)
}

/// Returns the lower-cased name suffix when the name carries the namespace.
fn check_name(ctx: &LintContext, ledger: &mut Ledger) -> Option<String> {
    let name = ctx.config_str("manifest.name").unwrap_or_default();
    match name.strip_prefix(NAME_PREFIX) {
        Some(suffix) => {
            ledger.pass(
                RULE_ID,
                format!("Config variable 'manifest.name' began with '{NAME_PREFIX}'"),
            );
            Some(suffix.to_lowercase())
        }
        None => {
            ledger.fail(
                RULE_ID,
                format!(
                    "Config variable 'manifest.name' did not begin with {NAME_PREFIX}:\n    {name}"
                ),
            );
            None
        }
    }
}

fn check_homepage(ctx: &LintContext, ledger: &mut Ledger) {
    let homepage = ctx.config_str("manifest.homePage").unwrap_or_default();
    if homepage.starts_with(HOMEPAGE_PREFIX) {
        ledger.pass(
            RULE_ID,
            format!("Config variable 'manifest.homePage' began with '{HOMEPAGE_PREFIX}'"),
        );
    } else {
        ledger.fail(
            RULE_ID,
            format!(
                "Config variable 'manifest.homePage' did not begin with {HOMEPAGE_PREFIX}:\n    {homepage}"
            ),
        );
    }
}

/// Returns the bare minimum version (`>=0.32.0` → `0.32.0`).
fn check_nextflow_version(ctx: &LintContext, ledger: &mut Ledger) -> Option<String> {
    let raw = ctx.config.get("manifest.nextflowVersion")?;
    let constraint = unquote(raw);
    let Some(rest) = constraint.strip_prefix(">=") else {
        ledger.fail(
            RULE_ID,
            format!(
                "Config variable 'manifest.nextflowVersion' did not start with '>=' : '{constraint}'"
            ),
        );
        return None;
    };

    ledger.pass(
        RULE_ID,
        "Config variable 'manifest.nextflowVersion' started with >=",
    );
    Some(
        rest.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::test_support::{NoRegistry, valid_config};
    use crate::workflow::StaticConfig;

    fn run(source: &StaticConfig) -> (LintContext, Ledger) {
        let linter = Linter::new(source, &NoRegistry);
        let mut ctx = LintContext::new(std::path::Path::new("."), false);
        let mut ledger = Ledger::new();
        check_nextflow_config(&linter, &mut ctx, &mut ledger).unwrap();
        (ctx, ledger)
    }

    fn failures(ledger: &Ledger) -> Vec<&str> {
        ledger.failed().iter().map(|f| f.message.as_str()).collect()
    }

    #[test]
    fn valid_config_passes_and_derives_context() {
        let (ctx, ledger) = run(&valid_config());
        assert!(failures(&ledger).is_empty(), "{:?}", failures(&ledger));
        assert_eq!(ctx.pipeline_name.as_deref(), Some("demo"));
        assert_eq!(ctx.min_nextflow_version.as_deref(), Some("0.32.0"));
        assert_eq!(ctx.config["manifest.version"], "'1.0'");
    }

    #[test]
    fn missing_required_key_fails_and_recommended_warns() {
        let mut source = valid_config();
        source.0.remove("params.outdir");
        source.0.remove("params.reads");
        let (_, ledger) = run(&source);
        assert_eq!(failures(&ledger), vec!["Config variable not found: params.outdir"]);
        assert!(
            ledger
                .warned()
                .iter()
                .any(|f| f.message == "Config variable not found: params.reads")
        );
    }

    #[test]
    fn deprecated_key_present_fails() {
        let mut source = valid_config();
        source.0.insert("params.version".into(), "'1.0'".into());
        let (_, ledger) = run(&source);
        assert_eq!(
            failures(&ledger),
            vec!["Config variable (incorrectly) found: params.version"]
        );
    }

    #[test]
    fn deprecated_process_selectors_warn_once_each() {
        let mut source = valid_config();
        for key in [
            "process.$fastqc.cpus",
            "process.$fastqc.memory",
            "process.$multiqc.time",
        ] {
            source.0.insert(key.into(), "1".into());
        }
        let (_, ledger) = run(&source);
        let warned: Vec<_> = ledger
            .warned()
            .iter()
            .filter(|f| f.message.contains("deprecated_syntax"))
            .map(|f| f.message.as_str())
            .collect();
        assert_eq!(
            warned,
            vec![
                "Process configuration is done with deprecated_syntax: process.$fastqc",
                "Process configuration is done with deprecated_syntax: process.$multiqc",
            ]
        );
    }

    #[test]
    fn enabled_flags_must_be_literal_true() {
        let mut source = valid_config();
        source.0.insert("trace.enabled".into(), "false".into());
        source.0.insert("dag.enabled".into(), "'true'".into());
        let (_, ledger) = run(&source);
        assert_eq!(
            failures(&ledger),
            vec![
                "Config variable 'trace.enabled' did not have correct value: false",
                "Config variable 'dag.enabled' did not have correct value: 'true'",
            ]
        );
    }

    #[test]
    fn foreign_name_leaves_pipeline_name_unset() {
        let mut source = valid_config();
        source.0.insert("manifest.name".into(), "'someone/demo'".into());
        let (ctx, ledger) = run(&source);
        assert!(ctx.pipeline_name.is_none());
        assert_eq!(
            failures(&ledger),
            vec!["Config variable 'manifest.name' did not begin with nf-core/:\n    someone/demo"]
        );
    }

    #[test]
    fn pipeline_name_is_lower_cased() {
        let mut source = valid_config();
        source.0.insert("manifest.name".into(), "\"nf-core/RNAseq\"".into());
        let (ctx, _) = run(&source);
        assert_eq!(ctx.pipeline_name.as_deref(), Some("rnaseq"));
    }

    #[test]
    fn homepage_and_dag_file_are_checked() {
        let mut source = valid_config();
        source.0.insert("manifest.homePage".into(), "'https://example.org'".into());
        source.0.insert("dag.file".into(), "'results/dag.png'".into());
        let (_, ledger) = run(&source);
        assert_eq!(
            failures(&ledger),
            vec![
                "Config variable 'manifest.homePage' did not begin with https://github.com/nf-core/:\n    https://example.org",
                "Config variable 'dag.file' did not end with .svg",
            ]
        );
    }

    #[test]
    fn version_without_comparator_is_not_stored() {
        let mut source = valid_config();
        source.0.insert("manifest.nextflowVersion".into(), "'0.32.0'".into());
        let (ctx, ledger) = run(&source);
        assert!(ctx.min_nextflow_version.is_none());
        assert_eq!(
            failures(&ledger),
            vec!["Config variable 'manifest.nextflowVersion' did not start with '>=' : '0.32.0'"]
        );
    }

    #[test]
    fn fetch_error_propagates() {
        struct Broken;
        impl crate::workflow::WorkflowConfigSource for Broken {
            fn fetch(&self, _: &std::path::Path) -> Result<crate::workflow::FlatConfig> {
                anyhow::bail!("nextflow exploded")
            }
        }
        let linter = Linter::new(&Broken, &NoRegistry);
        let mut ctx = LintContext::default();
        let mut ledger = Ledger::new();
        let err = check_nextflow_config(&linter, &mut ctx, &mut ledger).unwrap_err();
        assert!(format!("{err:#}").contains("nextflow exploded"));
        assert_eq!(ledger, Ledger::new());
    }
}
