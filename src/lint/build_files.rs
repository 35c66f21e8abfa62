use std::collections::HashSet;

use anyhow::Result;

use crate::ledger::Ledger;

use super::conda;
use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 2;
pub const CONDA_RULE_ID: u32 = 10;

/// Require `FROM ` in the Dockerfile and keep its trimmed lines.
pub fn check_docker(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if let Some(lines) = read_build_file(ctx, ledger, "Dockerfile", "FROM ", "Dockerfile") {
        ctx.dockerfile = lines;
    }
    Ok(Flow::Continue)
}

/// Require `From:` in the Singularity recipe and keep its trimmed lines.
pub fn check_singularity(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if let Some(lines) = read_build_file(ctx, ledger, "Singularity", "From:", "Singularity file") {
        ctx.singularity = lines;
    }
    Ok(Flow::Continue)
}

/// An unreadable or empty file fails the same way as one without `marker`.
fn read_build_file(
    ctx: &LintContext,
    ledger: &mut Ledger,
    file: &str,
    marker: &str,
    label: &str,
) -> Option<Vec<String>> {
    let content = std::fs::read_to_string(ctx.path(file)).unwrap_or_default();
    if content.contains(marker) {
        ledger.pass(RULE_ID, format!("{label} check passed"));
        Some(content.lines().map(|l| l.trim().to_string()).collect())
    } else {
        ledger.fail(RULE_ID, format!("{label} check failed"));
        None
    }
}

pub fn expected_dockerfile_lines(env_name: &str) -> Vec<String> {
    vec![
        "FROM nfcore/base".to_string(),
        "COPY environment.yml /".to_string(),
        "RUN conda env create -f /environment.yml && conda clean -a".to_string(),
        format!("ENV PATH /opt/conda/envs/{env_name}/bin:$PATH"),
    ]
}

pub fn expected_singularity_lines(env_name: &str, version: &str) -> Vec<String> {
    vec![
        "From:nfcore/base".to_string(),
        "Bootstrap:docker".to_string(),
        format!("VERSION {version}"),
        format!("PATH=/opt/conda/envs/{env_name}/bin:$PATH"),
        "export PATH".to_string(),
        "environment.yml /".to_string(),
        "/opt/conda/bin/conda env create -f /environment.yml".to_string(),
        "/opt/conda/bin/conda clean -a".to_string(),
    ]
}

/// Check the Dockerfile installs the conda environment.
pub fn check_conda_dockerfile(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if !ctx.has_file(conda::ENV_FILE) || ctx.dockerfile.is_empty() {
        return Ok(Flow::Continue);
    }
    let Some(env) = &ctx.conda_env else {
        return Ok(Flow::Continue);
    };

    let expected = expected_dockerfile_lines(env.name_or_empty());
    report_missing(ledger, &expected, &ctx.dockerfile, "Dockerfile file");
    Ok(Flow::Continue)
}

/// Check the Singularity recipe installs the conda environment.
pub fn check_conda_singularityfile(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if !ctx.has_file(conda::ENV_FILE) || ctx.singularity.is_empty() {
        return Ok(Flow::Continue);
    }
    let Some(env) = &ctx.conda_env else {
        return Ok(Flow::Continue);
    };

    let version = ctx.config_str("manifest.version").unwrap_or_default();
    let expected = expected_singularity_lines(env.name_or_empty(), version);
    report_missing(ledger, &expected, &ctx.singularity, "Singularity file");
    Ok(Flow::Continue)
}

/// Fail once per expected line absent from `actual`; pass once if none are.
fn report_missing(ledger: &mut Ledger, expected: &[String], actual: &[String], label: &str) {
    let present: HashSet<&str> = actual.iter().map(String::as_str).collect();
    let missing: Vec<&String> = expected
        .iter()
        .filter(|line| !present.contains(line.as_str()))
        .collect();

    if missing.is_empty() {
        ledger.pass(
            CONDA_RULE_ID,
            format!("Found all expected strings in {label}"),
        );
    } else {
        for line in missing {
            ledger.fail(
                CONDA_RULE_ID,
                format!("Could not find {label} string: {line}"),
            );
        }
    }
}
