use anyhow::Result;

use crate::ledger::{Ledger, Severity};

use super::conda;
use super::engine::Linter;
use super::licence::LICENCE_FILES;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 1;

/// At least one of these must exist for the directory to be a pipeline.
const CRITICAL_FILES: [&str; 2] = ["nextflow.config", "main.nf"];

/// Either dotted CircleCI spelling satisfies the group; only `circle.yml`
/// is read by the CI rule.
const CI_FILES: &[&str] = &[".travis.yml", ".circle.yml", "circle.yml"];

/// Each entry is satisfied when any of its alternatives exists.
const REQUIRED_FILES: &[&[&str]] = &[
    &["nextflow.config"],
    &["Dockerfile"],
    &["Singularity"],
    CI_FILES,
    LICENCE_FILES,
    &["README.md"],
    &["CHANGELOG.md"],
    &["docs/README.md"],
    &["docs/output.md"],
    &["docs/usage.md"],
];

const RECOMMENDED_FILES: &[&[&str]] = &[&["main.nf"], &["environment.yml"], &["conf/base.config"]];

/// Record which expected files exist and load `environment.yml` for later
/// rules.
pub fn check_files_exist(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if !CRITICAL_FILES.iter().any(|f| ctx.path(f).is_file()) {
        return Ok(Flow::Critical(
            "Neither nextflow.config or main.nf found! Is this a Nextflow pipeline?".into(),
        ));
    }

    for group in REQUIRED_FILES {
        check_group(ctx, ledger, group, Severity::Fail);
    }
    for group in RECOMMENDED_FILES {
        check_group(ctx, ledger, group, Severity::Warn);
    }

    if ctx.has_file(conda::ENV_FILE) {
        match conda::load_env(&ctx.path(conda::ENV_FILE)) {
            Ok(env) => ctx.conda_env = Some(env),
            Err(err) => ledger.fail(
                conda::RULE_ID,
                format!("Could not parse {}: {err:#}", conda::ENV_FILE),
            ),
        }
    }

    Ok(Flow::Continue)
}

fn check_group(ctx: &mut LintContext, ledger: &mut Ledger, group: &[&str], missing: Severity) {
    let label = describe(group);
    if group.iter().any(|f| ctx.path(f).is_file()) {
        ledger.pass(RULE_ID, format!("File found: {label}"));
        // All spellings count as discovered so later rules can gate on any.
        ctx.files.extend(group.iter().map(|f| f.to_string()));
    } else {
        ledger.record(RULE_ID, format!("File not found: {label}"), missing);
    }
}

fn describe(group: &[&str]) -> String {
    match group {
        [single] => single.to_string(),
        _ => format!("[{}]", group.join(", ")),
    }
}
