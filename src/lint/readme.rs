use anyhow::{Context, Result};
use regex::Regex;

use crate::ledger::Ledger;

use super::conda;
use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 6;

const README: &str = "README.md";

const NEXTFLOW_BADGE_PATTERN: &str = r"\[!\[Nextflow\]\(https://img\.shields\.io/badge/nextflow-%E2%89%A5([\d\.]+)-brightgreen\.svg\)\]\(https://www\.nextflow\.io/\)";

const BIOCONDA_BADGE: &str = "[![install with bioconda](https://img.shields.io/badge/install%20with-bioconda-brightgreen.svg)](http://bioconda.github.io/)";

/// Check the README badges agree with the config and environment file.
pub fn check_readme(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    if !ctx.has_file(README) {
        return Ok(Flow::Continue);
    }
    let content = match std::fs::read_to_string(ctx.path(README)) {
        Ok(c) => c,
        Err(err) => {
            ledger.fail(RULE_ID, format!("Could not read {README}: {err}"));
            return Ok(Flow::Continue);
        }
    };

    let badge_re = Regex::new(NEXTFLOW_BADGE_PATTERN).context("invalid badge pattern")?;
    let config_version = ctx.min_nextflow_version.as_deref().unwrap_or_default();
    match badge_re.captures(&content).and_then(|caps| caps.get(1)) {
        Some(m) => {
            let badge_version = m.as_str().trim_matches(|c| c == '\'' || c == '"');
            if ctx.min_nextflow_version.as_deref() == Some(badge_version) {
                ledger.pass(
                    RULE_ID,
                    format!(
                        "README Nextflow minimum version badge matched config. Badge: '{badge_version}', Config: '{config_version}'"
                    ),
                );
            } else {
                ledger.fail(
                    RULE_ID,
                    format!(
                        "README Nextflow minimum version badge does not match config. Badge: '{badge_version}', Config: '{config_version}'"
                    ),
                );
            }
        }
        // Cosmetic only, unlike the bioconda badge below.
        None => ledger.warn(
            RULE_ID,
            "README did not have a Nextflow minimum version badge.",
        ),
    }

    if ctx.has_file(conda::ENV_FILE) {
        if content.contains(BIOCONDA_BADGE) {
            ledger.pass(RULE_ID, "README had a bioconda badge");
        } else {
            ledger.fail(
                RULE_ID,
                "Found a bioconda environment.yml file but no badge in the README",
            );
        }
    }

    Ok(Flow::Continue)
}
