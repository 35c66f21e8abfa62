use anyhow::Result;

use crate::ledger::Ledger;
use crate::workflow::unquote;

use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 7;

const CONTAINER_KEYS: [&str; 2] = ["params.container", "process.container"];

/// Releases of the tools repository itself carry the tools version.
const TOOLS_REPO_SLUG: &str = "nf-core/tools";

/// Release mode: manifest, container tags and release tag must agree.
pub fn check_version_consistency(
    linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    let mut versions: Vec<(&str, String)> = vec![(
        "manifest.version",
        ctx.config_str("manifest.version").unwrap_or_default().to_string(),
    )];

    for key in CONTAINER_KEYS {
        let container = ctx.config_str(key).unwrap_or_default();
        if container.is_empty() {
            continue;
        }
        let Some((_, tag)) = container.rsplit_once(':') else {
            ledger.fail(
                RULE_ID,
                format!("Docker slug seems not to have a version tag: {container}"),
            );
            return Ok(Flow::Continue);
        };
        versions.push((key, tag.to_string()));
    }

    let release = linter.release_env();
    if let Some(tag) = release.tag.as_deref().filter(|t| !t.is_empty())
        && release.repo_slug.as_deref() != Some(TOOLS_REPO_SLUG)
    {
        versions.push(("TRAVIS_TAG", unquote(tag).to_string()));
    }

    if let Some((source, version)) = versions.iter().find(|(_, v)| !is_numeric_version(v)) {
        ledger.fail(RULE_ID, format!("{source} was not numeric: {version}!"));
        return Ok(Flow::Continue);
    }

    let first = &versions[0].1;
    if versions.iter().any(|(_, v)| v != first) {
        let found: Vec<String> = versions
            .iter()
            .map(|(source, version)| format!("{source} = {version}"))
            .collect();
        ledger.fail(
            RULE_ID,
            format!(
                "The versioning is not consistent between container, release tag and config. Found {}",
                found.join(", ")
            ),
        );
        return Ok(Flow::Continue);
    }

    ledger.pass(
        RULE_ID,
        "Version tags are numeric and consistent between container, release tag and config.",
    );
    Ok(Flow::Continue)
}

/// Digits and dots only, with at least one digit.
fn is_numeric_version(version: &str) -> bool {
    version.chars().any(|c| c.is_ascii_digit())
        && version.chars().all(|c| c.is_ascii_digit() || c == '.')
}
