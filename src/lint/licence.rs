use anyhow::Result;

use crate::ledger::Ledger;

use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 3;

/// Accepted licence file names, in lookup priority order.
pub const LICENCE_FILES: &[&str] = &["LICENSE", "LICENSE.md", "LICENCE", "LICENCE.md"];

/// Template placeholders from choosealicense.com, opensource.org and Wikipedia.
const PLACEHOLDERS: [&str; 6] = [
    "[year]",
    "[fullname]",
    "<YEAR>",
    "<COPYRIGHT HOLDER>",
    "<year>",
    "<copyright holders>",
];

/// Most MIT variants never spell out "MIT", but all grant rights
/// "without restriction".
const MIT_PHRASE: &str = "without restriction";

/// Copyright, permission, notice and as-is clause.
const MIN_NEWLINES: usize = 4;

/// Check that the first licence file found is a filled-in MIT licence.
pub fn check_licence(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    let Some(name) = LICENCE_FILES.iter().find(|f| ctx.path(f).is_file()) else {
        ledger.fail(RULE_ID, "Couldn't find MIT licence file");
        return Ok(Flow::Continue);
    };

    let content = match std::fs::read_to_string(ctx.path(name)) {
        Ok(c) => c,
        Err(err) => {
            ledger.fail(
                RULE_ID,
                format!("Could not read licence file {name}: {err}"),
            );
            return Ok(Flow::Continue);
        }
    };

    if content.matches('\n').count() < MIN_NEWLINES {
        ledger.fail(
            RULE_ID,
            format!("Number of lines too small for a valid MIT license file: {name}"),
        );
    } else if !content.contains(MIT_PHRASE) {
        ledger.fail(
            RULE_ID,
            format!("Licence file did not look like MIT: {name}"),
        );
    } else if PLACEHOLDERS.iter().any(|p| content.contains(p)) {
        ledger.fail(
            RULE_ID,
            format!("Licence file contains placeholders: {name}"),
        );
    } else {
        ledger.pass(RULE_ID, "Licence check passed");
    }

    Ok(Flow::Continue)
}
