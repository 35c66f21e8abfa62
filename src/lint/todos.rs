use std::path::Path;

use anyhow::Result;
use walkdir::WalkDir;

use crate::ledger::Ledger;

use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 11;

const MARKER: &str = "TODO nf-core";
const IGNORE_FILE: &str = ".gitignore";

/// Removed from matching lines, in this order.
const STRIP_TOKENS: [&str; 5] = [
    "<!--",
    "-->",
    "# TODO nf-core: ",
    "// TODO nf-core: ",
    "TODO nf-core: ",
];

/// File name plus message text are kept within this many characters.
const MAX_MESSAGE_LEN: usize = 50;

/// Warn about every leftover template TODO in the pipeline tree.
pub fn check_pipeline_todos(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    let ignore = ignore_names(&ctx.root);
    let walker = WalkDir::new(&ctx.root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !ignore.iter().any(|i| e.file_name() == i.as_str()));

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(bytes) = std::fs::read(entry.path()) else {
            log::debug!("skipping unreadable {}", entry.path().display());
            continue;
        };
        let file_name = entry.file_name().to_string_lossy();
        for line in latin1(&bytes).lines().filter(|l| l.contains(MARKER)) {
            ledger.warn(
                RULE_ID,
                format!("TODO string found in '{file_name}': {}", todo_text(&file_name, line)),
            );
        }
    }

    Ok(Flow::Continue)
}

/// `.git` plus the base name of every pattern in the ignore file.
fn ignore_names(root: &Path) -> Vec<String> {
    let mut names = vec![".git".to_string()];
    if let Ok(bytes) = std::fs::read(root.join(IGNORE_FILE)) {
        for line in latin1(&bytes).lines() {
            let pattern = line.trim().trim_end_matches('/');
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }
            let base = pattern.rsplit('/').next().unwrap_or(pattern);
            names.push(base.to_string());
        }
    }
    names
}

/// Byte-for-char decoding; never fails on binary content.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn todo_text(file_name: &str, line: &str) -> String {
    let mut text = line.to_string();
    for token in STRIP_TOKENS {
        text = text.replace(token, "");
    }
    let text = text.trim();

    let name_len = file_name.chars().count();
    if name_len + text.chars().count() > MAX_MESSAGE_LEN {
        let keep = MAX_MESSAGE_LEN.saturating_sub(name_len);
        format!("{}..", text.chars().take(keep).collect::<String>())
    } else {
        text.to_string()
    }
}
