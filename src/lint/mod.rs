// Rule engine: the ordered rule table and the checks it runs.
mod build_files;
mod ci;
mod conda;
mod engine;
mod files;
mod licence;
mod nextflow_config;
mod readme;
mod rules;
mod todos;
mod types;
mod version;

#[cfg(test)]
mod test_support;

pub use engine::Linter;
pub use rules::{RULES, Rule, RuleFn};
pub use types::{
    CondaDependency, CondaEnv, Field, Flow, LintContext, LintReport, ReleaseEnv, Stop,
};
