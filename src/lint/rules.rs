use anyhow::Result;

use crate::ledger::Ledger;

use super::engine::Linter;
use super::types::{Field, Flow, LintContext};
use super::{build_files, ci, conda, files, licence, nextflow_config, readme, todos, version};

pub type RuleFn = fn(&Linter<'_>, &mut LintContext, &mut Ledger) -> Result<Flow>;

/// One entry of the rule table.
pub struct Rule {
    pub name: &'static str,
    pub check: RuleFn,
    /// Context fields the rule consumes.
    pub reads: &'static [Field],
    /// Context fields the rule populates.
    pub writes: &'static [Field],
    pub release_only: bool,
}

/// Every rule, in execution order. Later rules consume what earlier ones
/// write, so the order is part of the contract.
pub static RULES: [Rule; 12] = [
    Rule {
        name: "check_files_exist",
        check: files::check_files_exist,
        reads: &[],
        writes: &[Field::Files, Field::CondaEnv],
        release_only: false,
    },
    Rule {
        name: "check_licence",
        check: licence::check_licence,
        reads: &[],
        writes: &[],
        release_only: false,
    },
    Rule {
        name: "check_docker",
        check: build_files::check_docker,
        reads: &[],
        writes: &[Field::Dockerfile],
        release_only: false,
    },
    Rule {
        name: "check_singularity",
        check: build_files::check_singularity,
        reads: &[],
        writes: &[Field::Singularity],
        release_only: false,
    },
    Rule {
        name: "check_nextflow_config",
        check: nextflow_config::check_nextflow_config,
        reads: &[],
        writes: &[Field::Config, Field::PipelineName, Field::MinNextflowVersion],
        release_only: false,
    },
    Rule {
        name: "check_ci_config",
        check: ci::check_ci_config,
        reads: &[Field::Config, Field::MinNextflowVersion],
        writes: &[],
        release_only: false,
    },
    Rule {
        name: "check_readme",
        check: readme::check_readme,
        reads: &[Field::Files, Field::MinNextflowVersion],
        writes: &[],
        release_only: false,
    },
    Rule {
        name: "check_conda_env_yaml",
        check: conda::check_conda_env_yaml,
        reads: &[Field::Files, Field::CondaEnv, Field::Config, Field::PipelineName],
        writes: &[Field::PackageCache],
        release_only: false,
    },
    Rule {
        name: "check_conda_dockerfile",
        check: build_files::check_conda_dockerfile,
        reads: &[Field::Files, Field::CondaEnv, Field::Dockerfile],
        writes: &[],
        release_only: false,
    },
    Rule {
        name: "check_conda_singularityfile",
        check: build_files::check_conda_singularityfile,
        reads: &[Field::Files, Field::CondaEnv, Field::Config, Field::Singularity],
        writes: &[],
        release_only: false,
    },
    Rule {
        name: "check_pipeline_todos",
        check: todos::check_pipeline_todos,
        reads: &[],
        writes: &[],
        release_only: false,
    },
    Rule {
        name: "check_version_consistency",
        check: version::check_version_consistency,
        reads: &[Field::Config],
        writes: &[],
        release_only: true,
    },
];

/// Rules that run for the given mode, in order.
pub fn active(release_mode: bool) -> impl Iterator<Item = &'static Rule> {
    RULES
        .iter()
        .filter(move |rule| release_mode || !rule.release_only)
}
