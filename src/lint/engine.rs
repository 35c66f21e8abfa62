use std::path::Path;

use anyhow::{Context, Result};

use crate::ledger::Ledger;
use crate::registry::PackageRegistry;
use crate::workflow::WorkflowConfigSource;

use super::rules;
use super::types::{Flow, LintContext, LintReport, ReleaseEnv, Stop};

/// Runs the rule table against a pipeline directory.
///
/// Collaborators are borrowed so callers can swap in offline sources.
pub struct Linter<'a> {
    workflow: &'a dyn WorkflowConfigSource,
    registry: &'a dyn PackageRegistry,
    release_env: ReleaseEnv,
}

impl<'a> Linter<'a> {
    pub fn new(workflow: &'a dyn WorkflowConfigSource, registry: &'a dyn PackageRegistry) -> Self {
        Self {
            workflow,
            registry,
            release_env: ReleaseEnv::default(),
        }
    }

    pub fn with_release_env(mut self, release_env: ReleaseEnv) -> Self {
        self.release_env = release_env;
        self
    }

    pub fn workflow(&self) -> &dyn WorkflowConfigSource {
        self.workflow
    }

    pub fn registry(&self) -> &dyn PackageRegistry {
        self.registry
    }

    pub fn release_env(&self) -> &ReleaseEnv {
        &self.release_env
    }

    /// Execute every active rule in order.
    ///
    /// Stops after the first rule that records a failure, or immediately on
    /// the critical condition. Returns `Err` only when a collaborator cannot
    /// provide its data at all.
    pub fn run(&self, pipeline_dir: &Path, release_mode: bool) -> Result<LintReport> {
        let mut ctx = LintContext::new(pipeline_dir, release_mode);
        let mut ledger = Ledger::new();
        let mut executed = Vec::new();
        let mut stop = Stop::Completed;

        for rule in rules::active(release_mode) {
            log::debug!("running {}", rule.name);
            executed.push(rule.name);

            let flow = (rule.check)(self, &mut ctx, &mut ledger)
                .with_context(|| format!("{} could not complete", rule.name))?;

            if let Flow::Critical(message) = flow {
                log::error!("Critical error: {message}");
                log::info!("Stopping tests...");
                stop = Stop::Critical { message };
                break;
            }

            if ledger.has_failures() {
                log::error!("Found test failures in '{}', halting lint run.", rule.name);
                stop = Stop::Halted { rule: rule.name };
                break;
            }
        }

        Ok(LintReport {
            ledger,
            stop,
            release_mode,
            executed,
            context: ctx,
        })
    }
}
