// Finding ledger: append-only pass/warn/fail record for one lint run.
mod types;

pub use types::{Finding, Severity, Summary};

use serde::Serialize;

/// Three insertion-ordered buckets of findings. Nothing is ever removed or
/// moved between buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    passed: Vec<Finding>,
    warned: Vec<Finding>,
    failed: Vec<Finding>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one finding to the bucket matching `severity`.
    pub fn record(&mut self, id: u32, message: impl Into<String>, severity: Severity) {
        let finding = Finding {
            id,
            message: message.into(),
            severity,
        };
        match severity {
            Severity::Pass => self.passed.push(finding),
            Severity::Warn => self.warned.push(finding),
            Severity::Fail => self.failed.push(finding),
        }
    }

    pub fn pass(&mut self, id: u32, message: impl Into<String>) {
        self.record(id, message, Severity::Pass);
    }

    pub fn warn(&mut self, id: u32, message: impl Into<String>) {
        self.record(id, message, Severity::Warn);
    }

    pub fn fail(&mut self, id: u32, message: impl Into<String>) {
        self.record(id, message, Severity::Fail);
    }

    pub fn bucket(&self, severity: Severity) -> &[Finding] {
        match severity {
            Severity::Pass => &self.passed,
            Severity::Warn => &self.warned,
            Severity::Fail => &self.failed,
        }
    }

    pub fn passed(&self) -> &[Finding] {
        &self.passed
    }

    pub fn warned(&self) -> &[Finding] {
        &self.warned
    }

    pub fn failed(&self) -> &[Finding] {
        &self.failed
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn counts(&self) -> Summary {
        Summary {
            passed: self.passed.len(),
            warned: self.warned.len(),
            failed: self.failed.len(),
        }
    }

    /// Render one bucket as a heading followed by one indented line per
    /// finding. Returns `None` for an empty bucket.
    pub fn render_block(&self, severity: Severity, errors_url: &str) -> Option<String> {
        let findings = self.bucket(severity);
        if findings.is_empty() {
            return None;
        }
        let lines: Vec<String> = findings.iter().map(|f| f.render(errors_url)).collect();
        Some(format!("{}:\n  {}", severity.heading(), lines.join("\n  ")))
    }

    /// Render all non-empty buckets in pass, warn, fail order.
    pub fn render(&self, errors_url: &str) -> String {
        Severity::ALL
            .iter()
            .filter_map(|s| self.render_block(*s, errors_url))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
