use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Outcome bucket of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Pass,
    Warn,
    Fail,
}

impl Severity {
    /// Buckets in report order.
    pub const ALL: [Severity; 3] = [Severity::Pass, Severity::Warn, Severity::Fail];

    fn rank(self) -> u8 {
        match self {
            Self::Fail => 2,
            Self::Warn => 1,
            Self::Pass => 0,
        }
    }

    /// Heading used for this bucket in the text report.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Pass => "Test Passed",
            Self::Warn => "Test Warnings",
            Self::Fail => "Test Failures",
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Warn => f.write_str("warn"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// A single rule result. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub id: u32,
    pub message: String,
    #[serde(skip)]
    pub severity: Severity,
}

impl Finding {
    /// Format as `<errors_url>#<id>: <message>`.
    pub fn render(&self, errors_url: &str) -> String {
        format!("{errors_url}#{}: {}", self.id, self.message)
    }
}

/// Bucket sizes of a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4} tests passed{:>4} tests had warnings{:>4} tests failed",
            self.passed, self.warned, self.failed
        )
    }
}
