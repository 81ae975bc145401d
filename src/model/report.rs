//! The [Report] type.

use super::{identity::Identity, phase, verdict::Verdict};
use serde::{Deserialize, Serialize};
use std::vec::Vec;

/// A final report of everything that happened during a run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Report {
    /// Counts of each verdict.
    pub tally: Tally,

    /// Whether the run was halted before every test had been attempted.
    pub halted: bool,

    /// Reports for each test, in execution order.
    pub tests: Vec<Test>,
}

impl Report {
    /// Adds a test to the report, updating aggregates accordingly.
    pub fn insert(&mut self, test: Test) {
        self.tally.add(test.verdict);
        self.tests.push(test);
    }

    /// Gets whether no test in the report failed.
    pub fn is_success(&self) -> bool {
        self.tally.failed == 0
    }

    /// Gets the overall verdict of the run, if any test was seen.
    pub fn verdict(&self) -> Option<Verdict> {
        self.tests.iter().map(|t| t.verdict).max()
    }
}

/// Pass/fail/ignored counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Tests where every phase succeeded.
    pub passed: usize,
    /// Tests where some phase failed.
    pub failed: usize,
    /// Tests that were ignored.
    pub ignored: usize,
}

impl Tally {
    /// Counts one more test with verdict `v`.
    pub fn add(&mut self, v: Verdict) {
        let count = match v {
            Verdict::Pass => &mut self.passed,
            Verdict::Fail => &mut self.failed,
            Verdict::Ignored => &mut self.ignored,
        };
        *count = count.saturating_add(1);
    }

    /// Gets the number of tests counted.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.ignored
    }
}

/// A report for a single test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    /// Which test this is.
    #[serde(flatten)]
    pub identity: Identity,

    /// The aggregate verdict.
    pub verdict: Verdict,

    /// The outcome of every attempted phase, in order.
    pub phases: Vec<Phase>,
}

impl Test {
    /// Starts a report for the test `identity`, with no phases yet.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            verdict: Verdict::Ignored,
            phases: vec![],
        }
    }

    /// Iterates over every unsuccessful phase.
    pub fn problems(&self) -> impl Iterator<Item = &Phase> + '_ {
        self.phases.iter().filter(|p| !p.outcome.is_success())
    }
}

/// A report for a single phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    /// The phase.
    pub phase: phase::Phase,

    /// What happened.
    #[serde(flatten)]
    pub outcome: phase::PhaseOutcome,
}
