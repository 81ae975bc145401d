//! Test lifecycle phases and their outcomes.

use super::record::{Kind, Record};
use super::identity::Location;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One of the three lifecycle phases of a test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "setUp")]
    SetUp,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "tearDown")]
    TearDown,
}

impl Phase {
    /// Gets every phase, in execution order.
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::SetUp, Self::Test, Self::TearDown].into_iter()
    }
}

/// # Examples
///
/// ```
/// use yunit::model::Phase;
/// let names: Vec<String> = Phase::all().map(|p| p.to_string()).collect();
/// assert_eq!(names, ["setUp", "test", "tearDown"]);
/// ```
impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SetUp => "setUp",
            Self::Test => "test",
            Self::TearDown => "tearDown",
        })
    }
}

/// The outcome of running one phase.
///
/// Every attempted phase has exactly one outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PhaseOutcome {
    /// The phase ran to completion without reporting anything.
    Success,
    /// The phase raised an assertion failure.
    Failure(Record),
    /// The phase hit an unexpected error.
    Error(Record),
}

impl PhaseOutcome {
    /// Wraps a record as a failure or an error depending on its kind.
    pub fn of_record(record: Record) -> Self {
        if record.kind.is_failure() {
            Self::Failure(record)
        } else {
            Self::Error(record)
        }
    }

    /// Gets whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Gets the record behind a non-successful outcome.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Success => None,
            Self::Failure(r) | Self::Error(r) => Some(r),
        }
    }

    /// Replaces any unknown location in the record with `declared`.
    #[must_use]
    pub fn or_declared(self, declared: &Location) -> Self {
        match self {
            Self::Success => Self::Success,
            Self::Failure(r) => Self::Failure(r.or_declared(declared)),
            Self::Error(r) => Self::Error(r.or_declared(declared)),
        }
    }

    /// Gets the kind of the record behind a non-successful outcome.
    pub fn kind(&self) -> Option<Kind> {
        self.record().map(|r| r.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Records are sorted into failures and errors by kind.
    fn test_of_record() {
        let loc = Location::new("a.c", 1);
        assert!(matches!(
            PhaseOutcome::of_record(Record::new(Kind::Failure, loc.clone(), "x")),
            PhaseOutcome::Failure(_)
        ));
        for kind in [Kind::Reported, Kind::Panic, Kind::Unknown, Kind::Signal, Kind::Exit] {
            assert!(matches!(
                PhaseOutcome::of_record(Record::new(kind, loc.clone(), "x")),
                PhaseOutcome::Error(_)
            ));
        }
    }

    #[test]
    /// Outcomes serialise with a status tag next to the record fields.
    fn test_outcome_json() {
        let o = PhaseOutcome::Failure(Record::new(
            Kind::Failure,
            Location::new("sample.t.c", 10),
            "false != true",
        ));
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["status"], "failure");
        assert_eq!(v["location"]["line"], 10);
        assert_eq!(v["message"], "false != true");

        let v = serde_json::to_value(&PhaseOutcome::Success).unwrap();
        assert_eq!(v["status"], "success");
    }
}
