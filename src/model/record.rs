//! Error records produced when a test phase does not succeed.

use super::identity::Location;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// How a phase came to produce a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    /// A deliberate assertion failure raised by the test.
    Failure,
    /// An error the test reported about itself through its logger.
    Reported,
    /// A panic carrying a diagnostic string.
    Panic,
    /// A panic with a payload of unrecognised type.
    Unknown,
    /// The test process was killed by a signal.
    Signal,
    /// The test process exited before the phase finished.
    Exit,
}

impl Kind {
    /// Gets whether records of this kind are assertion failures rather than
    /// unexpected errors.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failure)
    }
}

/// A `(source, line, message)` triple describing an unsuccessful phase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// How the record arose.
    pub kind: Kind,
    /// Where the record points.
    pub location: Location,
    /// The human-readable message.
    pub message: String,
}

impl Record {
    /// Constructs a record.
    pub fn new(kind: Kind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }

    /// Replaces an unknown location with `declared`.
    ///
    /// Signal records keep their unknown location: the fault happened
    /// somewhere in the process, not necessarily in the test.
    #[must_use]
    pub fn or_declared(mut self, declared: &Location) -> Self {
        if !self.location.is_known() && self.kind != Kind::Signal {
            self.location = declared.clone();
        }
        self
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
