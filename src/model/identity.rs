//! Test identities and source locations.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A position in a test's source code.
///
/// Locations with an empty source are unknown; they arise when a fault has no
/// meaningful position, such as a signal killing the test process.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The source file, as the test reported it.
    pub source: String,
    /// The line within the source file.
    pub line: u32,
}

impl Location {
    /// Constructs a location from a source file and line.
    pub fn new(source: impl Into<String>, line: u32) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }

    /// Constructs an unknown location.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Gets whether this location names a source file.
    ///
    /// # Examples
    ///
    /// ```
    /// use yunit::model::Location;
    /// assert!(Location::new("sample.t.c", 10).is_known());
    /// assert!(!Location::unknown().is_known());
    /// ```
    pub fn is_known(&self) -> bool {
        !self.source.is_empty()
    }
}

/// # Examples
///
/// ```
/// use yunit::model::Location;
/// assert_eq!(Location::new("sample.t.c", 10).to_string(), "sample.t.c:10");
/// assert_eq!(Location::unknown().to_string(), "<unknown>");
/// ```
impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.source, self.line)
        } else {
            f.write_str("<unknown>")
        }
    }
}

/// The identity of a single test: its name and where it was declared.
///
/// Two tests with the same name in the same source file are the same test as
/// far as reporting is concerned.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// The test's name.
    pub name: String,
    /// Where the test was declared.
    #[serde(flatten)]
    pub location: Location,
}

impl Identity {
    /// Constructs an identity.
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.location)
    }
}
