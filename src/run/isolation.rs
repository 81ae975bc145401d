//! How far tests are isolated from the driver.

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Enumeration of fault isolation levels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Isolation {
    /// Run tests on the driver's own thread.
    ///
    /// Panics and reported failures are contained; a test that crashes the
    /// process takes the driver down with it.
    InProcess,
    /// Run each test in a forked child process.
    ///
    /// A test killed by a signal fails with a signal record instead of
    /// killing the driver.  Only available on unix.
    Process,
}

/// String representations of isolation levels.
pub mod string {
    /// String representation of in-process isolation.
    pub const IN_PROCESS: &str = "in-process";
    /// String representation of process isolation.
    pub const PROCESS: &str = "process";
    /// String representations of all isolation levels.
    pub const ALL: &[&str] = &[IN_PROCESS, PROCESS];
}

impl Default for Isolation {
    fn default() -> Self {
        Self::InProcess
    }
}

/// # Examples
///
/// ```
/// use yunit::run::Isolation;
/// assert_eq!(Isolation::Process.to_string(), "process");
/// ```
impl Display for Isolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::InProcess => string::IN_PROCESS,
            Self::Process => string::PROCESS,
        })
    }
}

/// # Examples
///
/// ```
/// use yunit::run::Isolation;
/// assert_eq!("in-process".parse(), Ok(Isolation::InProcess));
/// assert_eq!("PROCESS".parse(), Ok(Isolation::Process));
/// assert!("thread".parse::<Isolation>().is_err());
/// ```
impl FromStr for Isolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            string::IN_PROCESS => Ok(Self::InProcess),
            string::PROCESS => Ok(Self::Process),
            _ => Err(s.to_owned()),
        }
    }
}

impl Isolation {
    /// Gets whether this isolation level works on the current platform.
    pub fn is_available(self) -> bool {
        match self {
            Self::InProcess => true,
            Self::Process => cfg!(unix),
        }
    }
}
