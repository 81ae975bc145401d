//! Enumerated selection of outputs, for use in command-line selection.

use super::{abs, console, err, json};
use std::{io::Write, str::FromStr};

/// Enumeration of outputter choices.
///
/// This is not serialisable or deserialisable as it is not stored in runner
/// config.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Choice {
    /// Selects the console outputter.
    Console,
    /// Selects the JSON outputter.
    Json,
}

impl Choice {
    /// Constructs the appropriate outputter for the choice, using the given
    /// writer.
    pub fn into_outputter<'a, W: Write + 'a>(self, writer: W) -> Box<dyn abs::Outputter + 'a> {
        match self {
            Self::Console => Box::new(console::Console::new(writer)),
            Self::Json => Box::new(json::Json::new(writer)),
        }
    }

    /// Gets an iterator of all available choices.
    pub fn all() -> impl Iterator<Item = Self> {
        vec![Self::Console, Self::Json].into_iter()
    }
}

/// Strings used when mapping outputter choices to command-line arguments.
pub mod string {
    /// The string representation for the console outputter.
    pub const CONSOLE: &str = "console";
    /// The string representation for the JSON outputter.
    pub const JSON: &str = "json";

    /// List of all possible string representations of outputter choices.
    pub const ALL: &[&str] = &[CONSOLE, JSON];
}

/// The default outputter is the console.
impl Default for Choice {
    fn default() -> Self {
        Self::Console
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Console => string::CONSOLE,
            Self::Json => string::JSON,
        })
    }
}

/// # Examples
///
/// ```
/// use yunit::ux::out::Choice;
/// assert_eq!("JSON".parse::<Choice>().unwrap(), Choice::Json);
/// assert!("histogram".parse::<Choice>().is_err());
/// ```
impl FromStr for Choice {
    type Err = err::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let su = s.to_lowercase();
        match &*su {
            string::CONSOLE => Ok(Self::Console),
            string::JSON => Ok(Self::Json),
            _ => Err(Self::Err::BadOutputter(su)),
        }
    }
}
