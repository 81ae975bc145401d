//! Config for test order.

use super::err;
use crate::run::Order;
use serde::{Deserialize, Serialize};

/// String representations of order strategies.
pub mod string {
    /// String representation of registration order.
    pub const REGISTRATION: &str = "registration";
    /// String representation of shuffled order.
    pub const SHUFFLE: &str = "shuffle";
    /// String representations of all order strategies.
    ///
    /// This is unrolled into a single slice to make use in clap easier than
    /// programmatically generating it would allow.
    pub const ALL: &[&str] = &[REGISTRATION, SHUFFLE];
}

/// Enumeration of test order strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Strategy {
    /// Run tests in the order their container lists them.
    Registration,
    /// Run tests in a random order.
    Shuffle,
}

/// The default order is registration order.
impl Default for Strategy {
    fn default() -> Self {
        Self::Registration
    }
}

/// Tries to parse a [Strategy] from a string.
impl std::str::FromStr for Strategy {
    type Err = err::Error;

    fn from_str(s: &str) -> err::Result<Self> {
        match s {
            string::REGISTRATION => Ok(Self::Registration),
            string::SHUFFLE => Ok(Self::Shuffle),
            s => Err(err::Error::BadOrder(s.to_owned())),
        }
    }
}

/// Formats a [Strategy] by applying the inverse of [FromStr].
impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Registration => string::REGISTRATION,
                Self::Shuffle => string::SHUFFLE,
            }
        )
    }
}

impl Strategy {
    /// Gets an iterator of all available strategies.
    ///
    /// # Examples
    ///
    /// ```
    /// use yunit::config::order::Strategy;
    /// let set: std::collections::HashSet<Strategy> = Strategy::all().collect();
    ///
    /// assert!(set.contains(&Strategy::Registration));
    /// assert!(set.contains(&Strategy::Shuffle));
    /// ```
    pub fn all() -> impl Iterator<Item = Self> {
        vec![Self::Registration, Self::Shuffle].into_iter()
    }

    /// Gets the run order for this strategy, shuffling with `seed` if given.
    pub fn to_order(self, seed: Option<u64>) -> Order {
        match self {
            Self::Registration => Order::Registration,
            Self::Shuffle => Order::Shuffle { seed },
        }
    }
}
