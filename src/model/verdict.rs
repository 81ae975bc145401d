//! Aggregate verdicts over a whole test.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The aggregate result of running a test.
///
/// Verdicts are ordered such that `max` on an iterator of verdicts for
/// attempted tests will return the correct overall verdict (`Pass` if all
/// passed, `Fail` otherwise); `Ignored` sorts first so that ignoring a test
/// never masks another test's failure.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// The test was ignored; none of its phases ran.
    Ignored,
    /// Every attempted phase succeeded.
    Pass,
    /// At least one attempted phase failed or errored.
    Fail,
}

/// String representations for verdicts.
pub mod string {
    /// String representation for pass verdicts.
    pub const PASS: &str = "pass";
    /// String representation for fail verdicts.
    pub const FAIL: &str = "fail";
    /// String representation for ignored verdicts.
    pub const IGNORED: &str = "ignored";
}

/// We can produce a string representation of the verdict.
///
/// # Examples
///
/// ```
/// use yunit::model::Verdict;
/// assert_eq!(Verdict::Pass.to_string(), "pass");
/// assert_eq!(Verdict::Fail.to_string(), "fail");
/// assert_eq!(Verdict::Ignored.to_string(), "ignored");
/// ```
impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Pass => string::PASS,
                Self::Fail => string::FAIL,
                Self::Ignored => string::IGNORED,
            }
        )
    }
}

impl Verdict {
    /// Converts a pass/fail Boolean to a [Verdict].
    ///
    /// # Examples
    ///
    /// ```
    /// use yunit::model::Verdict;
    /// assert_eq!(Verdict::from_pass_bool(true), Verdict::Pass);
    /// assert_eq!(Verdict::from_pass_bool(false), Verdict::Fail);
    /// ```
    #[must_use]
    pub fn from_pass_bool(is_pass: bool) -> Self {
        if is_pass {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

#[cfg(test)]
mod test {
    use super::Verdict;

    #[test]
    /// `max` of an empty iterator should return `None`.
    fn test_max_empty() {
        let v: std::vec::Vec<Verdict> = vec![];
        assert_eq!(v.into_iter().max(), None)
    }

    #[test]
    /// `max` of an iterator of passes should return a pass.
    fn test_max_passes() {
        let v = vec![Verdict::Pass, Verdict::Pass, Verdict::Pass];
        assert_eq!(v.into_iter().max(), Some(Verdict::Pass))
    }

    #[test]
    /// `max` of a mixed iterator should return a fail.
    fn test_max_mixed() {
        let v = vec![Verdict::Pass, Verdict::Fail, Verdict::Pass];
        assert_eq!(v.into_iter().max(), Some(Verdict::Fail))
    }

    #[test]
    /// Ignored tests don't hide passes.
    fn test_max_ignored() {
        let v = vec![Verdict::Ignored, Verdict::Pass];
        assert_eq!(v.into_iter().max(), Some(Verdict::Pass))
    }
}
