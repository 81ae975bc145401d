//! Process exit codes for the `yunit` binary.

/// Every test passed (or was ignored).
pub const SUCCESS: i32 = 0;
/// At least one test failed.
pub const TEST_FAILURE: i32 = 1;
/// No test engine was given.
pub const NO_ENGINE: i32 = -1;
/// No test container was given.
pub const NO_CONTAINER: i32 = -2;
/// An engine or container failed to load.
pub const LOAD_FAILURE: i32 = -3;
/// The run script (or configuration) couldn't be used.
pub const SCRIPT_FAILURE: i32 = -4;

/// Gets the exit code for a finished run.
///
/// # Examples
///
/// ```
/// use yunit::{model::Verdict, ux::exit};
/// assert_eq!(exit::of_verdict(Some(Verdict::Pass)), exit::SUCCESS);
/// assert_eq!(exit::of_verdict(None), exit::SUCCESS);
/// assert_eq!(exit::of_verdict(Some(Verdict::Fail)), exit::TEST_FAILURE);
/// ```
pub fn of_verdict(verdict: Option<crate::model::Verdict>) -> i32 {
    match verdict {
        Some(crate::model::Verdict::Fail) => TEST_FAILURE,
        _ => SUCCESS,
    }
}
