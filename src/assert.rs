//! Raising structured assertion failures from Rust tests.
//!
//! Failures travel as panics carrying a [Failure] payload, which the driver
//! recognises and reports with the failure's own location and message.  Any
//! other panic is treated as an unexpected error in the test.

use crate::model::{Kind, Location, Record};

/// The panic payload of an assertion failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// Where the assertion was written.
    pub location: Location,
    /// What went wrong.
    pub message: String,
}

impl Failure {
    /// Converts this failure into an error record.
    pub fn into_record(self) -> Record {
        Record::new(Kind::Failure, self.location, self.message)
    }
}

/// Raises an assertion failure at `location`.
pub fn raise(location: Location, message: impl Into<String>) -> ! {
    std::panic::panic_any(Failure {
        location,
        message: message.into(),
    })
}

/// Fails the current test with a formatted message.
#[macro_export]
macro_rules! fail {
    ($($arg:tt)+) => {
        $crate::assert::raise(
            $crate::model::Location::new(file!(), line!()),
            format!($($arg)+),
        )
    };
}

/// Fails the current test unless the condition holds.
#[macro_export]
macro_rules! is_true {
    ($cond:expr) => {
        if !$cond {
            $crate::assert::raise(
                $crate::model::Location::new(file!(), line!()),
                "false != true",
            )
        }
    };
}

/// Fails the current test unless both sides compare equal.
#[macro_export]
macro_rules! are_eq {
    ($left:expr, $right:expr) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    $crate::assert::raise(
                        $crate::model::Location::new(file!(), line!()),
                        format!("{:?} != {:?}", left, right),
                    )
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::Failure;
    use std::panic;

    fn failure_of(f: impl FnOnce() + panic::UnwindSafe) -> Failure {
        let payload = panic::catch_unwind(f).unwrap_err();
        *payload.downcast::<Failure>().unwrap()
    }

    #[test]
    /// `is_true!` raises the canonical message at its own line.
    fn test_is_true() {
        let line = line!() + 1;
        let f = failure_of(|| crate::is_true!(1 > 2));
        assert_eq!(f.message, "false != true");
        assert_eq!(f.location.line, line);
        assert_eq!(f.location.source, file!());
    }

    #[test]
    /// `are_eq!` embeds both sides.
    fn test_are_eq() {
        let f = failure_of(|| crate::are_eq!(1 + 1, 3));
        assert_eq!(f.message, "2 != 3");
    }

    #[test]
    /// Passing assertions don't panic.
    fn test_passing() {
        crate::is_true!(true);
        crate::are_eq!("a", "a");
    }

    #[test]
    /// `fail!` formats its arguments.
    fn test_fail() {
        let f = failure_of(|| crate::fail!("bad {}", 42));
        assert_eq!(f.message, "bad 42");
    }
}
