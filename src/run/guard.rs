//! The protection boundary around a single test phase.
//!
//! [protect] runs one phase under `catch_unwind`, then folds together what
//! the test reported through its sink and whatever it panicked with.
//!
//! Panics inside a phase are outcomes, not crashes, so the panic hook from
//! [install_hook] keeps them off stderr.  Panics anywhere else still reach
//! the hook that was there before.

use crate::{
    api::abs::Test,
    assert::Failure,
    logger::Sink,
    model::{Kind, Location, Phase, PhaseOutcome, Record},
};
use std::{
    any::Any,
    cell::Cell,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};

thread_local! {
    static IN_PHASE: Cell<bool> = Cell::new(false);
}

/// Message for a phase killed by a signal.
pub const SIGNAL_MESSAGE: &str = "Unexpected SEH/signal exception was caught";
/// Prefix for the message of a phase that panicked with a string.
pub const PANIC_PREFIX: &str = "Unexpected exception was caught: ";
/// Message for a phase that panicked with anything else.
pub const UNKNOWN_MESSAGE: &str = "Unknown exception was caught";

/// Runs `phase` of `test`, classifying anything that goes wrong.
///
/// A report made through the sink takes precedence over a panic raised in
/// the same phase.  Records without a location of their own are placed at
/// `declared`.
pub fn protect<T: Test + ?Sized>(test: &T, phase: Phase, declared: &Location) -> PhaseOutcome {
    let mut sink = Sink::default();
    let result = catch(|| test.run_phase(phase, &mut sink));
    let reported = sink.into_outcome();
    let outcome = match result {
        _ if !reported.is_success() => reported,
        Ok(()) => PhaseOutcome::Success,
        Err(payload) => PhaseOutcome::of_record(classify(payload)),
    };
    outcome.or_declared(declared)
}

/// Runs `f` as test code, catching any panic it raises.
///
/// While `f` runs, [in_phase] holds on this thread.
pub fn catch<R>(f: impl FnOnce() -> R) -> std::thread::Result<R> {
    let outer = IN_PHASE.with(|p| p.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    IN_PHASE.with(|p| p.set(outer));
    result
}

/// Gets whether this thread is running test code under [catch].
pub fn in_phase() -> bool {
    IN_PHASE.try_with(Cell::get).unwrap_or(false)
}

/// Installs the process's panic hook, once.
///
/// Panics raised under [catch] are logged at debug level and otherwise
/// stay quiet; the previous hook handles the rest.
pub fn install_hook() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if in_phase() {
                tracing::debug!(%info, "test panicked");
            } else {
                previous(info)
            }
        }));
    });
}

/// Classifies a panic payload.
///
/// Only assertion failures carry a location; everything else comes back
/// with an unknown location for the caller to fill in.
///
/// # Examples
///
/// ```
/// use yunit::{model::Kind, run::guard};
///
/// let r = guard::classify(Box::new("boom"));
/// assert_eq!(r.kind, Kind::Panic);
/// assert_eq!(r.message, "Unexpected exception was caught: boom");
///
/// let r = guard::classify(Box::new(42));
/// assert_eq!(r.kind, Kind::Unknown);
/// ```
pub fn classify(payload: Box<dyn Any + Send>) -> Record {
    let payload = match payload.downcast::<Failure>() {
        Ok(f) => return f.into_record(),
        Err(p) => p,
    };
    let text = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()));
    match text {
        Some(t) => Record::new(Kind::Panic, Location::unknown(), format!("{}{}", PANIC_PREFIX, t)),
        None => Record::new(Kind::Unknown, Location::unknown(), UNKNOWN_MESSAGE),
    }
}

/// Builds the record for a phase killed by a signal.
pub fn signal_record() -> Record {
    Record::new(Kind::Signal, Location::unknown(), SIGNAL_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::rust::TestCase, assert};

    fn outcome(body: impl Fn() + Send + Sync + 'static) -> PhaseOutcome {
        let case = TestCase::new("t", "guard.rs", 7, body);
        protect(&case, Phase::Test, case.location())
    }

    #[test]
    /// A phase that returns normally succeeds.
    fn test_protect_success() {
        assert_eq!(outcome(|| {}), PhaseOutcome::Success);
    }

    #[test]
    /// Assertion failures keep their own location.
    fn test_protect_failure() {
        let o = outcome(|| assert::raise(Location::new("sample.t.c", 10), "false != true"));
        assert_eq!(
            o,
            PhaseOutcome::Failure(Record::new(
                Kind::Failure,
                Location::new("sample.t.c", 10),
                "false != true"
            ))
        );
    }

    #[test]
    /// String panics are placed at the declared location.
    fn test_protect_panic() {
        let o = outcome(|| panic!("index {} out of range", 3));
        assert_eq!(
            o,
            PhaseOutcome::Error(Record::new(
                Kind::Panic,
                Location::new("guard.rs", 7),
                "Unexpected exception was caught: index 3 out of range"
            ))
        );
    }

    #[test]
    /// Only code under `catch` counts as being in a phase, even when nested.
    fn test_catch_scope() {
        install_hook();
        install_hook();
        assert!(!in_phase());
        let nested = catch(|| (in_phase(), catch(in_phase).unwrap(), in_phase()));
        assert_eq!(nested.unwrap(), (true, true, true));
        assert!(!in_phase());

        assert!(catch(|| panic!("quiet")).is_err());
        assert!(!in_phase());
    }

    #[test]
    /// Panics with other payloads are unknown.
    fn test_protect_unknown() {
        let o = outcome(|| std::panic::panic_any(1.5f64));
        assert_eq!(o.kind(), Some(Kind::Unknown));
        assert_eq!(o.record().unwrap().message, UNKNOWN_MESSAGE);
        assert_eq!(o.record().unwrap().location, Location::new("guard.rs", 7));
    }

    struct Reporting;

    impl Test for Reporting {
        fn identity(&self) -> crate::model::Identity {
            crate::model::Identity::new("reporting", Location::new("r.c", 1))
        }

        fn is_ignored(&self) -> bool {
            false
        }

        fn run_phase(&self, _phase: Phase, sink: &mut Sink) {
            sink.error(Location::unknown(), "reported");
            panic!("and then panicked");
        }
    }

    #[test]
    /// Sink reports win over panics in the same phase.
    fn test_protect_sink_wins() {
        let declared = Location::new("r.c", 1);
        let o = protect(&Reporting, Phase::SetUp, &declared);
        assert_eq!(
            o,
            PhaseOutcome::Error(Record::new(Kind::Reported, declared, "reported"))
        );
    }
}
