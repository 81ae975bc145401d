//! The driver: runs tests phase by phase and reports what happened.

use super::{guard, halt, Isolation};
use crate::{
    api::abs::Test,
    logger::Logger,
    model::{Kind, Location, Phase, PhaseOutcome, Record, Verdict},
};

/// Runs tests under a given isolation level, reporting to a logger.
#[derive(Clone, Debug, Default)]
pub struct Driver {
    isolation: Isolation,
    halt: Vec<halt::Condition>,
}

/// What happened over a sequence of tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// The number of tests that ran, including ignored ones.
    pub ran: usize,
    /// The worst verdict seen, if any test ran.
    pub verdict: Option<Verdict>,
    /// Whether a halt condition stopped the run early.
    pub halted: bool,
}

impl Summary {
    /// Folds a later summary into this one.
    pub fn absorb(&mut self, other: Summary) {
        self.ran += other.ran;
        self.verdict = self.verdict.max(other.verdict);
        self.halted |= other.halted;
    }
}

impl Driver {
    /// Constructs a driver with the given isolation level.
    pub fn new(isolation: Isolation) -> Self {
        Self {
            isolation,
            halt: vec![],
        }
    }

    /// Adds a halt condition, checked after each test.
    #[must_use]
    pub fn with_halt(mut self, condition: halt::Condition) -> Self {
        self.halt.push(condition);
        self
    }

    /// Gets the driver's isolation level.
    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Runs one test to completion, returning its verdict.
    ///
    /// Ignored tests produce a single `ignored` notification and run no
    /// phase at all.
    pub fn run_test<T: Test + ?Sized, L: Logger>(&self, test: &T, logger: &mut L) -> Verdict {
        let identity = test.identity();
        logger.start_test(&identity);

        let verdict = if test.is_ignored() {
            logger.ignored(&identity);
            Verdict::Ignored
        } else {
            Verdict::from_pass_bool(self.run_phases(test, &identity.location, logger))
        };

        logger.end_test(&identity, verdict);
        verdict
    }

    fn run_phases<T: Test + ?Sized, L: Logger>(
        &self,
        test: &T,
        declared: &Location,
        logger: &mut L,
    ) -> bool {
        match self.isolation {
            Isolation::InProcess => run_phases(test, declared, logger),
            #[cfg(unix)]
            Isolation::Process => super::fork::run_phases(test, declared, logger),
            #[cfg(not(unix))]
            Isolation::Process => refuse(self.isolation, declared, logger),
        }
    }

    /// Runs every test in `tests` in order, stopping early if a halt
    /// condition fires.
    pub fn run_all<T: Test, L: Logger>(
        &self,
        tests: impl IntoIterator<Item = T>,
        logger: &mut L,
    ) -> Summary {
        let mut summary = Summary::default();
        for test in tests {
            let verdict = self.run_test(&test, logger);
            summary.ran += 1;
            summary.verdict = summary.verdict.max(Some(verdict));
            if self.halt.iter().any(|c| c.check(verdict)) {
                tracing::info!(ran = summary.ran, "halting run");
                summary.halted = true;
                break;
            }
        }
        summary
    }
}

/// Runs setUp, test, and tearDown in this process, returning whether every
/// attempted phase succeeded.
///
/// A failed setUp skips the other two phases; once setUp has succeeded,
/// tearDown always runs.
pub fn run_phases<T: Test + ?Sized, L: Logger>(test: &T, declared: &Location, logger: &mut L) -> bool {
    if !run_phase(test, Phase::SetUp, declared, logger) {
        return false;
    }
    let body = run_phase(test, Phase::Test, declared, logger);
    let tear_down = run_phase(test, Phase::TearDown, declared, logger);
    body && tear_down
}

/// Fails setUp without running anything, for an isolation level this
/// platform can't provide.
#[cfg_attr(unix, allow(dead_code))]
fn refuse<L: Logger>(isolation: Isolation, declared: &Location, logger: &mut L) -> bool {
    tracing::error!(%isolation, "isolation level unavailable");
    let message = format!("{} isolation is unavailable on this platform", isolation);
    logger.start_phase(Phase::SetUp);
    logger.outcome(
        Phase::SetUp,
        &PhaseOutcome::Error(Record::new(Kind::Reported, declared.clone(), message)),
    );
    false
}

fn run_phase<T: Test + ?Sized, L: Logger>(
    test: &T,
    phase: Phase,
    declared: &Location,
    logger: &mut L,
) -> bool {
    logger.start_phase(phase);
    let outcome = guard::protect(test, phase, declared);
    logger.outcome(phase, &outcome);
    outcome.is_success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::rust::{FnFixture, Fixture, TestCase},
        assert,
        logger::Collector,
        model::{Identity, Kind, PhaseOutcome},
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    /// Logs notifications as strings, for checking their order.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl Logger for Trace {
        fn start_test(&mut self, test: &Identity) {
            self.0.push(format!("start {}", test.name))
        }
        fn start_phase(&mut self, phase: Phase) {
            self.0.push(format!("phase {}", phase))
        }
        fn success(&mut self, _phase: Phase) {
            self.0.push("success".to_owned())
        }
        fn failure(&mut self, _phase: Phase, record: &crate::model::Record) {
            self.0.push(format!("failure {}", record.message))
        }
        fn error(&mut self, _phase: Phase, record: &crate::model::Record) {
            self.0.push(format!("error {}", record.message))
        }
        fn ignored(&mut self, test: &Identity) {
            self.0.push(format!("ignored {}", test.name))
        }
        fn end_test(&mut self, _test: &Identity, verdict: Verdict) {
            self.0.push(format!("end {}", verdict))
        }
    }

    /// A fixture recording which hooks ran.
    #[derive(Clone, Default)]
    struct Recording(Arc<Mutex<Vec<&'static str>>>);

    impl Recording {
        fn push(&self, s: &'static str) {
            self.0.lock().unwrap().push(s)
        }

        fn calls(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Fixture for Recording {
        fn set_up(&self) {
            self.push("setUp")
        }

        fn tear_down(&self) {
            self.push("tearDown")
        }
    }

    #[test]
    /// Phases run in order and the logger hears about each.
    fn test_phase_order() {
        let rec = Recording::default();
        let body = rec.clone();
        let case = TestCase::new("ordered", "driver.rs", 1, move || body.push("test"))
            .with_fixture(Arc::new(rec.clone()));
        let mut log = Trace::default();
        let v = Driver::default().run_test(&case, &mut log);
        assert_eq!(v, Verdict::Pass);
        assert_eq!(rec.calls(), ["setUp", "test", "tearDown"]);
        assert_eq!(
            log.0,
            [
                "start ordered",
                "phase setUp",
                "success",
                "phase test",
                "success",
                "phase tearDown",
                "success",
                "end pass"
            ]
        );
    }

    #[test]
    /// A failing setUp skips the rest of the test.
    fn test_set_up_failure() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let case = TestCase::new("setUpFailure", "driver.rs", 1, move || {
            r.fetch_add(1, Ordering::SeqCst);
        })
        .with_fixture(Arc::new(FnFixture {
            set_up: || assert::raise(Location::new("driver.rs", 2), "no"),
            tear_down: || panic!("tearDown ran"),
        }));
        let mut log = Trace::default();
        assert_eq!(Driver::default().run_test(&case, &mut log), Verdict::Fail);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(
            log.0,
            ["start setUpFailure", "phase setUp", "failure no", "end fail"]
        );
    }

    #[test]
    /// tearDown runs even when the body fails.
    fn test_tear_down_after_failure() {
        let rec = Recording::default();
        let case = TestCase::new("failing", "driver.rs", 1, || {
            assert::raise(Location::new("driver.rs", 3), "false != true")
        })
        .with_fixture(Arc::new(rec.clone()));
        let mut c = Collector::new();
        assert_eq!(Driver::default().run_test(&case, &mut c), Verdict::Fail);
        assert_eq!(rec.calls(), ["setUp", "tearDown"]);
        let report = c.into_report();
        let phases = &report.tests[0].phases;
        assert_eq!(phases.len(), 3);
        assert!(phases[2].outcome.is_success());
    }

    #[test]
    /// Unavailable isolation fails setUp instead of running the test.
    fn test_refuse() {
        let mut log = Trace::default();
        assert!(!refuse(Isolation::Process, &Location::new("driver.rs", 1), &mut log));
        assert_eq!(
            log.0,
            [
                "phase setUp",
                "error process isolation is unavailable on this platform"
            ]
        );
    }

    #[cfg(not(unix))]
    #[test]
    /// Without fork, process isolation refuses to run tests.
    fn test_process_unavailable() {
        let case = TestCase::new("isolated", "driver.rs", 1, || panic!("ran"));
        let mut log = Trace::default();
        assert_eq!(Driver::new(Isolation::Process).run_test(&case, &mut log), Verdict::Fail);
        assert_eq!(log.0.len(), 4);
    }

    #[test]
    /// Ignored tests run nothing and produce one ignored notification.
    fn test_ignored() {
        let case = TestCase::new("ignoredTest", "driver.rs", 1, || panic!("ran")).ignore(true);
        let mut log = Trace::default();
        assert_eq!(Driver::default().run_test(&case, &mut log), Verdict::Ignored);
        assert_eq!(log.0, ["start ignoredTest", "ignored ignoredTest", "end ignored"]);
    }

    #[test]
    /// Panics are reported at the declared location with their text.
    fn test_panic_reported() {
        let case = TestCase::new("panics", "driver.rs", 40, || panic!("boom"));
        let mut c = Collector::new();
        Driver::default().run_test(&case, &mut c);
        let report = c.into_report();
        match &report.tests[0].phases[1].outcome {
            PhaseOutcome::Error(r) => {
                assert_eq!(r.kind, Kind::Panic);
                assert_eq!(r.location, Location::new("driver.rs", 40));
                assert!(r.message.contains("boom"));
            }
            o => panic!("unexpected outcome {:?}", o),
        }
    }

    #[test]
    /// Halt conditions stop the run after the matching test.
    fn test_run_all_halts() {
        let cases = vec![
            TestCase::new("a", "driver.rs", 1, || {}),
            TestCase::new("b", "driver.rs", 2, || panic!("b")),
            TestCase::new("c", "driver.rs", 3, || {}),
        ];
        let d = Driver::default().with_halt(halt::Condition::OnVerdict(Verdict::Fail));
        let mut c = Collector::new();
        let s = d.run_all(cases.iter(), &mut c);
        assert_eq!(s.ran, 2);
        assert!(s.halted);
        assert_eq!(s.verdict, Some(Verdict::Fail));
    }
}
