//! The logger interface through which the driver reports progress.
//!
//! The driver calls [Logger::start_test], then for each attempted phase
//! [Logger::start_phase] followed by exactly one of [Logger::success],
//! [Logger::failure], or [Logger::error], then [Logger::end_test].  Ignored
//! tests get [Logger::ignored] instead of any phase notifications.
//!
//! Whether a particular record is an assertion failure or an unexpected error
//! is decided by the driver; what a logger makes of the distinction is up to
//! it.

use crate::model::{self, report, Identity, Kind, Location, Phase, PhaseOutcome, Record, Verdict};

/// Trait of things that receive test progress notifications.
pub trait Logger {
    /// A test is about to start.
    fn start_test(&mut self, test: &Identity);

    /// A phase of the current test is about to run.
    fn start_phase(&mut self, phase: Phase);

    /// The phase succeeded.
    fn success(&mut self, phase: Phase);

    /// The phase raised an assertion failure.
    fn failure(&mut self, phase: Phase, record: &Record);

    /// The phase hit an unexpected error.
    fn error(&mut self, phase: Phase, record: &Record);

    /// The test is ignored and none of its phases will run.
    fn ignored(&mut self, test: &Identity);

    /// The test has finished with verdict `verdict`.
    fn end_test(&mut self, test: &Identity, verdict: Verdict);

    /// Dispatches `outcome` to the matching notification.
    fn outcome(&mut self, phase: Phase, outcome: &PhaseOutcome) {
        match outcome {
            PhaseOutcome::Success => self.success(phase),
            PhaseOutcome::Failure(r) => self.failure(phase, r),
            PhaseOutcome::Error(r) => self.error(phase, r),
        }
    }
}

impl<L: Logger + ?Sized> Logger for &mut L {
    fn start_test(&mut self, test: &Identity) {
        (**self).start_test(test)
    }

    fn start_phase(&mut self, phase: Phase) {
        (**self).start_phase(phase)
    }

    fn success(&mut self, phase: Phase) {
        (**self).success(phase)
    }

    fn failure(&mut self, phase: Phase, record: &Record) {
        (**self).failure(phase, record)
    }

    fn error(&mut self, phase: Phase, record: &Record) {
        (**self).error(phase, record)
    }

    fn ignored(&mut self, test: &Identity) {
        (**self).ignored(test)
    }

    fn end_test(&mut self, test: &Identity, verdict: Verdict) {
        (**self).end_test(test, verdict)
    }
}

/// Collects the reports a test makes about itself while one phase runs.
///
/// Tests loaded through the C ABI can't raise panics across the boundary, so
/// they report failures through their logger table; those reports land here.
/// Only the first report decides the phase outcome.
#[derive(Debug, Default)]
pub struct Sink {
    first: Option<Record>,
    dropped: usize,
}

impl Sink {
    /// Records an assertion failure at `location`.
    pub fn failure(&mut self, location: Location, message: impl Into<String>) {
        self.push(Record::new(Kind::Failure, location, message))
    }

    /// Records an unexpected error at `location`.
    pub fn error(&mut self, location: Location, message: impl Into<String>) {
        self.push(Record::new(Kind::Reported, location, message))
    }

    fn push(&mut self, record: Record) {
        if self.first.is_none() {
            self.first = Some(record);
        } else {
            tracing::debug!(%record, "dropping report after the first in this phase");
            self.dropped += 1;
        }
    }

    /// Gets the number of reports received after the first.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Converts the collected reports into a phase outcome.
    pub fn into_outcome(self) -> PhaseOutcome {
        self.first
            .map_or(PhaseOutcome::Success, PhaseOutcome::of_record)
    }
}

/// A logger that builds a [model::Report].
#[derive(Default)]
pub struct Collector {
    report: model::Report,
    current: Option<report::Test>,
}

impl Collector {
    /// Constructs an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the run as halted before completion.
    pub fn halt(&mut self) {
        self.report.halted = true;
    }

    /// Consumes this collector and returns its report.
    pub fn into_report(self) -> model::Report {
        self.report
    }

    fn push(&mut self, phase: Phase, outcome: PhaseOutcome) {
        if let Some(t) = self.current.as_mut() {
            t.phases.push(report::Phase { phase, outcome });
        }
    }
}

impl Logger for Collector {
    fn start_test(&mut self, test: &Identity) {
        self.current = Some(report::Test::new(test.clone()));
    }

    fn start_phase(&mut self, _phase: Phase) {}

    fn success(&mut self, phase: Phase) {
        self.push(phase, PhaseOutcome::Success)
    }

    fn failure(&mut self, phase: Phase, record: &Record) {
        self.push(phase, PhaseOutcome::Failure(record.clone()))
    }

    fn error(&mut self, phase: Phase, record: &Record) {
        self.push(phase, PhaseOutcome::Error(record.clone()))
    }

    fn ignored(&mut self, _test: &Identity) {}

    fn end_test(&mut self, test: &Identity, verdict: Verdict) {
        let mut t = self
            .current
            .take()
            .unwrap_or_else(|| report::Test::new(test.clone()));
        t.verdict = verdict;
        self.report.insert(t);
    }
}

/// A logger that emits `tracing` events.
#[derive(Copy, Clone, Default)]
pub struct Tracing;

impl Logger for Tracing {
    fn start_test(&mut self, test: &Identity) {
        tracing::info!(test = %test.name, location = %test.location, "starting test");
    }

    fn start_phase(&mut self, phase: Phase) {
        tracing::debug!(%phase, "starting phase");
    }

    fn success(&mut self, phase: Phase) {
        tracing::debug!(%phase, "phase succeeded");
    }

    fn failure(&mut self, phase: Phase, record: &Record) {
        tracing::info!(%phase, %record, "phase failed");
    }

    fn error(&mut self, phase: Phase, record: &Record) {
        tracing::warn!(%phase, kind = ?record.kind, %record, "phase errored");
    }

    fn ignored(&mut self, test: &Identity) {
        tracing::info!(test = %test.name, "test ignored");
    }

    fn end_test(&mut self, test: &Identity, verdict: Verdict) {
        tracing::info!(test = %test.name, %verdict, "finished test");
    }
}

/// A logger that forwards every notification to two others.
pub struct Tee<A, B>(pub A, pub B);

impl<A: Logger, B: Logger> Logger for Tee<A, B> {
    fn start_test(&mut self, test: &Identity) {
        self.0.start_test(test);
        self.1.start_test(test);
    }

    fn start_phase(&mut self, phase: Phase) {
        self.0.start_phase(phase);
        self.1.start_phase(phase);
    }

    fn success(&mut self, phase: Phase) {
        self.0.success(phase);
        self.1.success(phase);
    }

    fn failure(&mut self, phase: Phase, record: &Record) {
        self.0.failure(phase, record);
        self.1.failure(phase, record);
    }

    fn error(&mut self, phase: Phase, record: &Record) {
        self.0.error(phase, record);
        self.1.error(phase, record);
    }

    fn ignored(&mut self, test: &Identity) {
        self.0.ignored(test);
        self.1.ignored(test);
    }

    fn end_test(&mut self, test: &Identity, verdict: Verdict) {
        self.0.end_test(test, verdict);
        self.1.end_test(test, verdict);
    }
}
