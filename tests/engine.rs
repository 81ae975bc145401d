//! Loads the C fixture engines through the real loader and runs them.
#![cfg(unix)]

use std::{
    ffi::CStr,
    os::raw::{c_char, c_int},
    path::{Path, PathBuf},
};
use yunit::{
    api::{
        abs::Test,
        c::{self, Engine, Factory, State},
    },
    config::Config,
    dl, err,
    logger::Collector,
    model::{Kind, Location, Phase, PhaseOutcome, Record, Verdict},
    run::{guard, Driver, Isolation, Session},
};

const SAMPLE: &str = env!("YUNIT_SAMPLE_ENGINE");
const BROKEN: &str = env!("YUNIT_BROKEN_ENGINE");
const CRASH: &str = env!("YUNIT_CRASH_ENGINE");

fn engine(path: &str) -> Engine {
    let mut e = Engine::new(path, dl::Namespace::default()).unwrap();
    e.initialize().unwrap();
    e
}

/// Gives access to the sample engine's bookkeeping exports.
struct Bookkeeping {
    lib: dl::Library,
}

impl Bookkeeping {
    fn new() -> Self {
        let mut lib = dl::Library::new(dl::Namespace::Shared);
        lib.load_lib(Path::new(SAMPLE)).unwrap();
        Self { lib }
    }

    fn reset(&mut self) {
        let f = self.lib.resolve("sample_reset").unwrap();
        let f: unsafe extern "C" fn() = unsafe { std::mem::transmute(f.as_ptr()) };
        unsafe { f() }
    }

    fn trace(&mut self) -> String {
        let f = self.lib.resolve("sample_trace").unwrap();
        let f: unsafe extern "C" fn() -> *const c_char = unsafe { std::mem::transmute(f.as_ptr()) };
        unsafe { CStr::from_ptr(f()) }.to_string_lossy().into_owned()
    }

    fn count(&mut self, name: &str) -> c_int {
        let f = self.lib.resolve(name).unwrap();
        let f: unsafe extern "C" fn() -> c_int = unsafe { std::mem::transmute(f.as_ptr()) };
        unsafe { f() }
    }
}

#[test]
/// A well-formed engine initialises and reports its extensions.
fn test_initialize() {
    let e = engine(SAMPLE);
    assert_eq!(e.state(), State::Initialized);
    assert_eq!(e.supported_extensions().unwrap(), [".sample"]);
}

#[test]
/// The container has one entry per test, in list order.
fn test_load_lists_tests() {
    let e = engine(SAMPLE);
    let c = e.load(Path::new("suite.sample")).unwrap();
    assert_eq!(c.len(), 5);
    let names: Vec<String> = c.tests().map(|t| t.name()).collect();
    assert_eq!(
        names,
        ["emptyTest", "failingTest", "ignoredTest", "setUpFailure", "errorTest"]
    );
}

#[test]
/// An engine without `loadTestContainer` fails to initialise.
fn test_missing_export() {
    let mut e = Engine::new(BROKEN, dl::Namespace::default()).unwrap();
    match e.initialize() {
        Err(c::Error::MissingSymbol(_)) => (),
        r => panic!("unexpected result {:?}", r.map(|_| ())),
    }
    assert_eq!(e.state(), State::Created);
    assert!(e.error().unwrap().contains("loadTestContainer"));
}

#[test]
/// Handles don't survive their container.
fn test_handles_after_unload() {
    let mut e = engine(SAMPLE);
    let handle = {
        let c = e.load(Path::new("suite.sample")).unwrap();
        let h = c.handles().next().unwrap();
        h
    };
    e.unload();
    assert_eq!(e.state(), State::Unloaded);
    assert!(matches!(
        e.load(Path::new("suite.sample")),
        Err(c::Error::Unloaded(_))
    ));

    let mut e = engine(SAMPLE);
    let c = e.load(Path::new("suite.sample")).unwrap();
    assert!(matches!(c.get(handle), Err(c::Error::StaleHandle)));
    drop(c);
    e.unload();
}

#[test]
/// The sample scenario produces the expected outcomes.
fn test_sample_scenario() {
    let mut books = Bookkeeping::new();
    books.reset();

    let e = engine(SAMPLE);
    let c = e.load(Path::new("suite.sample")).unwrap();
    let mut log = Collector::new();
    let summary = Driver::default().run_all(c.tests(), &mut log);
    assert_eq!(summary.ran, 5);
    let report = log.into_report();

    // emptyTest: every phase succeeds, in order.
    let empty = &report.tests[0];
    assert_eq!(empty.verdict, Verdict::Pass);
    assert!(empty.phases.iter().all(|p| p.outcome.is_success()));
    assert_eq!(books.trace(), "sut");

    // failingTest: the failure keeps its own location and message.
    let failing = &report.tests[1];
    assert_eq!(failing.verdict, Verdict::Fail);
    assert_eq!(
        failing.phases[1].outcome,
        PhaseOutcome::Failure(Record::new(
            Kind::Failure,
            Location::new("sample.t.c", 10),
            "false != true"
        ))
    );
    assert!(failing.phases[2].outcome.is_success());

    // ignoredTest: nothing runs.
    assert_eq!(report.tests[2].verdict, Verdict::Ignored);
    assert!(report.tests[2].phases.is_empty());
    assert_eq!(books.count("sample_ignored_calls"), 0);

    // setUpFailure: test and tearDown are skipped.
    let set_up = &report.tests[3];
    assert_eq!(set_up.phases.len(), 1);
    assert_eq!(set_up.phases[0].phase, Phase::SetUp);
    assert_eq!(books.count("sample_skipped_calls"), 0);

    // errorTest: errors without a source land on the declared location.
    match &report.tests[4].phases[1].outcome {
        PhaseOutcome::Error(r) => {
            assert_eq!(r.location, Location::new("sample.t.c", 26));
            assert_eq!(r.message, "something broke");
        }
        o => panic!("unexpected outcome {:?}", o),
    }

    assert_eq!(report.tally.passed, 1);
    assert_eq!(report.tally.failed, 3);
    assert_eq!(report.tally.ignored, 1);
}

#[test]
/// The factory picks engines by the longest matching extension.
fn test_factory() {
    let mut f = Factory::new();
    f.add_engine(SAMPLE, dl::Namespace::default()).unwrap();
    f.add_engine(CRASH, dl::Namespace::default()).unwrap();
    assert_eq!(f.len(), 2);
    assert_eq!(
        f.engine_for(Path::new("x.t.crash")).unwrap().path(),
        Path::new(CRASH)
    );
    assert_eq!(
        f.engine_for(Path::new("dir/x.sample")).unwrap().path(),
        Path::new(SAMPLE)
    );
    assert!(matches!(
        f.engine_for(Path::new("x.unknown")),
        Err(c::Error::NoEngineFor(_))
    ));
    assert_eq!(f.load(Path::new("x.sample")).unwrap().len(), 5);
    f.unload_all();
}

#[test]
/// Under process isolation, a crashing test fails and the run goes on.
fn test_crash_isolated() {
    let e = engine(CRASH);
    let c = e.load(Path::new("suite.crash")).unwrap();
    let mut log = Collector::new();
    let summary = Driver::new(Isolation::Process).run_all(c.tests(), &mut log);
    assert_eq!(summary.ran, 2);
    let report = log.into_report();

    let crashed = &report.tests[0];
    assert_eq!(crashed.verdict, Verdict::Fail);
    assert_eq!(crashed.phases.len(), 2);
    match &crashed.phases[1].outcome {
        PhaseOutcome::Error(r) => {
            assert_eq!(r.kind, Kind::Signal);
            assert_eq!(r.message, guard::SIGNAL_MESSAGE);
        }
        o => panic!("unexpected outcome {:?}", o),
    }
    assert_eq!(report.tests[1].verdict, Verdict::Pass);
    assert!(c.tests().all(|t| !t.is_ignored()));
}

fn crash_session(containers: &[&str]) -> Session {
    let config = Config {
        isolation: Isolation::Process,
        engines: vec![CRASH.into()],
        containers: containers.iter().map(PathBuf::from).collect(),
        ..Config::default()
    };
    Session::new(&config, None).unwrap()
}

#[test]
/// Sessions run each container through its engine.
fn test_session_runs() {
    let session = crash_session(&["a.crash"]);
    let mut log = Collector::new();
    let summary = session.run(&mut log).unwrap();
    assert_eq!(summary.ran, 2);
    assert_eq!(log.into_report().tally.failed, 1);
}

#[test]
/// A container with no engine fails the session before any test runs.
fn test_session_unknown_container() {
    let session = crash_session(&["a.crash", "b.unknown"]);
    let mut log = Collector::new();
    match session.run(&mut log) {
        Err(err::Error::Load(c::Error::NoEngineFor(p))) => assert_eq!(p, Path::new("b.unknown")),
        r => panic!("unexpected result {:?}", r.map(|s| s.ran)),
    }
    assert!(log.into_report().tests.is_empty());
}
