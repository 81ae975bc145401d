//! Loads this crate's own `cdylib` through the runner's engine loader.

use std::{
    env::consts::{DLL_PREFIX, DLL_SUFFIX},
    path::{Path, PathBuf},
};
use yunit::{
    api::c::{Engine, State},
    dl,
    logger::Collector,
    model::{Kind, PhaseOutcome, Verdict},
    run::{guard, Driver},
};

/// Finds the `cdylib` cargo built alongside this test binary.
fn library() -> PathBuf {
    let name = format!("{}yunit_sample_container{}", DLL_PREFIX, DLL_SUFFIX);
    let exe = std::env::current_exe().unwrap();
    let deps = exe.parent().unwrap();
    [deps, deps.parent().unwrap()]
        .iter()
        .map(|dir| dir.join(&name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| panic!("couldn't find {} near {}", name, deps.display()))
}

#[test]
/// The exported container runs through the engine like any other.
fn test_engine_runs_container() {
    let mut e = Engine::new(library(), dl::Namespace::default()).unwrap();
    e.initialize().unwrap();
    assert_eq!(e.state(), State::Initialized);
    assert_eq!(e.supported_extensions().unwrap(), [".rs.t"]);

    let c = e.load(Path::new("sample.rs.t")).unwrap();
    assert_eq!(c.len(), 6);
    let mut log = Collector::new();
    let summary = Driver::default().run_all(c.tests(), &mut log);
    assert_eq!(summary.ran, 6);
    let report = log.into_report();

    let verdicts: Vec<Verdict> = report.tests.iter().map(|t| t.verdict).collect();
    assert_eq!(
        verdicts,
        [
            Verdict::Pass,
            Verdict::Pass,
            Verdict::Fail,
            Verdict::Pass,
            Verdict::Ignored,
            Verdict::Fail
        ]
    );

    // Assertion failures keep the location they were raised at.
    match &report.tests[2].phases[1].outcome {
        PhaseOutcome::Failure(r) => {
            assert!(r.location.source.ends_with("lib.rs"));
            assert_eq!(r.message, "false != true");
        }
        o => panic!("unexpected outcome {:?}", o),
    }

    // Other panics arrive as errors at the declared location.
    match &report.tests[5].phases[1].outcome {
        PhaseOutcome::Error(r) => {
            assert_eq!(r.kind, Kind::Reported);
            assert!(r.message.starts_with(guard::PANIC_PREFIX));
            assert_eq!(r.location, report.tests[5].identity.location);
        }
        o => panic!("unexpected outcome {:?}", o),
    }

    drop(c);
    e.unload();
    assert_eq!(e.state(), State::Unloaded);
}
