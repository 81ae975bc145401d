//! A test container written in Rust.
//!
//! Build this crate and point `yunit` at the resulting library as both the
//! engine and (through any `.rs.t` path) the container:
//!
//! ```text
//! yunit -e target/debug/libyunit_sample_container.so -t sample.rs.t
//! ```

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use yunit::{
    api::rust::{Fixture, Registry, TestCase},
    are_eq, is_true, test_case,
};

/// Counts how many times the shared fixture has been set up and torn down.
#[derive(Default)]
struct Counting {
    live: AtomicUsize,
}

impl Fixture for Counting {
    fn set_up(&self) {
        self.live.fetch_add(1, Ordering::SeqCst);
    }

    fn tear_down(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Registers this container's tests, in execution order.
pub fn register(r: &mut Registry) {
    test_case!(r, "emptyTest", || {});

    test_case!(r, "arithmetic", || {
        are_eq!(2 + 2, 4);
        is_true!(1 < 2);
    });

    test_case!(r, "failingTest", || is_true!(false));

    let fixture = Arc::new(Counting::default());
    let seen = fixture.clone();
    r.add(
        TestCase::new("fixtureTest", file!(), line!(), move || {
            are_eq!(seen.live.load(Ordering::SeqCst), 1);
        })
        .with_fixture(fixture),
    );

    r.add(
        TestCase::new("ignoredTest", file!(), line!(), || panic!("ignored tests never run"))
            .ignore(true),
    );

    test_case!(r, "panickingTest", || {
        let v: Vec<u32> = vec![];
        let first = v[0];
        are_eq!(first, 0);
    });
}

yunit::test_container!(extensions: [".rs.t"], register: register);
