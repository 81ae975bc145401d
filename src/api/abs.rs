//! The abstract test API.
//!
//! The driver runs anything implementing [Test], whether it is a Rust
//! [TestCase](super::rust::TestCase) in this process or a record handed over
//! by a test container through the C ABI.
use crate::{
    logger::Sink,
    model::{Identity, Phase},
};

/// Trait of runnable tests.
pub trait Test {
    /// Gets the test's name and declared location.
    fn identity(&self) -> Identity;

    /// Gets whether the test is ignored.
    ///
    /// The driver runs none of an ignored test's phases.
    fn is_ignored(&self) -> bool;

    /// Runs one phase of the test.
    ///
    /// Tests signal failure either by panicking or by reporting through
    /// `sink`; returning normally with nothing reported is success.
    fn run_phase(&self, phase: Phase, sink: &mut Sink);
}

impl<T: Test + ?Sized> Test for &T {
    fn identity(&self) -> Identity {
        (**self).identity()
    }

    fn is_ignored(&self) -> bool {
        (**self).is_ignored()
    }

    fn run_phase(&self, phase: Phase, sink: &mut Sink) {
        (**self).run_phase(phase, sink)
    }
}

impl<T: Test + ?Sized> Test for std::sync::Arc<T> {
    fn identity(&self) -> Identity {
        (**self).identity()
    }

    fn is_ignored(&self) -> bool {
        (**self).is_ignored()
    }

    fn run_phase(&self, phase: Phase, sink: &mut Sink) {
        (**self).run_phase(phase, sink)
    }
}
