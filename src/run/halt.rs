//! Ways to halt a running session early.

use crate::model::Verdict;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A condition under which the driver stops after the current test.
#[derive(Clone, Debug)]
pub enum Condition {
    /// Halt when this flag goes high.
    OnSignal(Arc<AtomicBool>),
    /// Halt as soon as a test finishes with this verdict.
    OnVerdict(Verdict),
}

impl Condition {
    /// Constructs a halting condition that occurs when a callback is called.
    ///
    /// The callback is suitable for handing to `ctrlc::set_handler`.
    pub fn on_callback() -> (Self, impl FnMut() + Send + 'static) {
        let signal = Arc::new(AtomicBool::new(false));
        let c = Self::OnSignal(signal.clone());
        (c, move || signal.store(true, Ordering::Release))
    }

    /// Checks whether this condition holds, given the verdict of the test
    /// that just finished.
    pub fn check(&self, last: Verdict) -> bool {
        match self {
            Self::OnSignal(s) => s.load(Ordering::Acquire),
            Self::OnVerdict(v) => *v == last,
        }
    }
}
