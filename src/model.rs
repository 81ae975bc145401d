//! Various model types used within the test framework.

pub mod identity;
pub mod phase;
pub mod record;
pub mod report;
pub mod verdict;

pub use identity::{Identity, Location};
pub use phase::{Phase, PhaseOutcome};
pub use record::{Kind, Record};
pub use report::Report;
pub use verdict::Verdict;
