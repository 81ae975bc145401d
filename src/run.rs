//! The high-level test runner.
//!
//! [Driver] runs individual tests through the protection boundary in
//! [guard]; [Session] ties a configuration, a set of engines, and their
//! containers together into one run.

pub mod driver;
#[cfg(unix)]
mod fork;
pub mod guard;
pub mod halt;
pub mod isolation;
pub mod order;
pub mod session;

pub use driver::{Driver, Summary};
pub use isolation::Isolation;
pub use order::Order;
pub use session::Session;
