//! The Rust object model: test cases, fixtures, thunks, and the registry.

pub mod case;
pub mod registry;
pub mod thunk;

pub use case::{FnFixture, Fixture, TestCase};
pub use registry::{Registrar, Registry};
pub use thunk::{Hook, Thunk};
