//! Tests loaded from test engines through the C ABI.
//!
//! A test engine is a shared library exporting `testContainerExtensions` and
//! `loadTestContainer`.  The [Factory] picks an [Engine] for each container
//! path, and the engine hands back a [Container] of tests the driver can run.

pub mod abi;
mod bridge;
pub mod container;
pub mod engine;
pub mod err;
pub mod export;
pub mod factory;

pub use abi::{RawLogger, RawTest};
pub use container::{Container, Handle, Test};
pub use engine::{Engine, State};
pub use err::{Error, Result};
pub use export::Exported;
pub use factory::Factory;
