//! yunit: a unit test runner that drives test engines loaded from shared
//! libraries.
//!
//! Tests reach the driver in one of two ways: as Rust [TestCase]s
//! registered into a [Registry], or as records handed over by a test engine
//! through the C ABI in [api::c].  Either way, [run::Driver] runs each test's
//! setUp, test, and tearDown phases behind a protection boundary and reports
//! what happened through a [logger::Logger].
//!
//! [TestCase]: api::rust::TestCase
//! [Registry]: api::rust::Registry

pub mod api;
pub mod assert;
pub mod config;
pub mod dl;
pub mod err;
pub mod logger;
pub mod model;
pub mod run;
pub mod ux;
