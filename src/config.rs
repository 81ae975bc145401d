//! Top-level configuration for the runner.
//!
//! Individual parts of yunit can be used without pulling in this
//! configuration layer, but it provides a convenient substrate for handling
//! the configuration.  Configuration comes from, in increasing order of
//! precedence: defaults, the config file, a run script, and the command line.

pub mod err;
pub mod io;
pub mod order;
pub mod top;

pub use err::{Error, Result};
pub use top::Config;
