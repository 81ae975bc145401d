//! User-facing parts of yunit: command-line handling and report output.

pub mod clap;
pub mod err;
pub mod exit;
pub mod out;
