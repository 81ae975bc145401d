//! Errors surfaced by test engines and containers.
use crate::dl;
use std::path::PathBuf;
use thiserror::Error;

/// Enumeration of errors that can happen while loading engines and
/// containers.
///
/// The first three variants distinguish the load-time failures a host should
/// report differently: a missing file, a library the OS refused to open, and
/// a library that doesn't implement the engine ABI.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine library doesn't exist.
    #[error("test engine {0} does not exist")]
    NoSuchFile(PathBuf),

    /// The OS loader failed to open the engine library.
    #[error("test engine library failed to open: {0}")]
    LibraryOpen(dl::Error),

    /// The engine library lacks one of the required exports.
    #[error("test engine is missing a required export: {0}")]
    MissingSymbol(dl::Error),

    /// An operation needed an initialised engine.
    #[error("test engine {0} is not initialised")]
    NotInitialized(PathBuf),

    /// The engine has already been unloaded.
    #[error("test engine {0} has been unloaded")]
    Unloaded(PathBuf),

    /// A container path can't be passed across the C ABI.
    #[error("container path {0} contains a NUL byte")]
    BadPath(PathBuf),

    /// The container returned a record with a null function pointer.
    #[error("test container {path} returned a malformed record at position {index}: `{field}` is null")]
    Malformed {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },

    /// The container's list didn't terminate within the read limit.
    #[error("test container {0} returned a list that does not terminate")]
    Unterminated(PathBuf),

    /// A handle was used with a container it doesn't belong to.
    #[error("test handle is stale or belongs to another container")]
    StaleHandle,

    /// No loaded engine claims the container's extension.
    #[error("no test engine supports {0}")]
    NoEngineFor(PathBuf),
}

/// Shorthand for results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
