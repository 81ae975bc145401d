//! Crate-level errors.
use crate::{api::c, config};
use thiserror::Error;

/// Enumeration of errors that can stop a yunit session.
#[derive(Debug, Error)]
pub enum Error {
    /// The session was given no test engines.
    #[error("no test engine given")]
    NoEngine,

    /// The session was given no test containers.
    #[error("no test container given")]
    NoContainer,

    /// An engine or container failed to load.
    #[error("load failure: {0}")]
    Load(#[from] c::Error),

    /// The configuration was unusable.
    #[error("config error: {0}")]
    Config(#[from] config::Error),
}

/// Shorthand for results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
