//! Errors that can occur during configuration.
use crate::run::Isolation;
use std::path::PathBuf;
use thiserror::Error;

/// A configuration error.
#[derive(Debug, Error)]
pub enum Error {
    /// The user supplied the given string, which was a bad isolation level.
    #[error("unsupported isolation level: {0}")]
    BadIsolation(String),

    /// The user supplied the given string, which was a bad namespace policy.
    #[error("unsupported library namespace: {0}")]
    BadNamespace(String),

    /// The user supplied the given string, which was a bad order strategy.
    #[error("unsupported test order: {0}")]
    BadOrder(String),

    /// The user supplied a bad shuffle seed.
    #[error("couldn't parse seed: {0}")]
    BadSeed(std::num::ParseIntError),

    /// The requested isolation level doesn't work on this platform.
    #[error("isolation level {0} is not available on this platform")]
    IsolationUnavailable(Isolation),

    /// We couldn't read a config file or run script.
    #[error("couldn't read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// We couldn't deserialise the config from TOML.
    #[error("couldn't parse config: {0}")]
    Deserialize(#[from] toml::de::Error),

    /// We couldn't serialise the config to TOML.
    #[error("couldn't dump config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
