//! Errors that can occur in the user interface layer.

use super::{exit, out};
use crate::{config, err};
use thiserror::Error;

/// A top-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// The user supplied bad configuration.
    #[error("config error: {0}")]
    Config(#[from] config::Error),

    /// The session failed to set up or run.
    #[error(transparent)]
    Session(#[from] err::Error),

    /// We couldn't output the report.
    #[error("output error: {0}")]
    Output(#[from] out::Error),

    /// We couldn't install the interrupt handler.
    #[error("couldn't install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
}

impl Error {
    /// Gets the process exit code this error should produce.
    ///
    /// # Examples
    ///
    /// ```
    /// use yunit::{err, ux::{self, exit}};
    /// let e: ux::err::Error = err::Error::NoEngine.into();
    /// assert_eq!(e.exit_code(), exit::NO_ENGINE);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Session(err::Error::NoEngine) => exit::NO_ENGINE,
            Self::Session(err::Error::NoContainer) => exit::NO_CONTAINER,
            Self::Session(err::Error::Load(_)) => exit::LOAD_FAILURE,
            Self::Session(err::Error::Config(_)) | Self::Config(_) => exit::SCRIPT_FAILURE,
            Self::Output(_) | Self::Interrupt(_) => exit::SCRIPT_FAILURE,
        }
    }
}

/// Results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
