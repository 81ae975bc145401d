//! Complete output configuration: which outputter, writing where.

use super::{abs, err, Choice};
use crate::model::Report;

/// A complete definition of how to select an output.
pub struct Config {
    /// The choice of outputter.
    pub choice: Choice,
    /// The choice of writer.
    pub writer: Box<dyn std::io::Write>,
}

impl Config {
    /// Constructs the appropriate outputter for this config.
    #[must_use]
    pub fn into_outputter<'a>(self) -> Box<dyn abs::Outputter + 'a> {
        self.choice.into_outputter(self.writer)
    }
}

/// The default config uses the default outputter choice, and stdout.
impl Default for Config {
    fn default() -> Self {
        Config {
            choice: Choice::default(),
            writer: Box::new(std::io::stdout()),
        }
    }
}

/// Trait used to add inline outputter methods to reports.
pub trait Outputtable {
    /// Outputs this item onto the outputter chosen by `on`.
    ///
    /// # Errors
    ///
    /// Generally carries any errors caused by trying to `output` to the
    /// outputter given by `on`.
    fn output(self, on: Config) -> err::Result<()>;
}

impl Outputtable for Report {
    fn output(self, on: Config) -> err::Result<()> {
        on.into_outputter().output(self)
    }
}
