//! Sessions: one configured run over every container.

use super::{halt, Driver, Order, Summary};
use crate::{
    api::{abs::Test, c::Factory, rust::Registry},
    config::Config,
    err::{Error, Result},
    logger::Logger,
};
use std::path::PathBuf;

/// A configured run, holding every engine it needs.
///
/// Dropping the session unloads its engines.
pub struct Session {
    factory: Factory,
    containers: Vec<PathBuf>,
    driver: Driver,
    order: Order,
    filter: Option<String>,
}

impl Session {
    /// Sets up a session from `config`, loading and initialising every
    /// engine it names.
    ///
    /// `halt` gives extra halting conditions on top of those in `config`.
    pub fn new(config: &Config, halt: impl IntoIterator<Item = halt::Condition>) -> Result<Self> {
        config.validate()?;
        if config.engines.is_empty() {
            return Err(Error::NoEngine);
        }
        if config.containers.is_empty() {
            return Err(Error::NoContainer);
        }

        let mut factory = Factory::new();
        for engine in &config.engines {
            factory.add_engine(engine, config.namespace)?;
        }

        let driver = config
            .halt_conditions()
            .chain(halt)
            .fold(Driver::new(config.isolation), Driver::with_halt);

        Ok(Self {
            factory,
            containers: config.containers.clone(),
            driver,
            order: config.run_order(),
            filter: config.filter.clone(),
        })
    }

    /// Gets the session's engine factory.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Runs every container in turn, reporting to `logger`.
    ///
    /// Every container must have an engine before any test runs.  A
    /// container that then fails to load stops the session with an error;
    /// tests that already ran have been reported to `logger` by then.
    pub fn run<L: Logger>(&self, logger: &mut L) -> Result<Summary> {
        for path in &self.containers {
            self.factory.engine_for(path)?;
        }

        let mut summary = Summary::default();
        for path in &self.containers {
            let container = self.factory.load(path)?;
            tracing::info!(container = %path.display(), tests = container.len(), "running container");
            let tests = select(container.tests(), &self.filter, self.order);
            summary.absorb(self.driver.run_all(tests, logger));
            if summary.halted {
                break;
            }
        }
        Ok(summary)
    }
}

/// Runs the tests in `registry` in this process.
///
/// This is how tests written in Rust run without going through an engine.
pub fn run_registry<L: Logger>(
    registry: &Registry,
    driver: &Driver,
    order: Order,
    filter: Option<&str>,
    logger: &mut L,
) -> Summary {
    let filter = filter.map(str::to_owned);
    driver.run_all(select(registry.iter(), &filter, order), logger)
}

fn select<T: Test>(tests: impl Iterator<Item = T>, filter: &Option<String>, order: Order) -> Vec<T> {
    let mut tests: Vec<T> = match filter {
        Some(f) => tests.filter(|t| t.identity().name.contains(f.as_str())).collect(),
        None => tests.collect(),
    };
    order.apply(&mut tests);
    tests
}
