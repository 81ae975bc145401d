//! `clap` integration for config.

use std::{path, str::FromStr};

use super::{err, out};
use crate::{
    config::{self, io, order, Config},
    dl,
    run::Isolation,
};

/// Clap names for various arguments.
pub mod arg {
    /// Name of the run script argument.
    pub const SCRIPT: &str = "SCRIPT";
    /// Name of the test engine argument.
    pub const ENGINE: &str = "test-unit-engine";
    /// Name of the test container argument.
    pub const CONTAINER: &str = "test-container";

    /// Name of the output type argument.
    pub const OUTPUT_TYPE: &str = "output";

    /// Name of the dump-config argument.
    pub const DUMP_CONFIG: &str = "dump-config";
    /// Name of the dump-config-path argument.
    pub const DUMP_CONFIG_PATH: &str = "dump-config-path";
    /// Name of the config argument.
    pub const CONFIG: &str = "config";

    /// Name of the `isolation` argument.
    pub const ISOLATION: &str = "isolation";
    /// Name of the `namespace` argument.
    pub const NAMESPACE: &str = "namespace";
    /// Name of the `order` argument.
    pub const ORDER: &str = "order";
    /// Name of the `seed` argument.
    pub const SEED: &str = "seed";
    /// Name of the `filter` argument.
    pub const FILTER: &str = "filter";
    /// Name of the `fail-fast` argument.
    pub const FAIL_FAST: &str = "fail-fast";
}

/// Gets the config file mentioned on the command line, or the default file if
/// no such file was named.
pub fn config_file(matches: &::clap::ArgMatches) -> path::PathBuf {
    matches
        .value_of_os(arg::CONFIG)
        .map_or_else(io::default_file, path::PathBuf::from)
}

/// Trait for things that can be updated from command line arguments taken from
/// `clap`.
pub trait Clappable: Sized {
    /// Merges configuration from a clap match dictionary into this, potentially
    /// replacing it entirely.
    fn parse_clap(self, matches: &::clap::ArgMatches) -> err::Result<Self>;
}

/// We can fill a top-level config using clap.
///
/// Engines and containers named on the command line are added to those in
/// the config; everything else replaces it.
impl Clappable for Config {
    fn parse_clap(mut self, matches: &::clap::ArgMatches) -> err::Result<Self> {
        self.isolation = self.isolation.parse_clap(matches)?;
        self.namespace = self.namespace.parse_clap(matches)?;
        self.order = self.order.parse_clap(matches)?;
        if let Some(seed) = matches.value_of(arg::SEED) {
            self.seed = Some(seed.parse().map_err(config::Error::BadSeed)?);
        }
        if let Some(filter) = matches.value_of(arg::FILTER) {
            self.filter = Some(filter.to_owned());
        }
        self.fail_fast |= matches.is_present(arg::FAIL_FAST);
        self.engines.extend(paths(matches, arg::ENGINE));
        self.containers.extend(paths(matches, arg::CONTAINER));
        Ok(self)
    }
}

/// We can fill an isolation level using clap.
impl Clappable for Isolation {
    fn parse_clap(self, matches: &::clap::ArgMatches) -> err::Result<Self> {
        Ok(parse_or(matches.value_of(arg::ISOLATION), self).map_err(config::Error::BadIsolation)?)
    }
}

/// We can fill a namespace policy using clap.
impl Clappable for dl::Namespace {
    fn parse_clap(self, matches: &::clap::ArgMatches) -> err::Result<Self> {
        Ok(parse_or(matches.value_of(arg::NAMESPACE), self).map_err(config::Error::BadNamespace)?)
    }
}

/// We can fill an order strategy using clap.
impl Clappable for order::Strategy {
    fn parse_clap(self, matches: &::clap::ArgMatches) -> err::Result<Self> {
        Ok(parse_or(matches.value_of(arg::ORDER), self)?)
    }
}

/// We can fill an output choice using clap.
impl Clappable for out::Choice {
    fn parse_clap(self, matches: &::clap::ArgMatches) -> err::Result<Self> {
        Ok(parse_or(matches.value_of(arg::OUTPUT_TYPE), self)?)
    }
}

/// We can fill an output config using clap.
impl Clappable for out::Config {
    fn parse_clap(mut self, matches: &::clap::ArgMatches) -> err::Result<Self> {
        self.choice = self.choice.parse_clap(matches)?;
        Ok(self)
    }
}

fn paths(matches: &::clap::ArgMatches, name: &str) -> Vec<path::PathBuf> {
    matches
        .values_of_os(name)
        .map_or_else(Vec::new, |vs| vs.map(path::PathBuf::from).collect())
}

/// Parses a `T` from clap matches, or supplies the default.
fn clap_or_default<T: Default + Clappable>(matches: &::clap::ArgMatches) -> err::Result<T> {
    T::default().parse_clap(matches)
}

fn parse_or<T: FromStr>(s: Option<&str>, default: T) -> std::result::Result<T, T::Err> {
    s.map_or(Ok(default), |s| s.parse())
}

/// Actions that can be specified on the command line.
pub enum Action {
    /// Asks to run the session, outputting with the given config.
    Run(out::Config),
    /// Asks to dump the config.
    DumpConfig,
    /// Asks to dump the path to the config.
    DumpConfigPath,
}

impl Action {
    /// Works out which action the command line asks for.
    pub fn from_clap(matches: &::clap::ArgMatches) -> err::Result<Self> {
        Ok(if matches.is_present(arg::DUMP_CONFIG) {
            Self::DumpConfig
        } else if matches.is_present(arg::DUMP_CONFIG_PATH) {
            Self::DumpConfigPath
        } else {
            Self::Run(clap_or_default(matches)?)
        })
    }
}

/// Builds the full config: defaults, then the config file, then the run
/// script if any, then the command line.
pub fn load_config(matches: &::clap::ArgMatches) -> err::Result<Config> {
    let mut config = io::load_or_default(&config_file(matches))?;
    if let Some(script) = matches.value_of_os(arg::SCRIPT) {
        let script = path::Path::new(script);
        tracing::debug!(script = %script.display(), "loading run script");
        config.extend_with(io::load(script)?);
    }
    config.parse_clap(matches)
}
