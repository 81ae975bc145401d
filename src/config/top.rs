use super::{err, order};
use crate::{
    dl,
    run::{halt, Isolation, Order},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
/// The top-level config structure.
///
/// Run scripts use the same shape as config files.
pub struct Config {
    /// How tests are isolated from the runner.
    pub isolation: Isolation,
    /// How engine libraries resolve symbols.
    pub namespace: dl::Namespace,
    /// The order tests run in.
    pub order: order::Strategy,
    /// The shuffle seed; a fresh one is drawn if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Whether to stop after the first failing test.
    pub fail_fast: bool,
    /// If present, only tests whose names contain this string run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Paths to test engine libraries.
    pub engines: Vec<PathBuf>,
    /// Paths to test containers.
    pub containers: Vec<PathBuf>,
}

impl Config {
    /// Layers `script` over this config.
    ///
    /// Engine and container lists are appended; any other field set to a
    /// non-default value in `script` replaces ours.
    pub fn extend_with(&mut self, script: Config) {
        let default = Config::default();
        if script.isolation != default.isolation {
            self.isolation = script.isolation;
        }
        if script.namespace != default.namespace {
            self.namespace = script.namespace;
        }
        if script.order != default.order {
            self.order = script.order;
        }
        if script.seed.is_some() {
            self.seed = script.seed;
        }
        self.fail_fast |= script.fail_fast;
        if script.filter.is_some() {
            self.filter = script.filter;
        }
        self.engines.extend(script.engines);
        self.containers.extend(script.containers);
    }

    /// Checks that this config can run on this platform.
    pub fn validate(&self) -> err::Result<()> {
        if self.isolation.is_available() {
            Ok(())
        } else {
            Err(err::Error::IsolationUnavailable(self.isolation))
        }
    }

    /// Gets the test order requested in this config.
    pub fn run_order(&self) -> Order {
        self.order.to_order(self.seed)
    }

    /// Gets the halting conditions requested in this config.
    pub fn halt_conditions(&self) -> impl Iterator<Item = halt::Condition> {
        self.fail_fast
            .then(|| halt::Condition::OnVerdict(crate::model::Verdict::Fail))
            .into_iter()
    }

    /// Tries to dump a config to a string.
    pub fn to_string(&self) -> err::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tries to load a config from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> err::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Configs survive a trip through TOML.
    fn test_toml() {
        let c = Config {
            isolation: Isolation::Process,
            order: order::Strategy::Shuffle,
            seed: Some(42),
            engines: vec![PathBuf::from("libengine.so")],
            containers: vec![PathBuf::from("sample.t.so")],
            ..Config::default()
        };
        let s = c.to_string().unwrap();
        assert_eq!(Config::from_str(&s).unwrap(), c);
    }

    #[test]
    /// Missing fields take their defaults.
    fn test_partial() {
        let c = Config::from_str("containers = [\"a.t.so\"]\n").unwrap();
        assert_eq!(c.isolation, Isolation::InProcess);
        assert_eq!(c.containers, [PathBuf::from("a.t.so")]);
    }

    #[test]
    /// Run scripts append lists and override scalars.
    fn test_extend_with() {
        let mut base = Config {
            engines: vec![PathBuf::from("a.so")],
            filter: Some("x".to_owned()),
            ..Config::default()
        };
        base.extend_with(Config {
            isolation: Isolation::Process,
            engines: vec![PathBuf::from("b.so")],
            ..Config::default()
        });
        assert_eq!(base.isolation, Isolation::Process);
        assert_eq!(base.engines, [PathBuf::from("a.so"), PathBuf::from("b.so")]);
        assert_eq!(base.filter.as_deref(), Some("x"));
    }

    #[test]
    /// Fail-fast adds a halt condition.
    fn test_halt_conditions() {
        assert_eq!(Config::default().halt_conditions().count(), 0);
        let c = Config {
            fail_fast: true,
            ..Config::default()
        };
        assert_eq!(c.halt_conditions().count(), 1);
    }
}
