//! Functions for loading config from a file.

use super::{
    err::{Error, Result},
    top::Config,
};
use std::{fs, path};

/// Gets a path to the default config file.
pub fn default_file() -> path::PathBuf {
    let mut path = default_dir();
    path.push("config.toml");
    path
}

/// Gets a path to the default config directory.
///
/// If the platform has no notion of a config directory, this is the current
/// directory.
pub fn default_dir() -> path::PathBuf {
    if let Some(mut ucd) = dirs::config_dir() {
        ucd.push("yunit");
        ucd
    } else {
        path::PathBuf::new()
    }
}

/// Loads a config (or run script) from `path`.
pub fn load(path: &path::Path) -> Result<Config> {
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_owned(),
        source,
    })?;
    Config::from_str(&text)
}

/// Loads a config from `path`, or the default config if `path` doesn't
/// exist.
pub fn load_or_default(path: &path::Path) -> Result<Config> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "loading config");
        load(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// The default config file lives in a yunit directory.
    fn test_default_file() {
        let f = default_file();
        assert_eq!(f.file_name().unwrap(), "config.toml");
        if dirs::config_dir().is_some() {
            assert!(f.parent().unwrap().ends_with("yunit"));
        }
    }

    #[test]
    /// Missing config files give the default config.
    fn test_load_or_default_missing() {
        let c = load_or_default(path::Path::new("/nonexistent/yunit/config.toml")).unwrap();
        assert_eq!(c, Config::default());
    }
}
