//! The engine factory: picks the engine for a container by its extension.

use super::{
    container::Container,
    engine::Engine,
    err::{Error, Result},
};
use crate::dl;
use std::path::{Path, PathBuf};

/// A set of initialised engines plus the extensions each supports.
#[derive(Default)]
pub struct Factory {
    engines: Vec<Registered>,
}

struct Registered {
    engine: Engine,
    extensions: Vec<String>,
}

impl Factory {
    /// Constructs an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens and initialises the engine at `path`, then adds it.
    ///
    /// Returns the extensions the engine claims.
    pub fn add_engine(&mut self, path: impl Into<PathBuf>, namespace: dl::Namespace) -> Result<&[String]> {
        let mut engine = Engine::new(path, namespace)?;
        engine.initialize()?;
        let extensions = engine.supported_extensions()?;
        tracing::info!(engine = %engine.path().display(), ?extensions, "registered test engine");
        self.engines.push(Registered { engine, extensions });
        Ok(self
            .engines
            .last()
            .map(|r| r.extensions.as_slice())
            .unwrap_or_default())
    }

    /// Gets whether the factory holds no engines.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Gets the number of engines in the factory.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Iterates over the factory's engines, in the order they were added.
    pub fn engines(&self) -> impl Iterator<Item = &Engine> + '_ {
        self.engines.iter().map(|r| &r.engine)
    }

    /// Finds the engine that should load `container`.
    ///
    /// The engine claiming the longest extension that `container`'s file name
    /// ends with wins; ties go to the engine added first.
    pub fn engine_for(&self, container: &Path) -> Result<&Engine> {
        let name = container
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut best: Option<(&Engine, usize)> = None;
        for r in &self.engines {
            for ext in r.extensions.iter().filter(|e| !e.is_empty() && name.ends_with(e.as_str())) {
                if best.map_or(true, |(_, len)| len < ext.len()) {
                    best = Some((&r.engine, ext.len()));
                }
            }
        }
        best.map(|(e, _)| e)
            .ok_or_else(|| Error::NoEngineFor(container.to_owned()))
    }

    /// Loads `container` with whichever engine supports it.
    pub fn load(&self, container: &Path) -> Result<Container<'_>> {
        self.engine_for(container)?.load(container)
    }

    /// Unloads every engine.
    pub fn unload_all(&mut self) {
        for r in &mut self.engines {
            r.engine.unload();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// An empty factory has no engine for anything.
    fn test_engine_for_empty() {
        let f = Factory::new();
        assert!(f.is_empty());
        assert!(matches!(
            f.engine_for(Path::new("sample.t.so")),
            Err(Error::NoEngineFor(_))
        ));
    }
}
