//! Test engines: shared libraries that know how to load test containers.

use super::{
    abi::{self, ExtensionsFn, LoadFn},
    container::Container,
    err::{Error, Result},
};
use crate::dl;
use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

/// The lifecycle state of an [Engine].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// The engine file exists but its library isn't open.
    Created,
    /// The library is open and both exports are resolved.
    Initialized,
    /// The library has been released; the engine can't be used again.
    Unloaded,
}

impl Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Unloaded => "unloaded",
        })
    }
}

/// The resolved exports of an initialised engine.
#[derive(Copy, Clone)]
struct Entry {
    extensions: ExtensionsFn,
    load: LoadFn,
}

/// A test engine backed by a dynamically loaded library.
pub struct Engine {
    path: PathBuf,
    lib: dl::Library,
    entry: Option<Entry>,
    state: State,
    error: Option<String>,
}

impl Engine {
    /// Prepares the engine at `path`, to be opened under `namespace`.
    ///
    /// This only checks that the file exists; nothing is loaded until
    /// [Engine::initialize].
    pub fn new(path: impl Into<PathBuf>, namespace: dl::Namespace) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::NoSuchFile(path));
        }
        Ok(Self {
            path,
            lib: dl::Library::new(namespace),
            entry: None,
            state: State::Created,
            error: None,
        })
    }

    /// Opens the engine library and resolves its exports.
    ///
    /// On failure the engine stays [State::Created] and the reason is
    /// available from [Engine::error].  Initialising an already initialised
    /// engine does nothing.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            State::Initialized => return Ok(()),
            State::Unloaded => return Err(Error::Unloaded(self.path.clone())),
            State::Created => (),
        }
        self.error = None;

        if let Err(e) = self.lib.load_lib(&self.path) {
            return self.fail(Error::LibraryOpen(e));
        }
        match self.resolve_entry() {
            Ok(entry) => {
                self.entry = Some(entry);
                self.state = State::Initialized;
                tracing::info!(path = %self.path.display(), "initialised test engine");
                Ok(())
            }
            Err(e) => {
                self.lib.unload();
                self.fail(Error::MissingSymbol(e))
            }
        }
    }

    fn resolve_entry(&mut self) -> dl::Result<Entry> {
        let extensions = self.lib.resolve(abi::EXTENSIONS_SYMBOL)?;
        let load = self.lib.resolve(abi::LOAD_SYMBOL)?;
        // Both symbols are non-null function addresses with these signatures
        // by contract of the engine ABI.
        unsafe {
            Ok(Entry {
                extensions: std::mem::transmute::<*mut std::ffi::c_void, ExtensionsFn>(
                    extensions.as_ptr(),
                ),
                load: std::mem::transmute::<*mut std::ffi::c_void, LoadFn>(load.as_ptr()),
            })
        }
    }

    /// Gets the file extensions this engine can load containers from.
    pub fn supported_extensions(&self) -> Result<Vec<String>> {
        let entry = self.entry()?;
        Ok(unsafe { abi::read_strings((entry.extensions)()) })
    }

    /// Loads the test container at `path`.
    ///
    /// The container borrows this engine, so the engine can't be unloaded
    /// until the container is dropped.
    pub fn load(&self, path: &Path) -> Result<Container<'_>> {
        let entry = self.entry()?;
        let cpath = path
            .to_str()
            .map(abi::to_cstring)
            .filter(|c| c.as_bytes().len() == path.as_os_str().len())
            .ok_or_else(|| Error::BadPath(path.to_owned()))?;
        tracing::debug!(engine = %self.path.display(), container = %path.display(), "loading container");
        let head = unsafe { (entry.load)(cpath.as_ptr()) };
        // The records live in the engine's library, which outlives the
        // returned container.
        unsafe { Container::from_head(path, head) }
    }

    /// Releases the engine library.
    ///
    /// The engine can't be used afterwards.  Unloading twice does nothing.
    pub fn unload(&mut self) {
        if self.state == State::Unloaded {
            return;
        }
        self.entry = None;
        self.lib.unload();
        self.state = State::Unloaded;
        tracing::info!(path = %self.path.display(), "unloaded test engine");
    }

    /// Gets the engine's path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the engine's state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Gets the message for the most recent failure, if the most recent
    /// operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn entry(&self) -> Result<Entry> {
        match self.state {
            State::Initialized => self
                .entry
                .ok_or_else(|| Error::NotInitialized(self.path.clone())),
            State::Created => Err(Error::NotInitialized(self.path.clone())),
            State::Unloaded => Err(Error::Unloaded(self.path.clone())),
        }
    }

    fn fail<T>(&mut self, e: Error) -> Result<T> {
        tracing::warn!(path = %self.path.display(), error = %e, "test engine failed to initialise");
        self.error = Some(e.to_string());
        Err(e)
    }
}
