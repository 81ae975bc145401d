//! Dynamic library loading.
//!
//! Test engines arrive as shared objects.  A [Library] opens one, resolves
//! its exports, and remembers the last error the platform loader reported so
//! that hosts can surface it to the user.
//!
//! Libraries are opened under a [Namespace] policy.  The default,
//! [Namespace::Isolated], makes symbols inside the loaded library win over
//! identically named symbols already present in the process, so that two
//! test containers (or a container and the host) exporting the same names do
//! not bind to each other.

#[cfg(all(target_os = "linux", target_env = "gnu"))]
mod deep;
mod portable;

use serde::{Deserialize, Serialize};
use std::{
    ffi::{c_void, CStr, CString},
    fmt::Display,
    path::{Path, PathBuf},
    ptr::NonNull,
    str::FromStr,
};
use thiserror::Error;

/// Errors raised while loading libraries or resolving their symbols.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller tried to load a library into a [Library] that already
    /// holds one.
    #[error("a library is already loaded from {0}")]
    AlreadyLoaded(PathBuf),

    /// The caller tried to resolve a symbol with nothing loaded.
    #[error("no library is loaded")]
    NotLoaded,

    /// The platform loader refused to open the library.
    #[error("couldn't open {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// The library does not export the requested symbol.
    #[error("couldn't resolve symbol `{name}`: {message}")]
    MissingSymbol { name: String, message: String },

    /// The requested symbol name can't be passed to the platform loader.
    #[error("symbol name {0:?} contains a NUL byte")]
    BadSymbolName(String),
}

/// Shorthand for results over [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Symbol visibility policy used when opening a library.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    /// Prefer the library's own symbols over those already in the process.
    Isolated,
    /// Use the platform loader's default binding rules.
    Shared,
}

/// String representations for namespaces.
pub mod string {
    /// String representation of [super::Namespace::Isolated].
    pub const ISOLATED: &str = "isolated";
    /// String representation of [super::Namespace::Shared].
    pub const SHARED: &str = "shared";
    /// All string representations.
    pub const ALL: &[&str] = &[ISOLATED, SHARED];
}

/// The default namespace is [Namespace::Isolated].
impl Default for Namespace {
    fn default() -> Self {
        Self::Isolated
    }
}

/// # Examples
///
/// ```
/// use yunit::dl::Namespace;
/// assert_eq!(Namespace::Isolated.to_string(), "isolated");
/// assert_eq!(Namespace::Shared.to_string(), "shared");
/// ```
impl Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Isolated => string::ISOLATED,
            Self::Shared => string::SHARED,
        })
    }
}

/// # Examples
///
/// ```
/// use yunit::dl::Namespace;
/// assert_eq!("Isolated".parse::<Namespace>(), Ok(Namespace::Isolated));
/// assert_eq!("shared".parse::<Namespace>(), Ok(Namespace::Shared));
/// assert!("global".parse::<Namespace>().is_err());
/// ```
impl FromStr for Namespace {
    /// Errors just take ownership of the invalid string.
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lc = s.to_lowercase();
        match &*lc {
            string::ISOLATED => Ok(Self::Isolated),
            string::SHARED => Ok(Self::Shared),
            _ => Err(lc),
        }
    }
}

/// An open platform library handle.
///
/// Dropping the handle closes the library.
trait Handle {
    /// Looks up `name`, returning the loader's diagnostic on failure.
    fn symbol(&self, name: &CStr) -> std::result::Result<NonNull<c_void>, String>;
}

/// A dynamically loaded library, plus the last error seen while handling it.
pub struct Library {
    namespace: Namespace,
    handle: Option<Box<dyn Handle>>,
    path: Option<PathBuf>,
    error: Option<String>,
}

impl Library {
    /// Constructs an empty library slot that will open libraries under
    /// `namespace`.
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            handle: None,
            path: None,
            error: None,
        }
    }

    /// Opens the library at `path`.
    ///
    /// Clears any previously recorded error.  Refuses to open a second library
    /// while one is already loaded.
    pub fn load_lib(&mut self, path: &Path) -> Result<()> {
        self.error = None;
        if let Some(loaded) = &self.path {
            let loaded = loaded.clone();
            return self.fail(Error::AlreadyLoaded(loaded));
        }

        match open(self.namespace, path) {
            Ok(handle) => {
                tracing::debug!(path = %path.display(), namespace = %self.namespace, "opened library");
                self.handle = Some(handle);
                self.path = Some(path.to_owned());
                Ok(())
            }
            Err(message) => self.fail(Error::Open {
                path: path.to_owned(),
                message,
            }),
        }
    }

    /// Resolves the exported symbol `name`.
    ///
    /// Every symbol this crate resolves is a function, so a symbol that
    /// resolves to a null address is treated as missing.
    pub fn resolve(&mut self, name: &str) -> Result<NonNull<c_void>> {
        let cname = match CString::new(name) {
            Ok(c) => c,
            Err(_) => return self.fail(Error::BadSymbolName(name.to_owned())),
        };
        let result = match &self.handle {
            None => Err(Error::NotLoaded),
            Some(h) => h.symbol(&cname).map_err(|message| Error::MissingSymbol {
                name: name.to_owned(),
                message,
            }),
        };
        match result {
            Ok(sym) => {
                tracing::trace!(symbol = name, "resolved symbol");
                Ok(sym)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Closes the library, if one is open.
    ///
    /// Every pointer previously resolved through this library is invalid
    /// after this call.  Returns whether a library was actually closed.
    pub fn unload(&mut self) -> bool {
        let was_loaded = self.handle.take().is_some();
        if let Some(path) = self.path.take() {
            tracing::debug!(path = %path.display(), "closed library");
        }
        was_loaded
    }

    /// Gets the message for the most recent error, if the most recent
    /// operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Gets whether a library is currently open.
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Gets the path of the currently open library.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the namespace policy this library opens with.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn fail<T>(&mut self, e: Error) -> Result<T> {
        tracing::debug!(error = %e, "library operation failed");
        self.error = Some(e.to_string());
        Err(e)
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(Namespace::default())
    }
}

fn open(namespace: Namespace, path: &Path) -> std::result::Result<Box<dyn Handle>, String> {
    match namespace {
        Namespace::Isolated => open_isolated(path),
        Namespace::Shared => Ok(Box::new(portable::Portable::open(path)?)),
    }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn open_isolated(path: &Path) -> std::result::Result<Box<dyn Handle>, String> {
    Ok(Box::new(deep::Deep::open(path)?))
}

/// Mach-O two-level namespaces and PE per-module imports already bind a
/// library's references to its own definitions.
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn open_isolated(path: &Path) -> std::result::Result<Box<dyn Handle>, String> {
    Ok(Box::new(portable::Portable::open(path)?))
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    const LIBC: &str = "libc.so.6";

    fn check_libc(namespace: Namespace) {
        let mut lib = Library::new(namespace);
        lib.load_lib(Path::new(LIBC)).unwrap();
        assert!(lib.is_loaded());
        assert!(lib.error().is_none());
        assert!(lib.resolve("strlen").is_ok());

        assert!(matches!(
            lib.resolve("testContainerExtensions"),
            Err(Error::MissingSymbol { .. })
        ));
        assert!(lib.error().unwrap().contains("testContainerExtensions"));

        assert!(lib.unload());
        assert!(matches!(lib.resolve("strlen"), Err(Error::NotLoaded)));
        assert!(!lib.unload());
    }

    #[test]
    /// Isolated libraries open and resolve like any other.
    fn test_isolated_libc() {
        check_libc(Namespace::Isolated)
    }

    #[test]
    /// Shared libraries go through the portable loader.
    fn test_shared_libc() {
        check_libc(Namespace::Shared)
    }

    #[test]
    /// Opening a nonexistent file records the loader's message.
    fn test_open_missing() {
        let mut lib = Library::default();
        let err = lib
            .load_lib(Path::new("/nonexistent/libnothing.t.so"))
            .unwrap_err();
        assert!(matches!(err, Error::Open { .. }));
        assert!(lib.error().is_some());
        assert!(!lib.is_loaded());
    }

    #[test]
    /// A second load is refused, and a later success clears the error.
    fn test_no_double_open() {
        let mut lib = Library::default();
        lib.load_lib(Path::new(LIBC)).unwrap();
        assert!(matches!(
            lib.load_lib(Path::new(LIBC)),
            Err(Error::AlreadyLoaded(_))
        ));
        assert!(lib.error().is_some());
        lib.unload();
        lib.load_lib(Path::new(LIBC)).unwrap();
        assert!(lib.error().is_none());
    }
}
