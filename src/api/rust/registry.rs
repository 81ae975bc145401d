//! The test registry.
//!
//! A [Registry] is a flat list of test cases in registration order, which is
//! also the order they run in.  Grouping by source file is offered as a view
//! ([Registry::suites]) rather than as the storage layout.
//!
//! There is one *active* registry per process, created on first use.  Hosts
//! can swap in a fresh one with [set] or [reinitialize]; test cases are held
//! by `Arc`, so swapping never invalidates a case someone still holds.
//!
//! Plugins don't rely on static initialisers to register their tests.
//! Instead they expose a registration function (see [Registrar]) that the
//! host calls against a registry of its choosing.

use super::case::TestCase;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// The type of explicit registration entry points.
pub type Registrar = fn(&mut Registry);

/// An ordered collection of test cases.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    cases: Vec<Arc<TestCase>>,
}

impl Registry {
    /// Constructs an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a registry and fills it using `register`.
    pub fn from_registrar(register: Registrar) -> Self {
        let mut r = Self::new();
        register(&mut r);
        r
    }

    /// Appends a test case, returning a shared handle to it.
    pub fn add(&mut self, case: TestCase) -> Arc<TestCase> {
        let case = Arc::new(case);
        self.add_test_case(case.clone());
        case
    }

    /// Appends an already shared test case.
    pub fn add_test_case(&mut self, case: Arc<TestCase>) {
        tracing::trace!(test = case.name(), "registered test case");
        self.cases.push(case);
    }

    /// Iterates over the test cases in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TestCase>> + '_ {
        self.cases.iter()
    }

    /// Gets the number of test cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Gets whether there are no test cases.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Finds the first test case with the given name and source file.
    pub fn find(&self, name: &str, source: &str) -> Option<&Arc<TestCase>> {
        self.cases
            .iter()
            .find(|c| c.name() == name && c.location().source == source)
    }

    /// Groups the test cases by source file.
    ///
    /// Suites appear in the order their first test case was registered, and
    /// keep registration order within themselves.
    pub fn suites(&self) -> Vec<Suite<'_>> {
        let mut suites: Vec<Suite> = vec![];
        for case in &self.cases {
            let source = case.location().source.as_str();
            match suites.iter_mut().find(|s| s.source == source) {
                Some(s) => s.cases.push(case),
                None => suites.push(Suite {
                    source,
                    cases: vec![case],
                }),
            }
        }
        suites
    }
}

impl Extend<TestCase> for Registry {
    fn extend<T: IntoIterator<Item = TestCase>>(&mut self, iter: T) {
        for case in iter {
            self.add(case);
        }
    }
}

/// The test cases declared in one source file.
#[derive(Debug)]
pub struct Suite<'a> {
    /// The source file.
    pub source: &'a str,
    /// The test cases, in registration order.
    pub cases: Vec<&'a Arc<TestCase>>,
}

static ACTIVE: OnceLock<Mutex<Registry>> = OnceLock::new();

fn active() -> &'static Mutex<Registry> {
    ACTIVE.get_or_init(Default::default)
}

/// Locks the active registry, creating it if this is the first use.
///
/// Registration only ever appends, so a panic while the lock was held can't
/// have left the registry half-updated; poisoning is ignored.
pub fn get() -> MutexGuard<'static, Registry> {
    active().lock().unwrap_or_else(PoisonError::into_inner)
}

/// Alias of [get], for hosts that want to make first use explicit.
pub fn initialize() -> MutexGuard<'static, Registry> {
    get()
}

/// Makes `registry` the active registry, returning the previous one.
pub fn set(registry: Registry) -> Registry {
    std::mem::replace(&mut *get(), registry)
}

/// Replaces the active registry with an empty one, returning the previous
/// one.
pub fn reinitialize() -> Registry {
    set(Registry::new())
}

/// Appends `case` to the active registry.
pub fn add(case: TestCase) -> Arc<TestCase> {
    get().add(case)
}
