//! The plugin side of the engine ABI, for test containers written in Rust.
//!
//! [Exported] turns a [Registry] into the linked list of [RawTest] records a
//! host expects, and the [test_container!](crate::test_container) macro wires
//! it up to the two exports.  Panics never cross the boundary: each phase
//! runs under [guard::catch] and whatever it raised is reported through the
//! host's logger table.  A `cdylib` has its own panic hook, so the macro
//! installs the quiet one there too.

use super::abi::{self, RawLogger, RawTest};
use crate::{
    api::rust::{Registry, TestCase},
    model::{Phase, Record},
    run::guard,
};
use std::{
    ffi::{c_void, CString},
    os::raw::{c_char, c_int},
    ptr,
    sync::Arc,
};

/// Per-test state pointed at by each record's `self_`.
struct Slot {
    case: Arc<TestCase>,
    name: CString,
    source: CString,
}

/// A registry laid out for export across the engine ABI.
///
/// Everything is allocated once, up front, and never moves or changes
/// afterwards; hosts may hold the records for as long as the library stays
/// loaded.
pub struct Exported {
    _extensions: Vec<CString>,
    extension_ptrs: Vec<*const c_char>,
    _slots: Vec<Box<Slot>>,
    nodes: Vec<Box<RawTest>>,
}

// Nothing reachable from an `Exported` is mutated after construction, and
// test cases are themselves `Send + Sync`.
unsafe impl Send for Exported {}
unsafe impl Sync for Exported {}

impl Exported {
    /// Lays out `registry` for export, claiming `extensions`.
    pub fn new(extensions: &[&str], registry: Registry) -> Self {
        let extensions: Vec<CString> = extensions.iter().map(|e| abi::to_cstring(e)).collect();
        let mut extension_ptrs: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();
        extension_ptrs.push(ptr::null());

        let slots: Vec<Box<Slot>> = registry
            .iter()
            .map(|case| {
                Box::new(Slot {
                    name: abi::to_cstring(case.name()),
                    source: abi::to_cstring(&case.location().source),
                    case: case.clone(),
                })
            })
            .collect();

        let mut nodes: Vec<Box<RawTest>> = slots
            .iter()
            .map(|slot| {
                Box::new(RawTest {
                    self_: slot.as_ref() as *const Slot as *mut c_void,
                    set_up: Some(set_up),
                    test: Some(test),
                    tear_down: Some(tear_down),
                    is_ignored: Some(is_ignored),
                    name: Some(name),
                    source: Some(source),
                    line: Some(line),
                    next: ptr::null_mut(),
                })
            })
            .collect();
        // Boxes don't move when the vector does, so these links stay valid.
        for i in (1..nodes.len()).rev() {
            let next: *mut RawTest = nodes[i].as_mut();
            nodes[i - 1].next = next;
        }

        Self {
            _extensions: extensions,
            extension_ptrs,
            _slots: slots,
            nodes,
        }
    }

    /// Gets the null-terminated extension array for `testContainerExtensions`.
    pub fn extensions(&self) -> *const *const c_char {
        self.extension_ptrs.as_ptr()
    }

    /// Gets the head of the record list, or null if there are no tests.
    pub fn head(&self) -> *const RawTest {
        self.nodes
            .first()
            .map_or(ptr::null(), |n| n.as_ref() as *const RawTest)
    }

    /// Implements `loadTestContainer`.
    ///
    /// A Rust container carries its tests in the library itself, so `path`
    /// only shows up in diagnostics.
    ///
    /// # Safety
    ///
    /// `path` must be null or a valid C string.
    pub unsafe fn load(&self, path: *const c_char) -> *mut RawTest {
        tracing::debug!(path = %abi::string_or_empty(path), tests = self.len(), "exporting test container");
        self.head() as *mut RawTest
    }

    /// Gets the number of exported tests.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Gets whether there are no exported tests.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

unsafe fn slot<'a>(self_: *const c_void) -> Option<&'a Slot> {
    (self_ as *const Slot).as_ref()
}

unsafe extern "C-unwind" fn set_up(self_: *mut c_void, logger: *mut RawLogger) {
    run_phase(self_, logger, Phase::SetUp)
}

unsafe extern "C-unwind" fn test(self_: *mut c_void, logger: *mut RawLogger) {
    run_phase(self_, logger, Phase::Test)
}

unsafe extern "C-unwind" fn tear_down(self_: *mut c_void, logger: *mut RawLogger) {
    run_phase(self_, logger, Phase::TearDown)
}

unsafe fn run_phase(self_: *mut c_void, logger: *mut RawLogger, phase: Phase) {
    let slot = match slot(self_) {
        Some(s) => s,
        None => return,
    };
    let result = guard::catch(|| slot.case.thunk(phase).invoke());
    let logger = match logger.as_mut() {
        Some(l) => l,
        None => return,
    };
    match result {
        Ok(()) => {
            if let Some(f) = logger.success {
                f(logger.self_)
            }
        }
        Err(payload) => report(logger, guard::classify(payload)),
    }
}

/// Sends `record` to the host, leaving the source null if it's unknown.
unsafe fn report(logger: &mut RawLogger, record: Record) {
    let f = if record.kind.is_failure() {
        logger.failure
    } else {
        logger.error
    };
    let f = match f {
        Some(f) => f,
        None => return,
    };
    let message = abi::to_cstring(&record.message);
    let source = record
        .location
        .is_known()
        .then(|| abi::to_cstring(&record.location.source));
    f(
        logger.self_,
        source.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
        c_int::try_from(record.location.line).unwrap_or(c_int::MAX),
        message.as_ptr(),
    )
}

unsafe extern "C" fn is_ignored(self_: *const c_void) -> c_int {
    slot(self_).map_or(0, |s| c_int::from(s.case.is_ignored()))
}

unsafe extern "C" fn name(self_: *const c_void) -> *const c_char {
    slot(self_).map_or(ptr::null(), |s| s.name.as_ptr())
}

unsafe extern "C" fn source(self_: *const c_void) -> *const c_char {
    slot(self_).map_or(ptr::null(), |s| s.source.as_ptr())
}

unsafe extern "C" fn line(self_: *const c_void) -> c_int {
    slot(self_).map_or(0, |s| c_int::try_from(s.case.location().line).unwrap_or(c_int::MAX))
}

/// Exports the engine ABI from a Rust `cdylib`.
///
/// `register` is a [Registrar](crate::api::rust::Registrar); it runs once,
/// the first time the host calls either export.
///
/// ```ignore
/// fn register(r: &mut yunit::api::rust::Registry) {
///     yunit::test_case!(r, "emptyTest", || {});
/// }
///
/// yunit::test_container!(extensions: [".t.so"], register: register);
/// ```
#[macro_export]
macro_rules! test_container {
    (extensions: [$($ext:expr),* $(,)?], register: $register:path $(,)?) => {
        static __YUNIT_EXPORTED: ::std::sync::OnceLock<$crate::api::c::Exported> =
            ::std::sync::OnceLock::new();

        fn __yunit_exported() -> &'static $crate::api::c::Exported {
            __YUNIT_EXPORTED.get_or_init(|| {
                $crate::run::guard::install_hook();
                $crate::api::c::Exported::new(
                    &[$($ext),*],
                    $crate::api::rust::Registry::from_registrar($register),
                )
            })
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn testContainerExtensions() -> *const *const ::std::os::raw::c_char {
            __yunit_exported().extensions()
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn loadTestContainer(
            path: *const ::std::os::raw::c_char,
        ) -> *mut $crate::api::c::RawTest {
            __yunit_exported().load(path)
        }
    };
}
