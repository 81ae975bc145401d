//! The binary interface between hosts and test containers.
//!
//! Everything that crosses the boundary is a `#[repr(C)]` struct or a plain
//! function pointer with C linkage.  The layouts here must line up with
//! `struct yunit_test` and `struct yunit_logger` in `include/yunit.h`.

use std::{
    ffi::{c_void, CStr, CString},
    os::raw::{c_char, c_int},
};

/// Name of the export listing the file extensions an engine can load.
pub const EXTENSIONS_SYMBOL: &str = "testContainerExtensions";
/// Name of the export that loads a test container.
pub const LOAD_SYMBOL: &str = "loadTestContainer";

/// Upper bound on the length of any null-terminated list read from a plugin.
///
/// This stops a corrupted (for instance, cyclic) list from hanging the host.
pub const MAX_ENTRIES: usize = 1_000_000;

/// Signature of `setUp_`, `test_`, and `tearDown_`.
///
/// These may unwind, so that a foreign exception escaping a test has defined
/// behaviour on the host side.
pub type PhaseFn = unsafe extern "C-unwind" fn(self_: *mut c_void, logger: *mut RawLogger);
/// Signature of `isIgnored_`; non-zero means ignored.
pub type IsIgnoredFn = unsafe extern "C" fn(self_: *const c_void) -> c_int;
/// Signature of `name_` and `source_`.
pub type StringFn = unsafe extern "C" fn(self_: *const c_void) -> *const c_char;
/// Signature of `line_`.
pub type LineFn = unsafe extern "C" fn(self_: *const c_void) -> c_int;

/// Signature of the `testContainerExtensions` export.
pub type ExtensionsFn = unsafe extern "C" fn() -> *const *const c_char;
/// Signature of the `loadTestContainer` export.
pub type LoadFn = unsafe extern "C" fn(path: *const c_char) -> *mut RawTest;

/// One test record, as laid out by the container that owns it.
///
/// Records form a null-terminated singly linked list through `next`.  The
/// container owns every node; hosts must never free them, and must not touch
/// them once the library they came from is unloaded.
#[repr(C)]
pub struct RawTest {
    /// Opaque context passed back to every function below.
    pub self_: *mut c_void,
    pub set_up: Option<PhaseFn>,
    pub test: Option<PhaseFn>,
    pub tear_down: Option<PhaseFn>,
    pub is_ignored: Option<IsIgnoredFn>,
    pub name: Option<StringFn>,
    pub source: Option<StringFn>,
    pub line: Option<LineFn>,
    /// The next record, or null at the end of the list.
    pub next: *mut RawTest,
}

/// Signature of the logger's `startTest_` and `success_`.
pub type NotifyFn = unsafe extern "C" fn(self_: *mut c_void);
/// Signature of the logger's `failure_` and `error_`.
pub type ReportFn = unsafe extern "C" fn(
    self_: *mut c_void,
    source: *const c_char,
    line: c_int,
    message: *const c_char,
);

/// The callback table hosts pass to every phase function.
///
/// Containers that can't throw across the boundary report assertion failures
/// through `failure` and anything unexpected through `error`.  A null
/// `source` means "wherever the test was declared".
#[repr(C)]
pub struct RawLogger {
    pub self_: *mut c_void,
    pub start_test: Option<NotifyFn>,
    pub success: Option<NotifyFn>,
    pub failure: Option<ReportFn>,
    pub error: Option<ReportFn>,
}

/// Copies a C string, treating null as empty.
///
/// # Safety
///
/// `p` must be null or point to a NUL-terminated string.
pub unsafe fn string_or_empty(p: *const c_char) -> String {
    if p.is_null() {
        String::new()
    } else {
        CStr::from_ptr(p).to_string_lossy().into_owned()
    }
}

/// Copies a null-terminated array of C strings, reading at most
/// [MAX_ENTRIES] of them.
///
/// # Safety
///
/// `arr` must be null or point to an array of valid C strings terminated by
/// a null pointer.
pub unsafe fn read_strings(arr: *const *const c_char) -> Vec<String> {
    let mut v = vec![];
    if arr.is_null() {
        return v;
    }
    for i in 0..MAX_ENTRIES {
        let p = *arr.add(i);
        if p.is_null() {
            break;
        }
        v.push(string_or_empty(p));
    }
    v
}

/// Converts `s` to a C string, dropping any interior NUL bytes.
pub fn to_cstring(s: &str) -> CString {
    let bytes: Vec<u8> = s.bytes().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default()
}

/// Converts a C line number to ours; negative lines become 0.
pub fn line_of(line: c_int) -> u32 {
    u32::try_from(line).unwrap_or(0)
}
