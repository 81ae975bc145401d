//! Host-side implementation of the C logger table.
//!
//! Each phase call gets a fresh [RawLogger] pointing at the phase's [Sink];
//! anything the container reports lands there.

use super::abi::{self, RawLogger};
use crate::{logger::Sink, model::Location};
use std::{
    ffi::c_void,
    os::raw::{c_char, c_int},
};

/// Builds a logger table that records reports into `sink`.
///
/// The table borrows `sink` through a raw pointer; it must not be used after
/// `sink` goes away.
pub(super) fn bridge(sink: &mut Sink) -> RawLogger {
    RawLogger {
        self_: sink as *mut Sink as *mut c_void,
        start_test: Some(start_test),
        success: Some(success),
        failure: Some(failure),
        error: Some(error),
    }
}

unsafe extern "C" fn start_test(_self: *mut c_void) {
    tracing::trace!("container sent startTest");
}

unsafe extern "C" fn success(_self: *mut c_void) {
    tracing::trace!("container sent success");
}

unsafe extern "C" fn failure(
    self_: *mut c_void,
    source: *const c_char,
    line: c_int,
    message: *const c_char,
) {
    if let Some(sink) = (self_ as *mut Sink).as_mut() {
        sink.failure(location(source, line), abi::string_or_empty(message));
    }
}

unsafe extern "C" fn error(
    self_: *mut c_void,
    source: *const c_char,
    line: c_int,
    message: *const c_char,
) {
    if let Some(sink) = (self_ as *mut Sink).as_mut() {
        sink.error(location(source, line), abi::string_or_empty(message));
    }
}

unsafe fn location(source: *const c_char, line: c_int) -> Location {
    if source.is_null() {
        Location::unknown()
    } else {
        Location::new(abi::string_or_empty(source), abi::line_of(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhaseOutcome;
    use std::ffi::CString;

    #[test]
    /// Reports made through the table reach the sink.
    fn test_bridge_failure() {
        let mut sink = Sink::default();
        let raw = bridge(&mut sink);
        let source = CString::new("sample.t.c").unwrap();
        let message = CString::new("false != true").unwrap();
        unsafe {
            (raw.start_test.unwrap())(raw.self_);
            (raw.failure.unwrap())(raw.self_, source.as_ptr(), 10, message.as_ptr());
        }
        match sink.into_outcome() {
            PhaseOutcome::Failure(r) => {
                assert_eq!(r.location, Location::new("sample.t.c", 10));
                assert_eq!(r.message, "false != true");
            }
            o => panic!("unexpected outcome {:?}", o),
        }
    }

    #[test]
    /// Errors without a source have an unknown location.
    fn test_bridge_error_no_source() {
        let mut sink = Sink::default();
        let raw = bridge(&mut sink);
        let message = CString::new("boom").unwrap();
        unsafe { (raw.error.unwrap())(raw.self_, std::ptr::null(), 0, message.as_ptr()) };
        match sink.into_outcome() {
            PhaseOutcome::Error(r) => assert!(!r.location.is_known()),
            o => panic!("unexpected outcome {:?}", o),
        }
    }
}
