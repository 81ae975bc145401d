//! Loading through the `dlopen` crate's raw API.

use std::{
    ffi::{c_void, CStr},
    path::Path,
    ptr::NonNull,
};

/// A library opened with the platform loader's default flags.
pub(super) struct Portable {
    lib: dlopen::raw::Library,
}

impl Portable {
    pub(super) fn open(path: &Path) -> Result<Self, String> {
        dlopen::raw::Library::open(path)
            .map(|lib| Self { lib })
            .map_err(|e| e.to_string())
    }
}

impl super::Handle for Portable {
    fn symbol(&self, name: &CStr) -> Result<NonNull<c_void>, String> {
        let sym: *mut c_void = unsafe { self.lib.symbol_cstr(name) }.map_err(|e| e.to_string())?;
        NonNull::new(sym).ok_or_else(|| "symbol resolved to a null address".to_owned())
    }
}
