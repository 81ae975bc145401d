//! glibc loading with `RTLD_DEEPBIND`.

use std::{
    ffi::{c_void, CStr, CString},
    os::unix::ffi::OsStrExt,
    path::Path,
    ptr::NonNull,
};

/// A handle from `dlopen` with local, deep-bound symbol resolution.
pub(super) struct Deep {
    raw: NonNull<c_void>,
}

impl Deep {
    pub(super) fn open(path: &Path) -> Result<Self, String> {
        let cpath = CString::new(path.as_os_str().as_bytes()).map_err(|e| e.to_string())?;
        let flags = libc::RTLD_LAZY | libc::RTLD_LOCAL | libc::RTLD_DEEPBIND;
        let raw = unsafe { libc::dlopen(cpath.as_ptr(), flags) };
        NonNull::new(raw).map(|raw| Self { raw }).ok_or_else(last_error)
    }
}

impl super::Handle for Deep {
    fn symbol(&self, name: &CStr) -> Result<NonNull<c_void>, String> {
        // Clear any stale error so a null result can be told apart from a
        // symbol that genuinely resolves to null.
        unsafe { libc::dlerror() };
        let sym = unsafe { libc::dlsym(self.raw.as_ptr(), name.as_ptr()) };
        NonNull::new(sym).ok_or_else(last_error)
    }
}

impl Drop for Deep {
    fn drop(&mut self) {
        if unsafe { libc::dlclose(self.raw.as_ptr()) } != 0 {
            tracing::warn!(error = %last_error(), "dlclose failed");
        }
    }
}

fn last_error() -> String {
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        "symbol resolved to a null address".to_owned()
    } else {
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}
