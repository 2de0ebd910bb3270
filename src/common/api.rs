#![allow(unsafe_code)]

#[cfg(feature = "native")]
use super::binding;
#[cfg(feature = "native")]
use std::{ffi::CStr, sync::OnceLock};

/// Returns the version string of the linked zlib, if the native backend is compiled in.
///
/// # Example
///
/// ```
/// if let Some(version) = zcodec::native_version() {
///     assert!(version.starts_with("1."));
/// }
/// ```
pub fn native_version() -> Option<&'static str> {
    #[cfg(feature = "native")]
    {
        static VERSION: OnceLock<Option<&'static str>> = OnceLock::new();
        *VERSION.get_or_init(|| {
            let ptr = unsafe { binding::zshim_version() };
            if ptr.is_null() {
                return None;
            }
            // zlibVersion() points at a static string inside the library.
            unsafe { CStr::from_ptr(ptr) }.to_str().ok()
        })
    }

    #[cfg(not(feature = "native"))]
    {
        None
    }
}

/// Returns `true` if the native zlib backend can be instantiated.
///
/// The native backend is only reported available when the linked library is
/// a zlib 1.x release, whose stream layout the C shim was compiled against.
pub fn native_available() -> bool {
    native_version().map_or(false, |version| version.starts_with("1."))
}
