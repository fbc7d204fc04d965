// ============================================================================
// Core FFI functions for library initialization and management
// ============================================================================

use crate::config::AppConfig;
use crate::ffi::{error, handle_json_result, handle_status_result, read_payload};
use crate::ffi::error::FFIError;
use std::ffi::{c_char, CString};
use std::os::raw::c_int;

/// Initialize the library. `config_json` is an `AppConfig` object; pass null
/// to read the configuration from the environment instead.
/// Returns 0 on success, non-zero on error
#[unsafe(no_mangle)]
pub unsafe extern "C" fn initialize_library(config_json: *const c_char) -> c_int {
    let result = std::panic::catch_unwind(|| {
        let config: AppConfig = if config_json.is_null() {
            AppConfig::from_env()?
        } else {
            unsafe { read_payload(config_json)? }
        };
        crate::initialize(config)
    });

    match result {
        Ok(ffi_result) => handle_status_result(|| ffi_result),
        Err(panic_payload) => {
            let panic_msg = if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Panicked during FFI call, but panic message is not a string".to_string()
            };
            log::error!("Panic in initialize_library: {}", panic_msg);
            handle_status_result(|| Err(FFIError::internal(format!("Panic during initialization: {}", panic_msg))))
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_library_initialized() -> bool {
    crate::globals::is_initialized()
}

/// Frees a C string that was allocated by Rust and passed over FFI.
/// This function should be called by the C/Swift side for any string
/// that was created in Rust using `CString::into_raw()`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        // Takes ownership of the CString and drops it
        let _ = unsafe { CString::from_raw(ptr) };
    }
}

/// Get library version
/// Returns allocated string that must be freed with free_string()
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_library_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION")).map_or(std::ptr::null_mut(), CString::into_raw)
}

/// The error of the last failed call on this thread as JSON, or null.
/// Returns allocated string that must be freed with free_string()
#[unsafe(no_mangle)]
pub unsafe extern "C" fn get_last_error() -> *mut c_char {
    match error::take_last_error() {
        Some(err) => handle_json_result(|| Ok(err)),
        None => std::ptr::null_mut(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::test_support::init_fixture;

    #[test]
    fn test_initialize_library_rejects_bad_json() {
        init_fixture();
        let bad = CString::new(r#"{"data_source": "carrier-pigeon"}"#).unwrap();
        let code = unsafe { initialize_library(bad.as_ptr()) };
        assert_ne!(code, 0);

        let last = unsafe { get_last_error() };
        assert!(!last.is_null());
        unsafe { free_string(last) };
        assert!(unsafe { is_library_initialized() });
    }

    #[test]
    fn test_version() {
        let ptr = unsafe { get_library_version() };
        let version = unsafe { CString::from_raw(ptr) }.into_string().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }
}
