//! C ABI for the presentation shell. Every call takes a JSON payload and
//! writes a JSON result; strings handed out must be released with
//! `free_string`.

use std::ffi::{CStr, CString};
use std::future::Future;
use std::os::raw::{c_char, c_int};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Runtime;
use crate::ffi::error::{ErrorCode, FFIError};

/// Returns `NullPointer` from the enclosing closure when a pointer is null.
macro_rules! ensure_ptr {
    ($p:expr) => {
        if $p.is_null() {
            return Err($crate::ffi::error::FFIError::new(
                $crate::ffi::error::ErrorCode::NullPointer,
                concat!("Null pointer: ", stringify!($p)),
            ));
        }
    };
}

pub mod auth;
pub mod campaign;
pub mod core;
pub mod error;
pub mod listing;
pub mod project;
pub mod user;

// Re-export FFIResult for convenience within the ffi module
pub use error::FFIResult;

static RUNTIME: Lazy<Option<Runtime>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| log::error!("Failed to create Tokio runtime: {}", e))
        .ok()
});

/// Runs `future` to completion on the shared runtime.
pub(crate) fn block_on_async<F, T, E>(future: F) -> FFIResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<FFIError>,
{
    let runtime = RUNTIME
        .as_ref()
        .ok_or_else(|| FFIError::internal("Tokio runtime unavailable".to_string()))?;
    runtime.block_on(future).map_err(Into::into)
}

/// Reads and deserializes a JSON payload.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_payload<T: DeserializeOwned>(ptr: *const c_char) -> FFIResult<T> {
    ensure_ptr!(ptr);
    let s = unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FFIError::new(ErrorCode::InvalidUtf8, "Payload is not valid UTF-8"))?;
    serde_json::from_str(s).map_err(|e| FFIError::invalid_json(&e))
}

/// Serializes `value` into a newly allocated C string at `*result`.
///
/// # Safety
/// `result` must be null or valid for writes.
pub(crate) unsafe fn write_json<T: Serialize>(result: *mut *mut c_char, value: &T) -> FFIResult<()> {
    ensure_ptr!(result);
    let json = serde_json::to_string(value)?;
    unsafe { *result = CString::new(json)?.into_raw() };
    Ok(())
}

/// Error handling helper for FFI boundaries (returns error code)
pub fn handle_status_result<F>(func: F) -> c_int
where
    F: FnOnce() -> FFIResult<()>,
{
    match func() {
        Ok(_) => ErrorCode::Success as c_int,
        Err(e) => {
            log::error!("FFI call failed: {}", e);
            let code = e.code as c_int;
            error::set_last_error(&e);
            code
        }
    }
}

/// Handles results for FFI functions that return data, serializing Ok(T) or Err(FFIError) to JSON.
/// Returns a pointer to a C string (must be freed by the caller).
pub fn handle_json_result<F, T>(func: F) -> *mut c_char
where
    F: FnOnce() -> FFIResult<T>,
    T: Serialize,
{
    let json_string = match func() {
        Ok(value) => serde_json::to_string(&value),
        Err(ffi_error) => serde_json::to_string(&ffi_error),
    };

    let final_json = json_string.unwrap_or_else(|e| {
        // The caller must always be able to parse the response
        let fallback = FFIError::internal(format!("Failed to serialize result: {}", e));
        log::error!("{}", fallback);
        serde_json::json!({ "code": ErrorCode::InternalError, "message": fallback.message, "details": null })
            .to_string()
    });

    CString::new(final_json).map_or(std::ptr::null_mut(), CString::into_raw)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_status_result_records_last_error() {
        let code = handle_status_result(|| Err(FFIError::invalid_argument("nope")));
        assert_eq!(code, ErrorCode::InvalidArgument as c_int);
        assert_eq!(error::take_last_error().map(|e| e.message), Some("nope".to_string()));

        assert_eq!(handle_status_result(|| Ok(())), 0);
    }

    #[test]
    fn test_handle_json_result() {
        let ptr = handle_json_result(|| Ok(vec![1, 2, 3]));
        let text = unsafe { CString::from_raw(ptr) }.into_string().unwrap();
        assert_eq!(text, "[1,2,3]");

        let ptr = handle_json_result::<_, ()>(|| Err(FFIError::invalid_argument("bad")));
        let text = unsafe { CString::from_raw(ptr) }.into_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["code"], "InvalidArgument");
    }

    #[test]
    fn test_read_payload_rejects_null_and_bad_json() {
        let err = unsafe { read_payload::<serde_json::Value>(std::ptr::null()) }.unwrap_err();
        assert_eq!(err.code, ErrorCode::NullPointer);

        let bad = CString::new("{not json").unwrap();
        let err = unsafe { read_payload::<serde_json::Value>(bad.as_ptr()) }.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidJson);
    }
}
