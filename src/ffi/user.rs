use crate::domains::user::UpdateProfile;
use crate::ffi::{block_on_async, handle_status_result, read_payload, write_json};
use crate::globals;
use serde::Deserialize;
use std::os::raw::{c_char, c_int};

/// Profile of the signed-in user
#[unsafe(no_mangle)]
pub unsafe extern "C" fn user_get_profile(result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let svc = globals::get_user_service()?;
        let session = globals::get_session()?;
        let profile = block_on_async(svc.get_profile(&session))?;
        write_json(result, &profile)
    })
}

/// Payload { "update": UpdateProfile }. Only the fields present change.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn user_update_profile(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            update: UpdateProfile,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_user_service()?;
        let session = globals::get_session()?;
        let profile = block_on_async(svc.update_profile(p.update, &session))?;
        write_json(result, &profile)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::error::ErrorCode;
    use crate::ffi::test_support::{call, init_fixture};
    use serde_json::json;

    #[test]
    fn test_update_requires_update_object() {
        init_fixture();
        let (code, out) = call(user_update_profile, json!({"city": "Campinas"}));
        assert_eq!(code, ErrorCode::InvalidJson as c_int);
        assert!(out.is_null());
    }

    #[test]
    fn test_null_result_pointer() {
        init_fixture();
        let code = unsafe { user_get_profile(std::ptr::null_mut()) };
        assert_ne!(code, 0);
    }
}
