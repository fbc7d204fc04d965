use crate::auth::{CreateUserRequest, LoginRequest};
use crate::ffi::{block_on_async, handle_status_result, read_payload, write_json};
use crate::globals;
use std::os::raw::{c_char, c_int};

/// Sign in and start the shared session.
/// Payload { "email": "...", "password": "..." }, result `SessionUser`
///
/// # Safety
/// Both pointers must be valid; the result must be freed with `free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn auth_login(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let credentials: LoginRequest = read_payload(payload_json)?;
        let auth = globals::get_auth_service()?;
        let user = block_on_async(auth.login(credentials))?;
        write_json(result, &user)
    })
}

/// Create an account and sign it in.
/// Payload `CreateUserRequest`, result `SessionUser`
#[unsafe(no_mangle)]
pub unsafe extern "C" fn auth_register(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let request: CreateUserRequest = read_payload(payload_json)?;
        let auth = globals::get_auth_service()?;
        let user = block_on_async(auth.register(request))?;
        write_json(result, &user)
    })
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn auth_logout() -> c_int {
    handle_status_result(|| {
        globals::get_auth_service()?.logout();
        Ok(())
    })
}

/// Writes the signed-in `SessionUser`, or `null` when signed out.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn auth_current_user(result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        let auth = globals::get_auth_service()?;
        write_json(result, &auth.current_user())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::fixtures::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::ffi::error::ErrorCode;
    use crate::ffi::project::project_enroll;
    use crate::ffi::test_support::{call, init_fixture};
    use crate::ffi::user::{user_get_profile, user_update_profile};
    use serde_json::json;
    use std::ffi::CString;

    fn current_user() -> serde_json::Value {
        let mut out: *mut c_char = std::ptr::null_mut();
        assert_eq!(unsafe { auth_current_user(&mut out) }, 0);
        let text = unsafe { CString::from_raw(out) }.into_string().unwrap();
        serde_json::from_str(&text).unwrap()
    }

    // The shared session is global, so the whole signed-in journey runs in
    // one test.
    #[test]
    fn test_session_journey() {
        init_fixture();

        let (code, _) = call(auth_login, json!({"email": DEMO_EMAIL, "password": "wrong-password"}));
        assert_eq!(code, ErrorCode::AuthenticationFailed as c_int);

        let (code, user) = call(auth_login, json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD}));
        assert_eq!(code, 0);
        assert_eq!(user["id"], "user-maria");
        assert_eq!(current_user()["email"], DEMO_EMAIL);

        let (code, outcome) = call(project_enroll, json!({"project_id": "2"}));
        assert_eq!(code, 0);
        assert_eq!(outcome["state"]["state"], "success");
        assert_eq!(outcome["project"]["id"], "2");

        let (code, _) = call(project_enroll, json!({"project_id": "2"}));
        assert_eq!(code, ErrorCode::ValidationFailed as c_int);

        let mut out: *mut c_char = std::ptr::null_mut();
        assert_eq!(unsafe { user_get_profile(&mut out) }, 0);
        let profile: serde_json::Value =
            serde_json::from_str(&unsafe { CString::from_raw(out) }.into_string().unwrap()).unwrap();
        assert_eq!(profile["name"], "Maria Silva");

        let (code, profile) = call(user_update_profile, json!({"update": {"city": "Campinas"}}));
        assert_eq!(code, 0);
        assert_eq!(profile["city"], "Campinas");

        assert_eq!(unsafe { auth_logout() }, 0);
        assert!(current_user().is_null());

        let (code, _) = call(project_enroll, json!({"project_id": "3"}));
        assert_eq!(code, ErrorCode::AuthenticationFailed as c_int);
    }

    #[test]
    fn test_register_rejects_invalid_form() {
        init_fixture();
        let (code, _) = call(
            auth_register,
            json!({
                "name": "J",
                "email": "joao@email.com",
                "password": "segredo123",
                "city": "Recife",
                "state": "PE"
            }),
        );
        assert_eq!(code, ErrorCode::ValidationFailed as c_int);
    }
}
