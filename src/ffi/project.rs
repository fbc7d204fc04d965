use crate::domains::listing::{FilterCriteria, FilterInput};
use crate::domains::project::ProjectRecord;
use crate::domains::submission::{SubmissionFlow, SubmissionState, SuccessPolicy};
use crate::ffi::{block_on_async, handle_status_result, read_payload, write_json};
use crate::globals;
use serde::{Deserialize, Serialize};
use std::os::raw::{c_char, c_int};

/// Outcome of one enrollment attempt
#[derive(Debug, Serialize)]
pub struct EnrollmentOutcome {
    pub state: SubmissionState,
    pub project: Option<ProjectRecord>,
}

/// Payload { "criteria": FilterInput (optional) }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn project_list(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            #[serde(default)]
            criteria: FilterInput,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_project_service()?;
        let session = globals::get_session()?;
        let criteria = FilterCriteria::from_input(&p.criteria);
        let projects = block_on_async(svc.list_projects(&criteria, &session))?;
        write_json(result, &projects)
    })
}

/// Payload { "id": "..." }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn project_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_project_service()?;
        let session = globals::get_session()?;
        let project = block_on_async(svc.get_project(&p.id, &session))?;
        write_json(result, &project)
    })
}

/// Payload { "project_id": "..." }
///
/// Requires a signed-in session. Rejections by the guard come back as error
/// codes; a sent request always yields an `EnrollmentOutcome`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn project_enroll(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            project_id: String,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_project_service()?;
        let session = globals::get_session()?;

        let project = block_on_async(svc.get_project(&p.project_id, &session))?;
        let mut flow = SubmissionFlow::new(SuccessPolicy::Terminal);
        let submitted = block_on_async(svc.submit_enrollment(&project, &mut flow, &session));

        match (submitted, flow.state()) {
            (Err(e), SubmissionState::Idle) => Err(e),
            (submitted, state) => write_json(
                result,
                &EnrollmentOutcome {
                    state: state.clone(),
                    project: submitted.ok().flatten(),
                },
            ),
        }
    })
}
