use crate::domains::campaign::{suggested_amounts, CampaignRecord, DonationForm};
use crate::domains::listing::{FilterCriteria, FilterInput};
use crate::domains::submission::{SubmissionFlow, SubmissionState, SuccessPolicy};
use crate::ffi::error::FFIError;
use crate::ffi::{block_on_async, handle_status_result, read_payload, write_json};
use crate::globals;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::os::raw::{c_char, c_int};

/// Outcome of one donation attempt, as rendered by the donation form.
#[derive(Debug, Serialize)]
pub struct DonationOutcome {
    pub state: SubmissionState,
    /// The re-fetched campaign, when the donation went through
    pub campaign: Option<CampaignRecord>,
}

/// Payload { "criteria": FilterInput (optional) }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn campaign_list(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            #[serde(default)]
            criteria: FilterInput,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_campaign_service()?;
        let session = globals::get_session()?;
        let criteria = FilterCriteria::from_input(&p.criteria);
        let campaigns = block_on_async(svc.list_campaigns(&criteria, &session))?;
        write_json(result, &campaigns)
    })
}

/// Payload { "id": "..." }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn campaign_get(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            id: String,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_campaign_service()?;
        let session = globals::get_session()?;
        let campaign = block_on_async(svc.get_campaign(&p.id, &session))?;
        write_json(result, &campaign)
    })
}

/// Payload { "campaign_id": "...", "form": DonationForm }
///
/// A form the guard rejects is reported as a validation error and nothing is
/// sent. Once sent, the result is always a `DonationOutcome`, whose state is
/// `success` or `failed`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn campaign_donate(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            campaign_id: String,
            form: DonationForm,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_campaign_service()?;
        let session = globals::get_session()?;

        let campaign = block_on_async(svc.get_campaign(&p.campaign_id, &session))?;
        let mut flow = SubmissionFlow::with_draft(SuccessPolicy::ResetToIdle, p.form);
        let submitted = block_on_async(svc.submit_donation(&campaign, &mut flow, &session));

        match (submitted, flow.state()) {
            (Err(e), SubmissionState::Idle) => Err(e),
            (submitted, state) => write_json(
                result,
                &DonationOutcome {
                    state: state.clone(),
                    campaign: submitted.ok().flatten(),
                },
            ),
        }
    })
}

/// Suggested amounts and the configured minimum, for the donation form
#[unsafe(no_mangle)]
pub unsafe extern "C" fn campaign_donation_options(result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Serialize)]
        struct Options {
            suggested_amounts: Vec<Decimal>,
            min_donation: Decimal,
        }
        let svc = globals::get_campaign_service()?;
        let options = Options {
            suggested_amounts: suggested_amounts(),
            min_donation: svc.min_donation(),
        };
        write_json(result, &options)
    })
}

/// Validates a donation form without sending it.
/// Payload { "form": DonationForm }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn campaign_validate_donation(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            form: DonationForm,
        }
        let p: P = read_payload(payload_json)?;
        let svc = globals::get_campaign_service()?;
        let donation = p.form.validate_for(svc.min_donation()).map_err(FFIError::from)?;
        write_json(result, &donation)
    })
}
