// Listing core exposed to the shell. These calls do no I/O and work before
// `initialize_library`.

use crate::domains::campaign::CampaignRecord;
use crate::domains::listing::{
    compute_metrics, filter_records, summarize_campaigns, summarize_projects, CurrencyFormat, FilterCriteria,
    FilterInput,
};
use crate::domains::project::ProjectRecord;
use crate::ffi::error::FFIError;
use crate::ffi::{handle_status_result, read_payload, write_json};
use crate::globals;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::os::raw::{c_char, c_int};

/// Currency settings from the loaded configuration, BRL before initialization.
fn currency_format() -> CurrencyFormat {
    globals::get_config()
        .map(|config| config.currency.clone())
        .unwrap_or_default()
}

/// Payload { "records": [CampaignRecord], "criteria": FilterInput }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_filter_campaigns(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            records: Vec<CampaignRecord>,
            #[serde(default)]
            criteria: FilterInput,
        }
        let p: P = read_payload(payload_json)?;
        let filtered = filter_records(&p.records, &FilterCriteria::from_input(&p.criteria));
        write_json(result, &filtered)
    })
}

/// Payload { "records": [ProjectRecord], "criteria": FilterInput }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_filter_projects(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            records: Vec<ProjectRecord>,
            #[serde(default)]
            criteria: FilterInput,
        }
        let p: P = read_payload(payload_json)?;
        let filtered = filter_records(&p.records, &FilterCriteria::from_input(&p.criteria));
        write_json(result, &filtered)
    })
}

/// Payload { "record": CampaignRecord, "now": RFC3339 (optional) }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_campaign_metrics(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            record: CampaignRecord,
            now: Option<DateTime<Utc>>,
        }
        let p: P = read_payload(payload_json)?;
        write_json(result, &compute_metrics(&p.record, p.now.unwrap_or_else(Utc::now)))
    })
}

/// Payload { "record": ProjectRecord, "now": RFC3339 (optional) }
///
/// Adds the enrollment figures to the common metrics.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_project_metrics(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            record: ProjectRecord,
            now: Option<DateTime<Utc>>,
        }
        let p: P = read_payload(payload_json)?;
        let metrics = compute_metrics(&p.record, p.now.unwrap_or_else(Utc::now));
        let response = serde_json::json!({
            "metrics": metrics,
            "enrolled": p.record.enrolled_count(),
            "spots_left": p.record.spots_left(),
            "progress": p.record.progress_fraction(),
        });
        write_json(result, &response)
    })
}

/// Payload { "records": [CampaignRecord] }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_campaign_summary(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            records: Vec<CampaignRecord>,
        }
        let p: P = read_payload(payload_json)?;
        write_json(result, &summarize_campaigns(&p.records))
    })
}

/// Payload { "records": [ProjectRecord] }
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_project_summary(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            records: Vec<ProjectRecord>,
        }
        let p: P = read_payload(payload_json)?;
        write_json(result, &summarize_projects(&p.records))
    })
}

/// Payload { "amount": number | string } -> "R$ 1.234,56"
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_format_currency(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            #[serde(with = "crate::types::amount")]
            amount: Decimal,
        }
        let p: P = read_payload(payload_json)?;
        write_json(result, &currency_format().format(p.amount))
    })
}

/// Payload { "text": "R$ 1.234,56" } -> amount as a string
#[unsafe(no_mangle)]
pub unsafe extern "C" fn listing_parse_currency(payload_json: *const c_char, result: *mut *mut c_char) -> c_int {
    handle_status_result(|| unsafe {
        #[derive(Deserialize)]
        struct P {
            text: String,
        }
        let p: P = read_payload(payload_json)?;
        let amount = currency_format()
            .parse(&p.text)
            .ok_or_else(|| FFIError::invalid_argument(&format!("Not a currency value: {}", p.text)))?;
        write_json(result, &amount.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::fixtures;
    use crate::ffi::test_support::call;
    use serde_json::json;

    #[test]
    fn test_filter_projects_with_sentinels() {
        let (code, out) = call(
            listing_filter_projects,
            json!({
                "records": fixtures::projects(),
                "criteria": {"search": "", "category": "Todas as causas", "state": "rs"}
            }),
        );
        assert_eq!(code, 0);
        assert_eq!(out.as_array().map(Vec::len), Some(1));
        assert_eq!(out[0]["title"], "Apoio a Idosos");
    }

    #[test]
    fn test_campaign_metrics() {
        let campaign = &fixtures::campaigns()[0];
        let (code, out) = call(
            listing_campaign_metrics,
            json!({"record": campaign, "now": "2024-03-15T12:00:00Z"}),
        );
        assert_eq!(code, 0);
        assert_eq!(out["percentage_rounded"], 65);
        assert_eq!(out["days_remaining"], 16);
    }

    #[test]
    fn test_project_metrics() {
        let (code, out) = call(listing_project_metrics, json!({"record": fixtures::projects()[0]}));
        assert_eq!(code, 0);
        assert_eq!(out["enrolled"], 12);
        assert_eq!(out["spots_left"], 8);
        assert_eq!(out["progress"], 0.6);
    }

    #[test]
    fn test_summaries() {
        let (_, campaigns) = call(listing_campaign_summary, json!({"records": fixtures::campaigns()}));
        assert_eq!(campaigns["active_count"], 5);
        assert_eq!(campaigns["total_donors"], 698);

        let (_, projects) = call(listing_project_summary, json!({"records": fixtures::projects()}));
        assert_eq!(projects["total_enrolled"], 55);
    }

    #[test]
    fn test_currency_round_trip_through_ffi() {
        let (code, formatted) = call(listing_format_currency, json!({"amount": 32500}));
        assert_eq!(code, 0);
        assert_eq!(formatted, "R$ 32.500,00");

        let (code, _) = call(listing_parse_currency, json!({"text": "trinta reais"}));
        assert_eq!(code, crate::ffi::error::ErrorCode::InvalidArgument as c_int);
    }
}
