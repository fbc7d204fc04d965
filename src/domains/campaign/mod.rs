pub mod service;
pub mod types;

pub use service::{CampaignService, CampaignServiceImpl};
pub use types::{
    suggested_amounts, CampaignRecord, DonationForm, DonationRecord, NewDonation, DEFAULT_MIN_DONATION,
    SUGGESTED_AMOUNTS,
};
