use crate::domains::listing::filter::Listable;
use crate::domains::listing::metrics::{compute_metrics, Measurable, RecordMetrics};
use crate::errors::{DomainResult, ValidationError};
use crate::types::{amount, record_id, timestamp, Location, LocationField, OrganizationField, OrganizationRef, RecordStatus};
use crate::validation::{Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Quick-pick amounts offered above the free-form amount field
pub const SUGGESTED_AMOUNTS: [u32; 5] = [50, 100, 200, 500, 1000];

/// Smallest donation accepted when no configuration says otherwise
pub const DEFAULT_MIN_DONATION: u32 = 10;

pub const MAX_DONATION_MESSAGE: usize = 500;

pub fn suggested_amounts() -> Vec<Decimal> {
    SUGGESTED_AMOUNTS.iter().map(|a| Decimal::from(*a)).collect()
}

/// A donation already made, as listed on the campaign page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    #[serde(default, alias = "donorName", alias = "nome")]
    pub donor_name: Option<String>,
    #[serde(with = "amount", alias = "valor")]
    pub amount: Decimal,
    #[serde(default, with = "timestamp", alias = "data", alias = "createdAt")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, alias = "mensagem")]
    pub message: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Donation campaign.
///
/// `goal_amount` and `current_amount` are stored independently; progress is
/// always recomputed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CampaignPayload")]
pub struct CampaignRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub category: Option<String>,
    #[serde(with = "amount::option")]
    pub goal_amount: Option<Decimal>,
    #[serde(with = "amount::option")]
    pub current_amount: Option<Decimal>,
    pub donor_count: u32,
    #[serde(with = "timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<RecordStatus>,
    pub urgent: bool,
    pub location: Location,
    pub organization: Option<OrganizationRef>,
    pub beneficiaries: Option<u32>,
    pub impact: Option<String>,
    pub needed_items: Vec<String>,
    pub recent_donations: Vec<DonationRecord>,
}

impl CampaignRecord {
    pub fn accepts_donations(&self) -> bool {
        self.status.as_ref().map_or(false, RecordStatus::accepts_submissions)
    }

    pub fn metrics(&self, now: DateTime<Utc>) -> RecordMetrics {
        compute_metrics(self, now)
    }
}

impl Listable for CampaignRecord {
    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn description(&self) -> Option<&str> {
        Some(&self.description)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn status(&self) -> Option<&RecordStatus> {
        self.status.as_ref()
    }

    fn city(&self) -> Option<&str> {
        self.location.city.as_deref()
    }

    fn state(&self) -> Option<&str> {
        self.location.state.as_deref()
    }
}

impl Measurable for CampaignRecord {
    fn achieved(&self) -> Option<Decimal> {
        self.current_amount
    }

    fn target(&self) -> Option<Decimal> {
        self.goal_amount
    }

    fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }
}

/// Wire shape accepted for campaigns: backend camelCase, the sample data's
/// Portuguese keys, or this crate's own serialized form.
#[derive(Deserialize)]
struct CampaignPayload {
    #[serde(deserialize_with = "record_id::deserialize")]
    id: String,
    #[serde(default, alias = "titulo")]
    title: String,
    #[serde(default, alias = "descricao", alias = "shortDescription")]
    description: String,
    #[serde(default, alias = "fullDescription", alias = "descricaoCompleta")]
    full_description: Option<String>,
    #[serde(default, alias = "categoria")]
    category: Option<String>,
    #[serde(default, with = "amount::option", alias = "goalAmount", alias = "goal", alias = "meta")]
    goal_amount: Option<Decimal>,
    #[serde(default, with = "amount::option", alias = "currentAmount", alias = "raised", alias = "arrecadado")]
    current_amount: Option<Decimal>,
    #[serde(default, alias = "donorCount", alias = "doadores")]
    donor_count: Option<u32>,
    #[serde(default, with = "timestamp", alias = "startDate")]
    start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", alias = "endDate")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    status: Option<RecordStatus>,
    #[serde(default, alias = "urgente")]
    urgent: Option<bool>,
    #[serde(default)]
    location: Option<LocationField>,
    #[serde(default, alias = "cidade")]
    city: Option<String>,
    #[serde(default, alias = "estado")]
    state: Option<String>,
    #[serde(default, alias = "ngo", alias = "organizacao")]
    organization: Option<OrganizationField>,
    #[serde(default, alias = "beneficiarios")]
    beneficiaries: Option<u32>,
    #[serde(default, alias = "impacto")]
    impact: Option<String>,
    #[serde(default, alias = "neededItems", alias = "itensNecessarios")]
    needed_items: Option<Vec<String>>,
    #[serde(default, alias = "recentDonations", alias = "doacoesRecentes")]
    recent_donations: Option<Vec<DonationRecord>>,
}

impl From<CampaignPayload> for CampaignRecord {
    fn from(p: CampaignPayload) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            full_description: p.full_description,
            category: p.category,
            goal_amount: p.goal_amount,
            current_amount: p.current_amount,
            donor_count: p.donor_count.unwrap_or(0),
            start_date: p.start_date,
            end_date: p.end_date,
            status: p.status,
            urgent: p.urgent.unwrap_or(false),
            location: LocationField::resolve(p.location, p.city, p.state),
            organization: p.organization.map(OrganizationRef::from),
            beneficiaries: p.beneficiaries,
            impact: p.impact,
            needed_items: p.needed_items.unwrap_or_default(),
            recent_donations: p.recent_donations.unwrap_or_default(),
        }
    }
}

/// What the donation form holds while the user is typing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationForm {
    pub amount: Option<f64>,
    pub donor_name: String,
    pub donor_email: String,
    pub message: String,
    pub anonymous: bool,
}

impl DonationForm {
    pub fn select_suggested(&mut self, amount: u32) {
        self.amount = Some(f64::from(amount));
    }

    /// Checks the form against `min_amount` and produces the request body.
    pub fn validate_for(&self, min_amount: Decimal) -> DomainResult<NewDonation> {
        let amount = match self.amount {
            None => return Err(ValidationError::required("amount").into()),
            Some(a) if !a.is_finite() || a <= 0.0 => {
                return Err(ValidationError::invalid_value("amount", "must be a positive number").into())
            }
            Some(a) => Decimal::from_f64(a)
                .ok_or_else(|| ValidationError::invalid_value("amount", "is out of range"))?
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        };

        ValidationBuilder::new("amount", Some(amount))
            .min(min_amount)
            .validate()?;

        if !self.anonymous {
            ValidationBuilder::new("donor_name", Some(self.donor_name.clone()))
                .required_text()
                .max_length(100)
                .validate()?;
        }

        // A receipt goes out even for anonymous donations
        ValidationBuilder::new("donor_email", Some(self.donor_email.clone()))
            .required_text()
            .email()
            .validate()?;

        ValidationBuilder::new("message", Some(self.message.clone()))
            .max_length(MAX_DONATION_MESSAGE)
            .validate()?;

        let message = self.message.trim();
        Ok(NewDonation {
            amount,
            donor_name: if self.anonymous { None } else { Some(self.donor_name.trim().to_string()) },
            donor_email: self.donor_email.trim().to_string(),
            message: if message.is_empty() { None } else { Some(message.to_string()) },
            anonymous: self.anonymous,
        })
    }
}

impl Validate for DonationForm {
    fn validate(&self) -> DomainResult<()> {
        self.validate_for(Decimal::from(DEFAULT_MIN_DONATION)).map(|_| ())
    }
}

/// Donation request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    #[serde(with = "amount")]
    pub amount: Decimal,
    pub donor_name: Option<String>,
    pub donor_email: String,
    pub message: Option<String>,
    pub anonymous: bool,
}
