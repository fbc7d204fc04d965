use crate::domains::listing::filter::{FilterCriteria, Listable};
use crate::domains::listing::metrics::{compute_metrics, progress_fraction, Measurable, RecordMetrics};
use crate::types::{record_id, timestamp, Location, LocationField, OrganizationField, OrganizationRef, RecordStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl EnrollmentStatus {
    /// Whether the enrollment takes up a volunteer spot
    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Pending | EnrollmentStatus::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(alias = "volunteerId", deserialize_with = "record_id::deserialize")]
    pub volunteer_id: String,
    #[serde(default, alias = "volunteerName")]
    pub volunteer_name: Option<String>,
    #[serde(default = "default_enrollment_status")]
    pub status: EnrollmentStatus,
    #[serde(default, with = "timestamp", alias = "createdAt", alias = "enrolledAt")]
    pub enrolled_at: Option<DateTime<Utc>>,
}

fn default_enrollment_status() -> EnrollmentStatus {
    EnrollmentStatus::Pending
}

/// Volunteer project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectPayload")]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub cause: Option<String>,
    pub location: Location,
    #[serde(with = "timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    pub max_volunteers: u32,
    pub status: Option<RecordStatus>,
    pub enrollments: Vec<Enrollment>,
    /// Headcount reported by a backend that does not send the roster
    pub volunteer_count: Option<u32>,
    pub hours_per_week: Option<String>,
    pub requirements: Vec<String>,
    pub activities: Vec<String>,
    pub organization: Option<OrganizationRef>,
}

impl ProjectRecord {
    /// Volunteers currently holding a spot. Not clamped to `max_volunteers`.
    pub fn enrolled_count(&self) -> u32 {
        if self.enrollments.is_empty() {
            return self.volunteer_count.unwrap_or(0);
        }
        let active = self.enrollments.iter().filter(|e| e.status.is_active()).count();
        u32::try_from(active).unwrap_or(u32::MAX)
    }

    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self.enrolled_count(), self.max_volunteers)
    }

    pub fn spots_left(&self) -> u32 {
        self.max_volunteers.saturating_sub(self.enrolled_count())
    }

    pub fn accepts_enrollment(&self) -> bool {
        self.status.as_ref().map_or(false, RecordStatus::accepts_submissions)
    }

    pub fn is_enrolled(&self, volunteer_id: &str) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.volunteer_id == volunteer_id && e.status.is_active())
    }

    pub fn metrics(&self, now: DateTime<Utc>) -> RecordMetrics {
        compute_metrics(self, now)
    }
}

impl Listable for ProjectRecord {
    fn title(&self) -> Option<&str> {
        Some(&self.title)
    }

    fn description(&self) -> Option<&str> {
        Some(&self.description)
    }

    fn category(&self) -> Option<&str> {
        self.cause.as_deref()
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

impl Measurable for ProjectRecord {
    fn achieved(&self) -> Option<Decimal> {
        Some(Decimal::from(self.enrolled_count()))
    }

    fn target(&self) -> Option<Decimal> {
        Some(Decimal::from(self.max_volunteers))
    }

    fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }
}

#[derive(Deserialize)]
struct ProjectPayload {
    #[serde(deserialize_with = "record_id::deserialize")]
    id: String,
    #[serde(default, alias = "titulo")]
    title: String,
    #[serde(default, alias = "descricao")]
    description: String,
    #[serde(default, alias = "fullDescription", alias = "descricaoCompleta")]
    full_description: Option<String>,
    #[serde(default, alias = "causa")]
    cause: Option<String>,
    #[serde(default)]
    location: Option<LocationField>,
    #[serde(default, alias = "cidade")]
    city: Option<String>,
    #[serde(default, alias = "estado")]
    state: Option<String>,
    #[serde(default, with = "timestamp", alias = "startDate")]
    start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp", alias = "endDate")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "maxVolunteers", alias = "maxVoluntarios")]
    max_volunteers: Option<u32>,
    #[serde(default)]
    status: Option<RecordStatus>,
    #[serde(default)]
    enrollments: Option<Vec<Enrollment>>,
    #[serde(default, alias = "volunteerCount", alias = "voluntarios")]
    volunteer_count: Option<u32>,
    #[serde(default, alias = "hoursPerWeek", alias = "horasSemana")]
    hours_per_week: Option<String>,
    #[serde(default, alias = "requisitos")]
    requirements: Option<Vec<String>>,
    #[serde(default, alias = "atividades")]
    activities: Option<Vec<String>>,
    #[serde(default, alias = "ngo", alias = "organizacao")]
    organization: Option<OrganizationField>,
}

impl From<ProjectPayload> for ProjectRecord {
    fn from(p: ProjectPayload) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            full_description: p.full_description,
            cause: p.cause,
            location: LocationField::resolve(p.location, p.city, p.state),
            start_date: p.start_date,
            end_date: p.end_date,
            max_volunteers: p.max_volunteers.unwrap_or(0),
            status: p.status,
            enrollments: p.enrollments.unwrap_or_default(),
            volunteer_count: p.volunteer_count,
            hours_per_week: p.hours_per_week,
            requirements: p.requirements.unwrap_or_default(),
            activities: p.activities.unwrap_or_default(),
            organization: p.organization.map(OrganizationRef::from),
        }
    }
}

/// Server-side narrowing for `fetch_projects`, sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectQuery {
    pub cause: Option<String>,
    pub status: Option<String>,
    pub state: Option<String>,
}

impl ProjectQuery {
    /// The part of `criteria` the backend can filter on. Search text and
    /// city stay client-side.
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            cause: criteria.category.clone(),
            status: criteria.status.as_ref().map(|s| s.as_str().to_string()),
            state: criteria.state.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cause.is_none() && self.status.is_none() && self.state.is_none()
    }

    /// `?cause=...&status=...&state=...`, or an empty string.
    pub fn to_query_string(&self) -> String {
        let params: Vec<String> = [("cause", &self.cause), ("status", &self.status), ("state", &self.state)]
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}={}", key, urlencoding::encode(v)))
            })
            .collect();

        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }

    pub fn to_criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::match_all();
        if let Some(cause) = &self.cause {
            criteria = criteria.with_category(cause);
        }
        if let Some(status) = &self.status {
            criteria = criteria.with_status(status);
        }
        if let Some(state) = &self.state {
            criteria = criteria.with_state(state);
        }
        criteria
    }

    pub fn matches(&self, project: &ProjectRecord) -> bool {
        self.to_criteria().matches(project)
    }
}
