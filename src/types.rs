use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Brazilian federative unit codes offered by the state selectors
pub const BRAZILIAN_STATES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA",
    "PB", "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Categories a donation campaign may be filed under
pub const CAMPAIGN_CATEGORIES: &[&str] = &[
    "Saúde",
    "Educação",
    "Meio Ambiente",
    "Assistência Social",
    "Emergência",
    "Cultura",
    "Esporte",
    "Animais",
];

/// Causes a volunteer project may serve
pub const PROJECT_CAUSES: &[&str] = &[
    "Educação",
    "Saúde",
    "Meio Ambiente",
    "Assistência Social",
    "Cultura",
    "Esporte",
    "Direitos Humanos",
    "Animais",
    "Combate à Fome",
    "Tecnologia",
    "Religião",
];

/// Where a project or organization is based.
///
/// The REST backend only sends a free-text `location` ("São Paulo, SP"); the
/// structured fields are split out of it on load so filters never have to
/// substring-match the combined text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Location {
    pub fn new(city: &str, state: &str) -> Self {
        Self {
            city: non_blank(city),
            state: non_blank(state).map(|s| s.to_uppercase()),
        }
    }

    /// Splits "City, UF" / "City - UF" / "City/UF". A trailing segment is only
    /// taken as the state when it is a known UF code.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        for separator in [',', '-', '/'] {
            if let Some((head, tail)) = trimmed.rsplit_once(separator) {
                let candidate = tail.trim().to_uppercase();
                if BRAZILIAN_STATES.contains(&candidate.as_str()) {
                    return Self {
                        city: non_blank(head),
                        state: Some(candidate),
                    };
                }
            }
        }

        Self {
            city: Some(trimmed.to_string()),
            state: None,
        }
    }

    /// "City, UF" for display; whichever parts are present.
    pub fn display(&self) -> String {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => format!("{}, {}", city, state),
            (Some(city), None) => city.clone(),
            (None, Some(state)) => state.clone(),
            (None, None) => String::new(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The organization (NGO, association, family) that owns a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

/// `location` as it arrives on the wire: free text from the REST backend or
/// the structured form this crate serializes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LocationField {
    Text(String),
    Structured(Location),
}

impl LocationField {
    /// Explicit `city`/`state` fields win over whatever `location` holds.
    pub(crate) fn resolve(field: Option<LocationField>, city: Option<String>, state: Option<String>) -> Location {
        let mut location = match field {
            Some(LocationField::Text(text)) => Location::parse(&text),
            Some(LocationField::Structured(location)) => location,
            None => Location::default(),
        };
        if let Some(city) = city.as_deref().and_then(non_blank) {
            location.city = Some(city);
        }
        if let Some(state) = state.as_deref().and_then(non_blank) {
            location.state = Some(state.to_uppercase());
        }
        location
    }
}

/// The owning organization: just a name in the sample data, an object from
/// the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OrganizationField {
    Name(String),
    Full(OrganizationRef),
}

impl From<OrganizationField> for OrganizationRef {
    fn from(field: OrganizationField) -> Self {
        match field {
            OrganizationField::Name(name) => OrganizationRef {
                name: Some(name),
                ..Default::default()
            },
            OrganizationField::Full(org) => org,
        }
    }
}

/// Lifecycle status shared by campaigns and projects.
///
/// Parsing accepts the backend codes (`open`, `in_progress`) as well as the
/// Portuguese labels the mock data used (`Ativa`, `Concluída`). Anything else is
/// kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    Active,
    Open,
    InProgress,
    Pending,
    Completed,
    Closed,
    Cancelled,
    Other(String),
}

impl RecordStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Open => "open",
            RecordStatus::InProgress => "in_progress",
            RecordStatus::Pending => "pending",
            RecordStatus::Completed => "completed",
            RecordStatus::Closed => "closed",
            RecordStatus::Cancelled => "cancelled",
            RecordStatus::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        let trimmed = code.trim();
        match trimmed.to_lowercase().as_str() {
            "active" | "ativa" | "ativo" => RecordStatus::Active,
            "open" | "aberto" | "aberta" => RecordStatus::Open,
            "in_progress" | "in progress" | "em andamento" => RecordStatus::InProgress,
            "pending" | "pendente" => RecordStatus::Pending,
            "completed" | "concluída" | "concluida" | "concluído" | "concluido" => RecordStatus::Completed,
            "closed" | "fechado" | "fechada" => RecordStatus::Closed,
            "cancelled" | "canceled" | "cancelada" | "cancelado" => RecordStatus::Cancelled,
            _ => RecordStatus::Other(trimmed.to_string()),
        }
    }

    /// Whether new donations or enrollments are accepted.
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, RecordStatus::Active | RecordStatus::Open)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for RecordStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(RecordStatus::from_code(&code))
    }
}

/// Serde helpers for money fields. The backend sends plain JSON numbers, the
/// shell sometimes sends strings; both are accepted. Amounts go back out as
/// numbers.
pub mod amount {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(f64),
        Text(String),
    }

    fn to_decimal<E: serde::de::Error>(raw: Lenient) -> Result<Decimal, E> {
        match raw {
            Lenient::Number(n) => Decimal::from_f64(n)
                .ok_or_else(|| E::custom(format!("amount {} is not representable", n))),
            Lenient::Text(s) => Decimal::from_str(s.trim())
                .map_err(|e| E::custom(format!("invalid amount '{}': {}", s, e))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        to_decimal(Lenient::deserialize(deserializer)?)
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match value.to_f64() {
            Some(n) => serializer.serialize_f64(n),
            None => serializer.serialize_str(&value.to_string()),
        }
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
            match Option::<Lenient>::deserialize(deserializer)? {
                Some(raw) => to_decimal(raw).map(Some),
                None => Ok(None),
            }
        }

        pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Record identifiers arrive as numbers from the fixture pages and as UUID
/// strings from the REST backend; both are kept as strings.
pub mod record_id {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        })
    }
}

/// Optional timestamps given either as RFC 3339 or as a bare `YYYY-MM-DD`
/// date (read as midnight UTC). Unparseable values are treated as absent.
pub mod timestamp {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};

    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let trimmed = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}
