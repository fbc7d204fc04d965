use crate::domains::listing::metrics::CurrencyFormat;
use crate::errors::{ServiceError, ServiceResult};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "http://localhost:3333/api";

/// Which backend feeds the listing and detail screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// Built-in sample campaigns and projects, kept in memory
    Fixture,
    /// REST backend at `api_base_url`
    Remote,
}

impl DataSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::Fixture => "fixture",
            DataSourceKind::Remote => "remote",
        }
    }
}

impl FromStr for DataSourceKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixture" | "fixtures" | "mock" => Ok(DataSourceKind::Fixture),
            "remote" | "api" | "http" => Ok(DataSourceKind::Remote),
            other => Err(ServiceError::Configuration(format!(
                "Unknown data source '{}', expected 'fixture' or 'remote'",
                other
            ))),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Library configuration. Every field has a default so partial JSON from the
/// shell is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub data_source: DataSourceKind,
    #[serde(with = "crate::types::amount")]
    pub min_donation: Decimal,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub currency: CurrencyFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            data_source: DataSourceKind::Remote,
            min_donation: Decimal::TEN,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            currency: CurrencyFormat::brl(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `VOLUNTEER_*` variables, with `.env` loaded first.
    pub fn from_env() -> ServiceResult<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("VOLUNTEER_API_URL") {
            config.api_base_url = url;
        }
        if let Some(kind) = lookup("VOLUNTEER_DATA_SOURCE") {
            config.data_source = kind.parse()?;
        }
        if let Some(min) = lookup("VOLUNTEER_MIN_DONATION") {
            config.min_donation = Decimal::from_str(min.trim()).map_err(|e| {
                ServiceError::Configuration(format!("Invalid VOLUNTEER_MIN_DONATION '{}': {}", min, e))
            })?;
        }
        if let Some(secs) = lookup("VOLUNTEER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs.trim().parse().map_err(|e| {
                ServiceError::Configuration(format!("Invalid VOLUNTEER_REQUEST_TIMEOUT_SECS '{}': {}", secs, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.data_source == DataSourceKind::Remote
            && !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ServiceError::Configuration(format!(
                "api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            )));
        }
        if self.min_donation < Decimal::ZERO {
            return Err(ServiceError::Configuration("min_donation cannot be negative".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServiceError::Configuration("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_root(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_root(), "http://localhost:3333/api");
        assert_eq!(config.min_donation, Decimal::TEN);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("VOLUNTEER_API_URL", "https://api.example.org/api/"),
            ("VOLUNTEER_DATA_SOURCE", "fixture"),
            ("VOLUNTEER_MIN_DONATION", "25.50"),
            ("VOLUNTEER_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_root(), "https://api.example.org/api");
        assert_eq!(config.data_source, DataSourceKind::Fixture);
        assert_eq!(config.min_donation.to_string(), "25.50");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_malformed_values_are_configuration_errors() {
        let err = AppConfig::from_lookup(lookup_from(&[("VOLUNTEER_MIN_DONATION", "dez")])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("VOLUNTEER_DATA_SOURCE", "ftp")])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));

        let err = AppConfig::from_lookup(lookup_from(&[("VOLUNTEER_API_URL", "localhost:3333")])).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_partial_json() {
        let config: AppConfig = serde_json::from_str(r#"{"data_source": "fixture", "min_donation": 5}"#).unwrap();
        assert_eq!(config.data_source, DataSourceKind::Fixture);
        assert_eq!(config.min_donation, Decimal::from(5));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.currency, CurrencyFormat::brl());
    }
}
