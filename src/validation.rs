use crate::errors::{DomainError, DomainResult, ValidationError};
use regex::Regex;
use std::sync::OnceLock;

/// A trait that form payloads implement for local validation.
pub trait Validate {
    /// Validates the payload and returns the first failure.
    fn validate(&self) -> DomainResult<()>;
}

// Common regex patterns
fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap())
}

// Brazilian numbers as typed in the profile form: "(11) 9999-8888", "+55 11 99999-8888"
fn phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]{8,20}$").unwrap())
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self
    where T: Default + PartialEq {
        if self.value.is_none() || self.value == Some(T::default()) {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn validate_with<F>(mut self, validator: F) -> Self
    where F: FnOnce(&T) -> Result<(), ValidationError> {
        if let Some(value) = &self.value {
            if let Err(err) = validator(value) {
                self.errors.push(err);
            }
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> DomainResult<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(DomainError::Validation(first)),
        }
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    /// Treats whitespace-only input as missing.
    pub fn required_text(mut self) -> Self {
        let blank = self.value.as_ref().map_or(true, |v| v.trim().is_empty());
        if blank {
            self.errors.push(ValidationError::required(&self.field_name));
        }
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.trim().chars().count() < min {
                self.errors.push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value.trim()) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn email(self) -> Self {
        self.matches_pattern(email_regex(), "must be a valid email address")
    }

    pub fn phone(self) -> Self {
        self.matches_pattern(phone_regex(), "must be a valid phone number")
    }

    pub fn one_of(mut self, allowed_values: &[&str], message: Option<&str>) -> Self {
        if let Some(value) = &self.value {
            if !allowed_values.contains(&value.trim()) {
                let reason = message.unwrap_or("must be one of the allowed values");
                self.errors.push(ValidationError::invalid_value(&self.field_name, reason));
            }
        }
        self
    }
}

/// Numeric validations
impl<T> ValidationBuilder<T>
where T: PartialOrd + Clone + std::fmt::Display
{
    pub fn min(mut self, min: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min {
                self.errors.push(ValidationError::min(&self.field_name, min));
            }
        }
        self
    }

    pub fn max(mut self, max: T) -> Self {
        if let Some(value) = &self.value {
            if value > &max {
                self.errors.push(ValidationError::max(&self.field_name, max));
            }
        }
        self
    }

    pub fn range(mut self, min: T, max: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min || value > &max {
                self.errors.push(ValidationError::range(
                    &self.field_name,
                    min.to_string(),
                    max.to_string()
                ));
            }
        }
        self
    }
}

// Validators shared by the form payloads of several domains
pub mod common {
    use super::*;
    use crate::types::BRAZILIAN_STATES;

    pub fn validate_state_code(state: &str, field_name: &str) -> DomainResult<()> {
        ValidationBuilder::new(field_name, Some(state.trim().to_uppercase()))
            .one_of(BRAZILIAN_STATES, Some("must be a Brazilian state code (UF)"))
            .validate()
    }

    pub fn validate_password(password: &str) -> DomainResult<()> {
        ValidationBuilder::new("password", Some(password.to_string()))
            .required()
            .min_length(6)
            .max_length(128)
            .validate()
    }

    /// The login form only checks presence and an '@'; the server does the rest.
    pub fn validate_login_email(email: &str) -> DomainResult<()> {
        ValidationBuilder::new("email", Some(email.trim().to_string()))
            .required_text()
            .validate_with(|v| {
                if v.contains('@') {
                    Ok(())
                } else {
                    Err(ValidationError::format("email", "must be a valid email address"))
                }
            })
            .validate()
    }

    pub fn validate_unique_items(items: &[String], field_name: &str) -> DomainResult<()> {
        let mut seen = std::collections::HashSet::new();
        for item in items {
            if !seen.insert(item.trim().to_lowercase()) {
                return Err(DomainError::Validation(ValidationError::invalid_value(
                    field_name,
                    &format!("'{}' is listed more than once", item),
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_email_validation() {
        assert!(email_regex().is_match("user@example.com"));
        assert!(email_regex().is_match("contato@escolavilaesperanca.org.br"));
        assert!(!email_regex().is_match("user@"));
        assert!(!email_regex().is_match("@example.com"));
    }

    #[test]
    fn test_phone_validation() {
        assert!(phone_regex().is_match("(11) 9999-8888"));
        assert!(phone_regex().is_match("+55 11 99999-8888"));
        assert!(!phone_regex().is_match("123"));
        assert!(!phone_regex().is_match("call me"));
    }

    #[test]
    fn test_validation_builder() {
        let result = ValidationBuilder::new("name", Some("   ".to_string()))
            .required_text()
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("name", Some("A".to_string()))
            .min_length(2)
            .validate();
        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::MinLength { min: 2, .. }))
        ));

        let result = ValidationBuilder::new("amount", Some(dec!(5)))
            .min(dec!(10))
            .validate();
        assert!(result.is_err());

        let result = ValidationBuilder::new("amount", Some(dec!(10)))
            .min(dec!(10))
            .validate();
        assert!(result.is_ok());

        let value: Option<String> = None;
        let result = ValidationBuilder::new("name", value).required().validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_first_error_wins() {
        let result = ValidationBuilder::new("bio", Some("x".repeat(20)))
            .max_length(10)
            .email()
            .validate();
        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::MaxLength { max: 10, .. }))
        ));
    }

    #[test]
    fn test_common_validations() {
        assert!(common::validate_state_code("sp", "state").is_ok());
        assert!(common::validate_state_code("XX", "state").is_err());

        assert!(common::validate_password("segredo").is_ok());
        assert!(common::validate_password("abc").is_err());

        assert!(common::validate_login_email("maria@example.com").is_ok());
        assert!(common::validate_login_email("maria").is_err());
        assert!(common::validate_login_email("").is_err());

        let causes = vec!["Educação".to_string(), "educação".to_string()];
        assert!(common::validate_unique_items(&causes, "preferred_causes").is_err());
    }
}
