use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors
#[derive(Debug, Error, Clone, Serialize, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Entity not found: {0} with ID {1}")]
    EntityNotFound(String, String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Cannot {action} while submission is {from}")]
    InvalidStateTransition {
        from: String,
        action: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::EntityNotFound(entity.to_string(), id.to_string())
    }

    pub fn invalid_transition(from: &str, action: &str) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            action: action.to_string(),
        }
    }
}

/// Service-level errors (application specific)
#[derive(Debug, Error, Clone, Serialize, PartialEq)]
pub enum ServiceError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Server returned error {status}: {message}")]
    Server {
        status: u16,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse error categories the presentation layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected locally before anything was sent; shown inline next to the form.
    Validation,
    /// Network or server failure; shown as a retryable message.
    Transport,
    /// The requested record does not exist; shown as a dedicated not-found view.
    NotFound,
    /// Missing or expired session; the shell should offer the login screen.
    Authentication,
    /// Programming or configuration problem.
    Internal,
}

impl ServiceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(DomainError::Validation(_)) => ErrorKind::Validation,
            ServiceError::Domain(DomainError::EntityNotFound(_, _)) => ErrorKind::NotFound,
            ServiceError::Domain(_) => ErrorKind::Internal,
            ServiceError::Authentication(_)
            | ServiceError::SessionExpired
            | ServiceError::PermissionDenied(_) => ErrorKind::Authentication,
            ServiceError::Transport(_) | ServiceError::Timeout(_) => ErrorKind::Transport,
            ServiceError::Server { status: 404, .. } => ErrorKind::NotFound,
            ServiceError::Server { .. } => ErrorKind::Transport,
            ServiceError::Configuration(_) => ErrorKind::Internal,
        }
    }

    /// Whether the same request may succeed if the user simply tries again.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport)
    }

    /// Message suitable for showing to the user in a failed state.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Domain(DomainError::Validation(err)) => err.to_string(),
            ServiceError::Domain(DomainError::EntityNotFound(entity, _)) => {
                format!("The requested {} could not be found.", entity)
            }
            ServiceError::Authentication(msg) => msg.clone(),
            ServiceError::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            ServiceError::PermissionDenied(_) => "You are not allowed to perform this action.".to_string(),
            ServiceError::Transport(_) | ServiceError::Timeout(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            ServiceError::Server { message, .. } if !message.is_empty() => message.clone(),
            ServiceError::Server { status, .. } => format!("The server returned an error ({}).", status),
            _ => "An unexpected error occurred.".to_string(),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Domain(DomainError::Validation(err))
    }
}

/// Validation errors
#[derive(Debug, Error, Clone, Serialize, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required {
        field: String,
    },

    #[error("Field '{field}' must be at least {min} characters")]
    MinLength {
        field: String,
        min: usize,
    },

    #[error("Field '{field}' cannot exceed {max} characters")]
    MaxLength {
        field: String,
        max: usize,
    },

    #[error("Field '{field}' must be at least {min}")]
    Min {
        field: String,
        min: String,
    },

    #[error("Field '{field}' must be at most {max}")]
    Max {
        field: String,
        max: String,
    },

    #[error("Field '{field}' must be between {min} and {max}")]
    Range {
        field: String,
        min: String,
        max: String,
    },

    #[error("Field '{field}' contains invalid format: {reason}")]
    Format {
        field: String,
        reason: String,
    },

    #[error("Field '{field}' contains an invalid value: {reason}")]
    InvalidValue {
        field: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Custom(String),
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    pub fn min_length(field: &str, min: usize) -> Self {
        Self::MinLength {
            field: field.to_string(),
            min,
        }
    }

    pub fn max_length(field: &str, max: usize) -> Self {
        Self::MaxLength {
            field: field.to_string(),
            max,
        }
    }

    pub fn min<T: fmt::Display>(field: &str, min: T) -> Self {
        Self::Min {
            field: field.to_string(),
            min: min.to_string(),
        }
    }

    pub fn max<T: fmt::Display>(field: &str, max: T) -> Self {
        Self::Max {
            field: field.to_string(),
            max: max.to_string(),
        }
    }

    pub fn range<T: fmt::Display>(field: &str, min: T, max: T) -> Self {
        Self::Range {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn format(field: &str, reason: &str) -> Self {
        Self::Format {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn custom(message: &str) -> Self {
        Self::Custom(message.to_string())
    }

    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::Required { field }
            | ValidationError::MinLength { field, .. }
            | ValidationError::MaxLength { field, .. }
            | ValidationError::Min { field, .. }
            | ValidationError::Max { field, .. }
            | ValidationError::Range { field, .. }
            | ValidationError::Format { field, .. }
            | ValidationError::InvalidValue { field, .. } => Some(field),
            ValidationError::Custom(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let validation: ServiceError = ValidationError::required("amount").into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(!validation.is_retryable());

        let missing = ServiceError::Domain(DomainError::not_found("campaign", "42"));
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        assert_eq!(ServiceError::transport("connection refused").kind(), ErrorKind::Transport);
        assert!(ServiceError::Timeout(30).is_retryable());
        assert!(ServiceError::Server { status: 502, message: String::new() }.is_retryable());
        assert_eq!(
            ServiceError::Server { status: 404, message: "gone".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(ServiceError::SessionExpired.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_user_messages() {
        let err: ServiceError = ValidationError::required("donor_email").into();
        assert_eq!(err.user_message(), "Field 'donor_email' is required");

        let err = ServiceError::Server { status: 400, message: "Valor inválido".into() };
        assert_eq!(err.user_message(), "Valor inválido");

        let err = ServiceError::Server { status: 500, message: String::new() };
        assert_eq!(err.user_message(), "The server returned an error (500).");
    }

    #[test]
    fn test_validation_error_field() {
        assert_eq!(ValidationError::min_length("name", 2).field(), Some("name"));
        assert_eq!(ValidationError::custom("bad").field(), None);
        assert_eq!(ValidationError::min("amount", 10).field(), Some("amount"));
        assert_eq!(ValidationError::min("amount", 10).to_string(), "Field 'amount' must be at least 10");
    }
}
