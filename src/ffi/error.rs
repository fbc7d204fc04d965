use std::cell::RefCell;
use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::errors::{DomainError, ServiceError, ValidationError};

/// Error codes for FFI boundary
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Success (no error)
    Success = 0,

    // General errors (1-99)
    Unknown = 1,
    InvalidArgument = 2,
    NullPointer = 3,
    InvalidUtf8 = 4,
    InvalidJson = 5,
    InternalError = 6,
    NotInitialized = 7,

    // Domain errors (200-299)
    DomainGeneral = 200,
    EntityNotFound = 201,
    ValidationFailed = 204,
    InvalidRecord = 209,
    InvalidStateTransition = 210,

    // Service errors (300-399)
    ServiceGeneral = 300,
    AuthenticationFailed = 303,
    SessionExpired = 304,
    PermissionDenied = 305,
    NetworkError = 308,
    ConfigurationError = 310,
    ExternalServiceError = 311,
    Timeout = 312,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, *self as i32)
    }
}

/// Error type for FFI boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FFIError {
    /// Error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (JSON string)
    pub details: Option<String>,
}

impl fmt::Display for FFIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for FFIError {}

impl FFIError {
    pub fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: &str, details: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            details: Some(details.to_string()),
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn invalid_json(err: &serde_json::Error) -> Self {
        Self::new(ErrorCode::InvalidJson, &format!("Invalid JSON payload: {}", err))
    }

    // Helper for internal errors
    pub fn internal(message: String) -> Self {
        Self::new(ErrorCode::InternalError, &message)
    }

    // Helper for converting ServiceError, commonly needed in FFI layer
    pub fn from_service_error(err: ServiceError) -> Self {
        err.into()
    }
}

// --- From<DomainError> for FFIError ---
impl From<DomainError> for FFIError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(val_err) => val_err.into(),
            DomainError::EntityNotFound(entity, id) => Self::with_details(
                ErrorCode::EntityNotFound,
                &format!("Entity not found: {} with ID {}", entity, id),
                &json!({ "entity": entity, "id": id }).to_string(),
            ),
            DomainError::InvalidRecord(msg) => Self::new(ErrorCode::InvalidRecord, &msg),
            DomainError::InvalidStateTransition { from, action } => Self::with_details(
                ErrorCode::InvalidStateTransition,
                &format!("Cannot {} while submission is {}", action, from),
                &json!({ "from": from, "action": action }).to_string(),
            ),
            DomainError::Internal(msg) => Self::new(ErrorCode::InternalError, &msg),
        }
    }
}

// --- From<ServiceError> for FFIError ---
impl From<ServiceError> for FFIError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain_err) => domain_err.into(),
            ServiceError::Authentication(msg) => Self::new(ErrorCode::AuthenticationFailed, &msg),
            ServiceError::SessionExpired => Self::new(ErrorCode::SessionExpired, "Session expired"),
            ServiceError::PermissionDenied(msg) => Self::new(ErrorCode::PermissionDenied, &msg),
            ServiceError::Transport(msg) => Self::new(ErrorCode::NetworkError, &msg),
            ServiceError::Timeout(secs) => Self::with_details(
                ErrorCode::Timeout,
                &format!("Request timed out after {} seconds", secs),
                &json!({ "seconds": secs }).to_string(),
            ),
            ServiceError::Server { status, message } => Self::with_details(
                ErrorCode::ExternalServiceError,
                &message,
                &json!({ "status": status }).to_string(),
            ),
            ServiceError::Configuration(msg) => Self::new(ErrorCode::ConfigurationError, &msg),
        }
    }
}

// --- From<ValidationError> for FFIError ---
impl From<ValidationError> for FFIError {
    fn from(err: ValidationError) -> Self {
        let message = err.to_string();
        let details = match &err {
            ValidationError::Required { field } => json!({ "field": field, "type": "required" }),
            ValidationError::MinLength { field, min } => json!({ "field": field, "type": "min_length", "min": min }),
            ValidationError::MaxLength { field, max } => json!({ "field": field, "type": "max_length", "max": max }),
            ValidationError::Min { field, min } => json!({ "field": field, "type": "min", "min": min }),
            ValidationError::Max { field, max } => json!({ "field": field, "type": "max", "max": max }),
            ValidationError::Range { field, min, max } => {
                json!({ "field": field, "type": "range", "min": min, "max": max })
            }
            ValidationError::Format { field, reason } => json!({ "field": field, "type": "format", "reason": reason }),
            ValidationError::InvalidValue { field, reason } => {
                json!({ "field": field, "type": "invalid_value", "reason": reason })
            }
            ValidationError::Custom(msg) => json!({ "type": "custom", "message": msg }),
        };
        Self::with_details(ErrorCode::ValidationFailed, &message, &details.to_string())
    }
}

// Implement From<std::ffi::NulError> for FFIError
impl From<std::ffi::NulError> for FFIError {
    fn from(_: std::ffi::NulError) -> Self {
        Self::new(ErrorCode::InvalidUtf8, "String contains null bytes, cannot create CString")
    }
}

impl From<serde_json::Error> for FFIError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Failed to serialize result: {}", err))
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<FFIError>> = const { RefCell::new(None) };
}

/// Remembers the error of the last failed call on this thread.
pub fn set_last_error(error: &FFIError) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(error.clone()));
}

pub fn take_last_error() -> Option<FFIError> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

// Result type alias for FFI functions
pub type FFIResult<T> = Result<T, FFIError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_details() {
        let err: FFIError = ValidationError::required("donor_email").into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details: serde_json::Value = serde_json::from_str(err.details.as_deref().unwrap()).unwrap();
        assert_eq!(details["field"], "donor_email");
        assert_eq!(details["type"], "required");
    }

    #[test]
    fn test_service_error_codes() {
        let not_found: FFIError = ServiceError::from(DomainError::not_found("Campaign", "9")).into();
        assert_eq!(not_found.code, ErrorCode::EntityNotFound);
        assert_eq!(not_found.code as i32, 201);

        let timeout = FFIError::from_service_error(ServiceError::Timeout(30));
        assert_eq!(timeout.code, ErrorCode::Timeout);

        let server = FFIError::from_service_error(ServiceError::Server {
            status: 500,
            message: "Erro interno".to_string(),
        });
        assert_eq!(server.message, "Erro interno");
        assert_eq!(server.details.as_deref(), Some(r#"{"status":500}"#));
    }

    #[test]
    fn test_last_error_is_taken_once() {
        set_last_error(&FFIError::invalid_argument("bad"));
        assert_eq!(take_last_error().map(|e| e.code), Some(ErrorCode::InvalidArgument));
        assert_eq!(take_last_error(), None);
    }
}
