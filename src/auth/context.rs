use crate::auth::jwt;
use crate::domains::user::UserType;
use crate::errors::{ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// The signed-in user as returned by login/register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(deserialize_with = "crate::types::record_id::deserialize")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, alias = "userType")]
    pub user_type: UserType,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    /// Taken from the token's `exp` claim when it is a JWT
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: String, user: SessionUser) -> Self {
        let expires_at = jwt::peek_expiry(&token);
        Self { token, user, expires_at }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |exp| exp <= now)
    }
}

/// Process-wide session handle, passed explicitly to every data-access call.
///
/// Starts empty, is set on login or register and cleared on logout. Clones
/// share the same underlying session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(session))),
        }
    }

    pub fn set(&self, session: Session) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(session),
            Err(poisoned) => *poisoned.into_inner() = Some(session),
        }
    }

    pub fn clear(&self) {
        match self.inner.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn current(&self) -> Option<Session> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().map_or(false, |s| !s.is_expired_at(Utc::now()))
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.current().map(|s| s.user)
    }

    /// Token to attach to requests, if any. Expired tokens are not sent.
    pub fn token(&self) -> Option<String> {
        self.current()
            .filter(|s| !s.is_expired_at(Utc::now()))
            .map(|s| s.token)
    }

    /// The active session, or the error a protected call should fail with.
    pub fn require(&self) -> ServiceResult<Session> {
        match self.current() {
            None => Err(ServiceError::Authentication("You need to sign in first".to_string())),
            Some(session) if session.is_expired_at(Utc::now()) => Err(ServiceError::SessionExpired),
            Some(session) => Ok(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> SessionUser {
        SessionUser {
            id: "u-1".to_string(),
            name: "Maria Silva".to_string(),
            email: "maria.silva@email.com".to_string(),
            user_type: UserType::Volunteer,
        }
    }

    #[test]
    fn test_lifecycle() {
        let ctx = SessionContext::new();
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.require(), Err(ServiceError::Authentication(_))));

        let shared = ctx.clone();
        ctx.set(Session::new("opaque-token".to_string(), user()));
        assert!(shared.is_authenticated());
        assert_eq!(shared.token().as_deref(), Some("opaque-token"));
        assert_eq!(shared.user().map(|u| u.name), Some("Maria Silva".to_string()));

        shared.clear();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.token(), None);
    }

    #[test]
    fn test_expired_session() {
        let session = Session {
            token: "t".to_string(),
            user: user(),
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        };
        let ctx = SessionContext::with_session(session);
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.token(), None);
        assert!(matches!(ctx.require(), Err(ServiceError::SessionExpired)));
    }

    #[test]
    fn test_session_user_from_backend_json() {
        let json = r#"{"id": "abc", "name": "Ana", "email": "ana@example.com", "userType": "ngo"}"#;
        let parsed: SessionUser = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.user_type, UserType::Ngo);
    }
}
