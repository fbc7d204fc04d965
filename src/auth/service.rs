use crate::auth::context::{Session, SessionContext, SessionUser};
use crate::auth::types::{AuthResponse, CreateUserRequest, LoginRequest};
use crate::data_source::DataSource;
use crate::errors::ServiceResult;
use crate::validation::Validate;
use std::sync::Arc;

/// Auth service: signs users in and out of the injected session
pub struct AuthService {
    data_source: Arc<dyn DataSource>,
    session: SessionContext,
}

impl AuthService {
    /// Create a new auth service writing to `session`
    pub fn new(data_source: Arc<dyn DataSource>, session: SessionContext) -> Self {
        Self { data_source, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Authenticate with email and password. On success the session holds
    /// the returned token.
    pub async fn login(&self, credentials: LoginRequest) -> ServiceResult<SessionUser> {
        credentials.validate()?;
        let credentials = LoginRequest {
            email: credentials.email.trim().to_string(),
            password: credentials.password,
        };

        match self.data_source.login(&credentials).await {
            Ok(response) => Ok(self.start_session(response)),
            Err(e) => {
                log::warn!("Login failed: {}", e);
                Err(e)
            }
        }
    }

    /// Create an account and sign it in
    pub async fn register(&self, request: CreateUserRequest) -> ServiceResult<SessionUser> {
        request.validate()?;
        let response = self.data_source.register(&request).await?;
        let user = self.start_session(response);
        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Forget the current session. Tokens are not revoked server-side.
    pub fn logout(&self) {
        if let Some(user) = self.session.user() {
            log::info!("User {} logged out", user.id);
        }
        self.session.clear();
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.require().ok().map(|s| s.user)
    }

    fn start_session(&self, response: AuthResponse) -> SessionUser {
        let session = Session::new(response.access_token, response.user);
        let user = session.user.clone();
        log::debug!("Session started for {}", user.email);
        self.session.set(session);
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::fixtures::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::data_source::FixtureDataSource;
    use crate::domains::user::UserType;
    use crate::errors::{DomainError, ServiceError};

    fn service() -> AuthService {
        AuthService::new(Arc::new(FixtureDataSource::new()), SessionContext::new())
    }

    #[tokio::test]
    async fn test_login_sets_session() {
        let service = service();
        let user = service
            .login(LoginRequest {
                email: format!(" {} ", DEMO_EMAIL),
                password: DEMO_PASSWORD.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.name, "Maria Silva");
        assert!(service.session().is_authenticated());
        assert_eq!(service.current_user(), Some(user));

        service.logout();
        assert!(!service.session().is_authenticated());
        assert_eq!(service.current_user(), None);
    }

    #[tokio::test]
    async fn test_login_guard_runs_before_request() {
        let service = service();
        let err = service
            .login(LoginRequest {
                email: "maria".to_string(),
                password: DEMO_PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        let wrong = service
            .login(LoginRequest {
                email: DEMO_EMAIL.to_string(),
                password: "errada".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, ServiceError::Authentication(_)));
        assert!(!service.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let service = service();
        let user = service
            .register(CreateUserRequest {
                name: "Ong Verde".to_string(),
                email: "contato@ongverde.org".to_string(),
                password: "segredo1".to_string(),
                city: "Curitiba".to_string(),
                state: "pr".to_string(),
                user_type: UserType::Ngo,
                skills: vec![],
                experience: None,
                preferred_causes: vec!["Meio Ambiente".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(user.user_type, UserType::Ngo);
        assert_eq!(service.session().user(), Some(user));
    }
}
