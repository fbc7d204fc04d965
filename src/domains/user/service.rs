use crate::auth::SessionContext;
use crate::data_source::{with_timeout, DataSource};
use crate::domains::user::types::{UpdateProfile, UserProfile};
use crate::errors::ServiceResult;
use crate::validation::Validate;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

/// Trait defining profile operations for the signed-in user
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_profile(&self, session: &SessionContext) -> ServiceResult<UserProfile>;

    /// Validates `update` and saves it. An empty update just returns the
    /// current profile.
    async fn update_profile(&self, update: UpdateProfile, session: &SessionContext) -> ServiceResult<UserProfile>;
}

pub struct UserServiceImpl {
    data_source: Arc<dyn DataSource>,
    request_timeout_secs: u64,
}

impl UserServiceImpl {
    pub fn new(data_source: Arc<dyn DataSource>, request_timeout_secs: u64) -> Self {
        Self {
            data_source,
            request_timeout_secs,
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn get_profile(&self, session: &SessionContext) -> ServiceResult<UserProfile> {
        session.require()?;
        self.data_source.fetch_profile(session).await
    }

    async fn update_profile(&self, update: UpdateProfile, session: &SessionContext) -> ServiceResult<UserProfile> {
        let active = session.require()?;
        update.validate()?;

        if update.is_empty() {
            debug!("Empty profile update for {}", active.user.id);
            return self.data_source.fetch_profile(session).await;
        }

        let profile = with_timeout(
            self.request_timeout_secs,
            self.data_source.update_profile(&update, session),
        )
        .await?;
        info!("Profile {} updated", profile.id);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::Session;
    use crate::auth::types::LoginRequest;
    use crate::data_source::fixtures::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::data_source::FixtureDataSource;
    use crate::errors::{DomainError, ServiceError};

    async fn signed_in() -> (UserServiceImpl, SessionContext) {
        let source = Arc::new(FixtureDataSource::new());
        let response = source
            .login(&LoginRequest {
                email: DEMO_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
            })
            .await
            .unwrap();
        let session = SessionContext::with_session(Session::new(response.access_token, response.user));
        (UserServiceImpl::new(source, 5), session)
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let (service, _) = signed_in().await;
        let err = service.get_profile(&SessionContext::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (service, session) = signed_in().await;
        let profile = service.get_profile(&session).await.unwrap();
        assert_eq!(profile.phone.as_deref(), Some("(11) 99999-8888"));

        let updated = service
            .update_profile(
                UpdateProfile {
                    bio: Some("Professora e voluntária.".to_string()),
                    preferred_causes: Some(vec!["Cultura".to_string()]),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Professora e voluntária."));
        assert_eq!(updated.preferred_causes, vec!["Cultura".to_string()]);

        let unchanged = service.update_profile(UpdateProfile::default(), &session).await.unwrap();
        assert_eq!(unchanged, updated);
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_sent() {
        let (service, session) = signed_in().await;
        let err = service
            .update_profile(
                UpdateProfile {
                    state: Some("ZZ".to_string()),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(service.get_profile(&session).await.unwrap().state.as_deref(), Some("SP"));
    }
}
