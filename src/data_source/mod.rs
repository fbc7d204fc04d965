pub mod fixtures;
pub mod remote;

use crate::auth::types::{AuthResponse, CreateUserRequest, LoginRequest};
use crate::auth::SessionContext;
use crate::config::{AppConfig, DataSourceKind};
use crate::domains::campaign::{CampaignRecord, NewDonation};
use crate::domains::project::{ProjectQuery, ProjectRecord};
use crate::domains::user::{UpdateProfile, UserProfile};
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use fixtures::FixtureDataSource;
pub use remote::ApiDataSource;

/// Where listing records come from and where submissions go.
///
/// Services and the listing core only ever see this trait, so the built-in
/// sample data and the REST backend are interchangeable.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn kind(&self) -> DataSourceKind;

    async fn fetch_projects(
        &self,
        query: Option<&ProjectQuery>,
        session: &SessionContext,
    ) -> ServiceResult<Vec<ProjectRecord>>;

    async fn fetch_project_by_id(&self, id: &str, session: &SessionContext) -> ServiceResult<ProjectRecord>;

    async fn fetch_campaigns(&self, session: &SessionContext) -> ServiceResult<Vec<CampaignRecord>>;

    async fn fetch_campaign_by_id(&self, id: &str, session: &SessionContext) -> ServiceResult<CampaignRecord>;

    async fn submit_donation(
        &self,
        campaign_id: &str,
        donation: &NewDonation,
        session: &SessionContext,
    ) -> ServiceResult<()>;

    /// Enrolls the signed-in volunteer.
    async fn submit_enrollment(&self, project_id: &str, session: &SessionContext) -> ServiceResult<()>;

    async fn login(&self, credentials: &LoginRequest) -> ServiceResult<AuthResponse>;

    async fn register(&self, request: &CreateUserRequest) -> ServiceResult<AuthResponse>;

    async fn fetch_profile(&self, session: &SessionContext) -> ServiceResult<UserProfile>;

    async fn update_profile(&self, update: &UpdateProfile, session: &SessionContext) -> ServiceResult<UserProfile>;
}

/// Builds the data source selected by `config`.
pub fn from_config(config: &AppConfig) -> ServiceResult<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match config.data_source {
        DataSourceKind::Fixture => Arc::new(FixtureDataSource::new()),
        DataSourceKind::Remote => Arc::new(ApiDataSource::from_config(config)?),
    };
    Ok(source)
}

/// Runs `future`, failing with `ServiceError::Timeout` after `secs` seconds.
pub(crate) async fn with_timeout<T, F>(secs: u64, future: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), future).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(secs)),
    }
}
