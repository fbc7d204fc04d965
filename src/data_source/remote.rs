use crate::auth::types::{AuthResponse, CreateUserRequest, LoginRequest};
use crate::auth::SessionContext;
use crate::config::{AppConfig, DataSourceKind};
use crate::data_source::DataSource;
use crate::domains::campaign::{CampaignRecord, NewDonation};
use crate::domains::project::{ProjectQuery, ProjectRecord};
use crate::domains::user::{UpdateProfile, UserProfile};
use crate::errors::{DomainError, ServiceError, ServiceResult};
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// List responses come back either bare or wrapped in `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Wrapped { data } => data,
        }
    }
}

/// Entity a request is about, so a 404 can be reported as `EntityNotFound`.
struct Target<'a> {
    entity: &'a str,
    id: &'a str,
}

/// Data source backed by the REST API.
pub struct ApiDataSource {
    client: Client,
    base_url: String,
    request_timeout_secs: u64,
}

impl ApiDataSource {
    /// Fails with `ServiceError::Configuration` when the HTTP client cannot
    /// be built, e.g. no TLS backend is available.
    pub fn new(base_url: &str, request_timeout_secs: u64, connect_timeout_secs: u64) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| {
                error!("Failed to build HTTP client: {}", e);
                ServiceError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
        })
    }

    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        Self::new(config.api_root(), config.request_timeout_secs, config.connect_timeout_secs)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self, token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Attaches the session token when there is a live one.
    fn authorized(&self, builder: RequestBuilder, session: &SessionContext) -> RequestBuilder {
        match session.token() {
            Some(token) => builder.header("Authorization", self.auth_header(&token)),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        action: &str,
        target: Option<Target<'_>>,
        had_token: bool,
    ) -> ServiceResult<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Timeout(self.request_timeout_secs)
            } else {
                ServiceError::transport(format!("Failed to {}: {}", action, e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to get error details".to_string());
        let message = server_message(&error_text).unwrap_or_else(|| fallback_message(status));
        warn!("Failed to {}: server returned {}", action, status);

        Err(match (status, target) {
            (StatusCode::NOT_FOUND, Some(target)) => DomainError::not_found(target.entity, target.id).into(),
            (StatusCode::UNAUTHORIZED, _) if had_token => ServiceError::SessionExpired,
            (StatusCode::UNAUTHORIZED, _) => ServiceError::Authentication(message),
            (StatusCode::FORBIDDEN, _) => ServiceError::PermissionDenied(message),
            _ => ServiceError::Server {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> ServiceResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::transport(format!("Failed to parse {} response: {}", action, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
        target: Option<Target<'_>>,
        session: &SessionContext,
    ) -> ServiceResult<T> {
        debug!("GET {}", path);
        let builder = self.authorized(self.client.get(self.url(path)), session);
        let response = self.send(builder, action, target, session.token().is_some()).await?;
        Self::read_json(response, action).await
    }
}

/// `message` field of an error body. NestJS-style validation errors carry an
/// array of messages.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(message) if !message.is_empty() => Some(message.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

fn fallback_message(status: StatusCode) -> String {
    format!("Erro {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown"))
}

#[async_trait]
impl DataSource for ApiDataSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Remote
    }

    async fn fetch_projects(
        &self,
        query: Option<&ProjectQuery>,
        session: &SessionContext,
    ) -> ServiceResult<Vec<ProjectRecord>> {
        let query_string = query.map(ProjectQuery::to_query_string).unwrap_or_default();
        let body: ListBody<ProjectRecord> = self
            .get_json(&format!("/projects{}", query_string), "fetch projects", None, session)
            .await?;
        Ok(body.into_vec())
    }

    async fn fetch_project_by_id(&self, id: &str, session: &SessionContext) -> ServiceResult<ProjectRecord> {
        let path = format!("/projects/{}", urlencoding::encode(id));
        self.get_json(&path, "fetch project", Some(Target { entity: "Project", id }), session)
            .await
    }

    async fn fetch_campaigns(&self, session: &SessionContext) -> ServiceResult<Vec<CampaignRecord>> {
        let body: ListBody<CampaignRecord> = self.get_json("/campaigns", "fetch campaigns", None, session).await?;
        Ok(body.into_vec())
    }

    async fn fetch_campaign_by_id(&self, id: &str, session: &SessionContext) -> ServiceResult<CampaignRecord> {
        let path = format!("/campaigns/{}", urlencoding::encode(id));
        self.get_json(&path, "fetch campaign", Some(Target { entity: "Campaign", id }), session)
            .await
    }

    async fn submit_donation(
        &self,
        campaign_id: &str,
        donation: &NewDonation,
        session: &SessionContext,
    ) -> ServiceResult<()> {
        debug!("Submitting donation of {} to campaign {}", donation.amount, campaign_id);
        let url = self.url(&format!("/campaigns/{}/donations", urlencoding::encode(campaign_id)));
        let builder = self.authorized(self.client.post(url).json(donation), session);
        self.send(
            builder,
            "submit donation",
            Some(Target { entity: "Campaign", id: campaign_id }),
            session.token().is_some(),
        )
        .await?;
        Ok(())
    }

    async fn submit_enrollment(&self, project_id: &str, session: &SessionContext) -> ServiceResult<()> {
        let active = session.require()?;
        debug!("Enrolling user {} in project {}", active.user.id, project_id);
        let url = self.url(&format!("/projects/{}/enrollments", urlencoding::encode(project_id)));
        let builder = self
            .client
            .post(url)
            .header("Authorization", self.auth_header(&active.token));
        self.send(
            builder,
            "submit enrollment",
            Some(Target { entity: "Project", id: project_id }),
            true,
        )
        .await?;
        Ok(())
    }

    async fn login(&self, credentials: &LoginRequest) -> ServiceResult<AuthResponse> {
        debug!("Signing in {}", credentials.email);
        let builder = self.client.post(self.url("/auth/login")).json(credentials);
        let response = self.send(builder, "sign in", None, false).await?;
        Self::read_json(response, "sign in").await
    }

    async fn register(&self, request: &CreateUserRequest) -> ServiceResult<AuthResponse> {
        debug!("Registering {}", request.email);
        let builder = self.client.post(self.url("/auth/register")).json(request);
        let response = self.send(builder, "register", None, false).await?;
        Self::read_json(response, "register").await
    }

    async fn fetch_profile(&self, session: &SessionContext) -> ServiceResult<UserProfile> {
        session.require()?;
        self.get_json("/users/profile", "fetch profile", None, session).await
    }

    async fn update_profile(&self, update: &UpdateProfile, session: &SessionContext) -> ServiceResult<UserProfile> {
        let active = session.require()?;
        let builder = self
            .client
            .put(self.url("/users/profile"))
            .header("Authorization", self.auth_header(&active.token))
            .json(update);
        let response = self.send(builder, "update profile", None, true).await?;
        Self::read_json(response, "update profile").await
    }
}
