use crate::auth::SessionContext;
use crate::data_source::{with_timeout, DataSource};
use crate::domains::listing::filter::{filter_records, FilterCriteria};
use crate::domains::project::types::{ProjectQuery, ProjectRecord};
use crate::domains::submission::SubmissionFlow;
use crate::errors::{DomainResult, ServiceResult, ValidationError};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

/// Trait defining project service operations
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// Projects matching `criteria`. Cause, status and state are sent to the
    /// data source; the full predicate is applied again locally.
    async fn list_projects(
        &self,
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> ServiceResult<Vec<ProjectRecord>>;

    async fn get_project(&self, id: &str, session: &SessionContext) -> ServiceResult<ProjectRecord>;

    /// Drives `flow` through one enrollment attempt for `project`. Same
    /// contract as the donation flow.
    async fn submit_enrollment(
        &self,
        project: &ProjectRecord,
        flow: &mut SubmissionFlow<()>,
        session: &SessionContext,
    ) -> ServiceResult<Option<ProjectRecord>>;
}

pub struct ProjectServiceImpl {
    data_source: Arc<dyn DataSource>,
    request_timeout_secs: u64,
}

impl ProjectServiceImpl {
    pub fn new(data_source: Arc<dyn DataSource>, request_timeout_secs: u64) -> Self {
        Self {
            data_source,
            request_timeout_secs,
        }
    }

    fn enrollment_guard(project: &ProjectRecord, volunteer_id: &str) -> DomainResult<()> {
        if !project.accepts_enrollment() {
            return Err(ValidationError::invalid_value("status", "project is not accepting volunteers").into());
        }
        if project.is_enrolled(volunteer_id) {
            return Err(ValidationError::invalid_value("project", "you are already enrolled").into());
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectService for ProjectServiceImpl {
    async fn list_projects(
        &self,
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> ServiceResult<Vec<ProjectRecord>> {
        let query = ProjectQuery::from_criteria(criteria);
        let server_query = if query.is_empty() { None } else { Some(&query) };
        let projects = self.data_source.fetch_projects(server_query, session).await?;
        let filtered = filter_records(&projects, criteria);
        debug!("{} of {} projects match", filtered.len(), projects.len());
        Ok(filtered)
    }

    async fn get_project(&self, id: &str, session: &SessionContext) -> ServiceResult<ProjectRecord> {
        self.data_source.fetch_project_by_id(id, session).await
    }

    async fn submit_enrollment(
        &self,
        project: &ProjectRecord,
        flow: &mut SubmissionFlow<()>,
        session: &SessionContext,
    ) -> ServiceResult<Option<ProjectRecord>> {
        // Signing in is a precondition, not a failed attempt
        let active = session.require()?;
        let submission = flow.begin(|_| Self::enrollment_guard(project, &active.user.id))?;

        let outcome = with_timeout(
            self.request_timeout_secs,
            self.data_source.submit_enrollment(&project.id, session),
        )
        .await;
        flow.finish(submission.attempt_id, &outcome)?;

        if let Err(e) = outcome {
            warn!("Enrollment in project {} failed: {}", project.id, e);
            return Err(e);
        }
        info!("User {} enrolled in project {}", active.user.id, project.id);

        match self.data_source.fetch_project_by_id(&project.id, session).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) => {
                warn!("Could not refresh project {} after enrollment: {}", project.id, e);
                Ok(None)
            }
        }
    }
}
