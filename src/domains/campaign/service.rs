use crate::auth::SessionContext;
use crate::data_source::{with_timeout, DataSource};
use crate::domains::campaign::types::{CampaignRecord, DonationForm};
use crate::domains::listing::filter::{filter_records, FilterCriteria};
use crate::domains::submission::SubmissionFlow;
use crate::errors::{ServiceResult, ValidationError};
use async_trait::async_trait;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Trait defining campaign service operations
#[async_trait]
pub trait CampaignService: Send + Sync {
    /// All campaigns matching `criteria`, in data-source order.
    async fn list_campaigns(
        &self,
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> ServiceResult<Vec<CampaignRecord>>;

    async fn get_campaign(&self, id: &str, session: &SessionContext) -> ServiceResult<CampaignRecord>;

    /// Drives `flow` through one donation attempt for `campaign`.
    ///
    /// A draft the guard rejects leaves the flow `Idle` and returns the
    /// validation error. Otherwise the flow ends in `Success` or `Failed`.
    /// On success the campaign is re-fetched; `Ok(None)` means the write went
    /// through but the refresh did not.
    async fn submit_donation(
        &self,
        campaign: &CampaignRecord,
        flow: &mut SubmissionFlow<DonationForm>,
        session: &SessionContext,
    ) -> ServiceResult<Option<CampaignRecord>>;

    fn min_donation(&self) -> Decimal;
}

/// Implementation of the campaign service
pub struct CampaignServiceImpl {
    data_source: Arc<dyn DataSource>,
    min_donation: Decimal,
    request_timeout_secs: u64,
}

impl CampaignServiceImpl {
    pub fn new(data_source: Arc<dyn DataSource>, min_donation: Decimal, request_timeout_secs: u64) -> Self {
        Self {
            data_source,
            min_donation,
            request_timeout_secs,
        }
    }

    fn ensure_accepts_donations(campaign: &CampaignRecord) -> Result<(), ValidationError> {
        if campaign.accepts_donations() {
            Ok(())
        } else {
            Err(ValidationError::invalid_value("campaign", "is not accepting donations"))
        }
    }
}

#[async_trait]
impl CampaignService for CampaignServiceImpl {
    async fn list_campaigns(
        &self,
        criteria: &FilterCriteria,
        session: &SessionContext,
    ) -> ServiceResult<Vec<CampaignRecord>> {
        let campaigns = self.data_source.fetch_campaigns(session).await?;
        let filtered = filter_records(&campaigns, criteria);
        debug!("{} of {} campaigns match", filtered.len(), campaigns.len());
        Ok(filtered)
    }

    async fn get_campaign(&self, id: &str, session: &SessionContext) -> ServiceResult<CampaignRecord> {
        self.data_source.fetch_campaign_by_id(id, session).await
    }

    async fn submit_donation(
        &self,
        campaign: &CampaignRecord,
        flow: &mut SubmissionFlow<DonationForm>,
        session: &SessionContext,
    ) -> ServiceResult<Option<CampaignRecord>> {
        let min_donation = self.min_donation;
        let submission = flow.begin(|form| {
            Self::ensure_accepts_donations(campaign)?;
            form.validate_for(min_donation)
        })?;

        let outcome = with_timeout(
            self.request_timeout_secs,
            self.data_source
                .submit_donation(&campaign.id, &submission.payload, session),
        )
        .await;
        flow.finish(submission.attempt_id, &outcome)?;

        if let Err(e) = outcome {
            warn!("Donation to campaign {} failed: {}", campaign.id, e);
            return Err(e);
        }
        info!("Donation of {} sent to campaign {}", submission.payload.amount, campaign.id);

        match self.data_source.fetch_campaign_by_id(&campaign.id, session).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) => {
                warn!("Could not refresh campaign {} after donation: {}", campaign.id, e);
                Ok(None)
            }
        }
    }

    fn min_donation(&self) -> Decimal {
        self.min_donation
    }
}
