use crate::errors::{DomainError, DomainResult, ErrorKind, ServiceError};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a donation or enrollment form currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting {
        attempt_id: Uuid,
    },
    Success,
    Failed {
        message: String,
        kind: ErrorKind,
        retryable: bool,
    },
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting { .. } => "submitting",
            SubmissionState::Success => "success",
            SubmissionState::Failed { .. } => "failed",
        }
    }
}

/// What happens once a submission has succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// Stay in `Success` (enrollment: one sign-up per visit)
    Terminal,
    /// `acknowledge` clears the form and returns to `Idle` (donation)
    ResetToIdle,
}

/// A validated payload ready to be sent, tagged with its attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<T> {
    pub attempt_id: Uuid,
    pub payload: T,
}

/// Explicit lifecycle for one form: `Idle -> Submitting -> Success | Failed`.
///
/// The draft is what the user typed. It survives failures so a retry does
/// not require re-entering anything.
#[derive(Debug, Clone)]
pub struct SubmissionFlow<D> {
    state: SubmissionState,
    policy: SuccessPolicy,
    draft: D,
}

impl<D: Default> SubmissionFlow<D> {
    pub fn new(policy: SuccessPolicy) -> Self {
        Self::with_draft(policy, D::default())
    }

    pub fn with_draft(policy: SuccessPolicy, draft: D) -> Self {
        Self {
            state: SubmissionState::Idle,
            policy,
            draft,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn policy(&self) -> SuccessPolicy {
        self.policy
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    /// The draft may only be edited while nothing is in flight.
    pub fn draft_mut(&mut self) -> DomainResult<&mut D> {
        match self.state {
            SubmissionState::Idle | SubmissionState::Failed { .. } => Ok(&mut self.draft),
            _ => Err(self.reject("edit the form")),
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting { .. })
    }

    /// `Idle -> Submitting`, only when `guard` accepts the draft. A rejected
    /// draft leaves the flow in `Idle`.
    pub fn begin<T, F>(&mut self, guard: F) -> DomainResult<Submission<T>>
    where
        F: FnOnce(&D) -> DomainResult<T>,
    {
        if self.state != SubmissionState::Idle {
            return Err(self.reject("submit"));
        }

        let payload = guard(&self.draft)?;
        let attempt_id = Uuid::new_v4();
        debug!("Submission attempt {} started", attempt_id);
        self.state = SubmissionState::Submitting { attempt_id };
        Ok(Submission { attempt_id, payload })
    }

    /// `Submitting -> Success`
    pub fn succeed(&mut self, attempt_id: Uuid) -> DomainResult<()> {
        self.ensure_in_flight(attempt_id, "complete")?;
        debug!("Submission attempt {} succeeded", attempt_id);
        self.state = SubmissionState::Success;
        Ok(())
    }

    /// `Submitting -> Failed`. The draft is left untouched.
    pub fn fail(&mut self, attempt_id: Uuid, error: &ServiceError) -> DomainResult<()> {
        self.ensure_in_flight(attempt_id, "fail")?;
        debug!("Submission attempt {} failed: {}", attempt_id, error);
        self.state = SubmissionState::Failed {
            message: error.user_message(),
            kind: error.kind(),
            retryable: error.is_retryable(),
        };
        Ok(())
    }

    /// Applies the outcome of the request started by `begin`.
    pub fn finish<T>(&mut self, attempt_id: Uuid, outcome: &Result<T, ServiceError>) -> DomainResult<()> {
        match outcome {
            Ok(_) => self.succeed(attempt_id),
            Err(e) => self.fail(attempt_id, e),
        }
    }

    /// `Success -> Idle` with a cleared form, for `ResetToIdle` flows.
    pub fn acknowledge(&mut self) -> DomainResult<()> {
        match (&self.state, self.policy) {
            (SubmissionState::Success, SuccessPolicy::ResetToIdle) => {
                self.state = SubmissionState::Idle;
                self.draft = D::default();
                Ok(())
            }
            _ => Err(self.reject("acknowledge")),
        }
    }

    /// `Failed -> Idle`, keeping the draft.
    pub fn retry(&mut self) -> DomainResult<()> {
        match self.state {
            SubmissionState::Failed { .. } => {
                self.state = SubmissionState::Idle;
                Ok(())
            }
            _ => Err(self.reject("retry")),
        }
    }

    /// Abandons the form. Not possible while a request is in flight.
    pub fn cancel(&mut self) -> DomainResult<()> {
        match self.state {
            SubmissionState::Idle | SubmissionState::Failed { .. } => {
                self.state = SubmissionState::Idle;
                self.draft = D::default();
                Ok(())
            }
            _ => Err(self.reject("cancel")),
        }
    }

    fn ensure_in_flight(&self, attempt_id: Uuid, action: &str) -> DomainResult<()> {
        match self.state {
            SubmissionState::Submitting { attempt_id: current } if current == attempt_id => Ok(()),
            SubmissionState::Submitting { .. } => Err(DomainError::invalid_transition(
                "submitting",
                &format!("{} a stale attempt", action),
            )),
            _ => Err(self.reject(action)),
        }
    }

    fn reject(&self, action: &str) -> DomainError {
        DomainError::invalid_transition(self.state.name(), action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Draft {
        amount: u32,
    }

    fn guard(min: u32) -> impl Fn(&Draft) -> DomainResult<u32> {
        move |draft| {
            if draft.amount >= min {
                Ok(draft.amount)
            } else {
                Err(ValidationError::range("amount", min.to_string(), "any".to_string()).into())
            }
        }
    }

    fn flow_with(amount: u32, policy: SuccessPolicy) -> SubmissionFlow<Draft> {
        SubmissionFlow::with_draft(policy, Draft { amount })
    }

    #[test]
    fn test_rejected_guard_stays_idle() {
        let mut flow = flow_with(5, SuccessPolicy::ResetToIdle);
        let err = flow.begin(guard(10)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(flow.state(), &SubmissionState::Idle);
        assert_eq!(flow.draft().amount, 5);
    }

    #[test]
    fn test_donation_cycle_resets_after_acknowledge() {
        let mut flow = flow_with(50, SuccessPolicy::ResetToIdle);
        let submission = flow.begin(guard(10)).unwrap();
        assert_eq!(submission.payload, 50);
        assert!(flow.is_submitting());

        flow.succeed(submission.attempt_id).unwrap();
        assert_eq!(flow.state(), &SubmissionState::Success);

        flow.acknowledge().unwrap();
        assert_eq!(flow.state(), &SubmissionState::Idle);
        assert_eq!(flow.draft(), &Draft::default());
    }

    #[test]
    fn test_enrollment_success_is_terminal() {
        let mut flow = flow_with(1, SuccessPolicy::Terminal);
        let submission = flow.begin(guard(0)).unwrap();
        flow.finish(submission.attempt_id, &Ok::<(), ServiceError>(())).unwrap();

        assert!(flow.acknowledge().is_err());
        assert!(flow.cancel().is_err());
        assert!(flow.begin(guard(0)).is_err());
        assert_eq!(flow.state(), &SubmissionState::Success);
    }

    #[test]
    fn test_failure_keeps_draft_for_retry() {
        let mut flow = flow_with(100, SuccessPolicy::ResetToIdle);
        let submission = flow.begin(guard(10)).unwrap();
        flow.finish::<()>(submission.attempt_id, &Err(ServiceError::transport("connection reset")))
            .unwrap();

        match flow.state() {
            SubmissionState::Failed { retryable, kind, .. } => {
                assert!(*retryable);
                assert_eq!(*kind, ErrorKind::Transport);
            }
            other => panic!("unexpected state {:?}", other),
        }

        flow.retry().unwrap();
        assert_eq!(flow.state(), &SubmissionState::Idle);
        assert_eq!(flow.draft().amount, 100);
        assert!(flow.begin(guard(10)).is_ok());
    }

    #[test]
    fn test_no_cancel_or_edit_while_submitting() {
        let mut flow = flow_with(20, SuccessPolicy::ResetToIdle);
        let submission = flow.begin(guard(10)).unwrap();

        assert!(matches!(flow.cancel(), Err(DomainError::InvalidStateTransition { .. })));
        assert!(flow.draft_mut().is_err());
        assert!(flow.retry().is_err());
        assert!(flow.begin(guard(10)).is_err());

        // A stale attempt cannot complete the current one
        assert!(flow.succeed(Uuid::new_v4()).is_err());
        flow.succeed(submission.attempt_id).unwrap();
    }

    #[test]
    fn test_cancel_from_idle_and_failed() {
        let mut flow = flow_with(20, SuccessPolicy::ResetToIdle);
        flow.cancel().unwrap();
        assert_eq!(flow.draft().amount, 0);

        flow.draft_mut().unwrap().amount = 30;
        let submission = flow.begin(guard(10)).unwrap();
        flow.fail(submission.attempt_id, &ServiceError::Timeout(30)).unwrap();
        flow.draft_mut().unwrap().amount = 40;
        flow.cancel().unwrap();
        assert_eq!(flow.state(), &SubmissionState::Idle);
        assert_eq!(flow.draft().amount, 0);
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(SubmissionState::Success).unwrap();
        assert_eq!(json["state"], "success");
    }
}
