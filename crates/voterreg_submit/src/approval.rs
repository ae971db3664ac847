//! Officer review: verify, approve, disapprove, revert.
//!
//! Approval is the one step with a compensating action. The status is
//! advanced first; if the voter record cannot be created afterwards, the
//! status is put back to what it was before approval.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use voterreg_ids::ApplicationNumber;

use crate::backend::{Actor, ApplicationSummary, BackendError, SubmissionBackend};
use crate::status::{ApplicationStatus, StatusTransition, ROLLBACK_PREFIX};

/// Externally assigned voter details required to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterDetails {
    pub precinct_number: String,
    pub voter_id: String,
}

impl VoterDetails {
    pub fn new(precinct_number: impl Into<String>, voter_id: impl Into<String>) -> Self {
        Self {
            precinct_number: precinct_number.into(),
            voter_id: voter_id.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.precinct_number.trim().is_empty() && !self.voter_id.trim().is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("application {0} not found")]
    NotFound(ApplicationNumber),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    #[error("precinct number and voter ID are required to approve")]
    MissingVoterDetails,

    #[error("a reason is required to disapprove")]
    ReasonRequired,

    #[error(
        "voter record creation failed for {application_number}; status was reverted to {reverted_to}: {message}"
    )]
    ApprovalRollback {
        application_number: ApplicationNumber,
        reverted_to: ApplicationStatus,
        message: String,
    },

    #[error(
        "voter record creation failed for {application_number} ({message}) and reverting the status also failed: {rollback_message}"
    )]
    RollbackFailed {
        application_number: ApplicationNumber,
        message: String,
        rollback_message: String,
    },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Status changes on submitted applications.
pub struct ApprovalWorkflow<B: SubmissionBackend> {
    backend: Arc<B>,
}

impl<B: SubmissionBackend> ApprovalWorkflow<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    async fn load(&self, number: &ApplicationNumber) -> Result<ApplicationSummary, ApprovalError> {
        self.backend
            .application(number)
            .await?
            .ok_or_else(|| ApprovalError::NotFound(number.clone()))
    }

    fn check(from: ApplicationStatus, to: ApplicationStatus) -> Result<(), ApprovalError> {
        if from.can_transition_to(to) {
            Ok(())
        } else {
            Err(ApprovalError::InvalidTransition { from, to })
        }
    }

    async fn apply(
        &self,
        number: &ApplicationNumber,
        from: ApplicationStatus,
        to: ApplicationStatus,
        reason: Option<&str>,
        actor: &Actor,
    ) -> Result<StatusTransition, ApprovalError> {
        Self::check(from, to)?;
        self.backend.set_application_status(number, to, reason).await?;
        info!(application_number = %number, %from, %to, actor = %actor.id, "status changed");

        let mut transition = StatusTransition::new(from, to).with_actor(actor.id.to_string());
        if let Some(reason) = reason {
            transition = transition.with_reason(reason);
        }
        Ok(transition)
    }

    pub async fn verify(
        &self,
        number: &ApplicationNumber,
        actor: &Actor,
    ) -> Result<StatusTransition, ApprovalError> {
        let current = self.load(number).await?;
        self.apply(number, current.status, ApplicationStatus::Verified, None, actor)
            .await
    }

    /// Approve and create the voter record, reverting the status if that fails.
    pub async fn approve(
        &self,
        number: &ApplicationNumber,
        details: &VoterDetails,
        actor: &Actor,
    ) -> Result<StatusTransition, ApprovalError> {
        let current = self.load(number).await?;
        let from = current.status;
        Self::check(from, ApplicationStatus::Approved)?;
        if !details.is_complete() {
            return Err(ApprovalError::MissingVoterDetails);
        }

        let transition = self
            .apply(number, from, ApplicationStatus::Approved, None, actor)
            .await?;

        let created = self
            .backend
            .create_voter_record(
                &current.identity_id,
                details.precinct_number.trim(),
                details.voter_id.trim(),
            )
            .await;
        let Err(err) = created else {
            info!(application_number = %number, voter_id = %details.voter_id, "voter record created");
            return Ok(transition);
        };

        warn!(application_number = %number, error = %err, "voter record creation failed; reverting");
        let reason = format!("{}voter record creation failed: {}", ROLLBACK_PREFIX, err);
        match self
            .backend
            .set_application_status(number, from, Some(&reason))
            .await
        {
            Ok(()) => Err(ApprovalError::ApprovalRollback {
                application_number: number.clone(),
                reverted_to: from,
                message: err.message,
            }),
            Err(rollback) => {
                error!(
                    application_number = %number,
                    error = %rollback,
                    "status left approved without a voter record"
                );
                Err(ApprovalError::RollbackFailed {
                    application_number: number.clone(),
                    message: err.message,
                    rollback_message: rollback.message,
                })
            }
        }
    }

    pub async fn disapprove(
        &self,
        number: &ApplicationNumber,
        reason: &str,
        actor: &Actor,
    ) -> Result<StatusTransition, ApprovalError> {
        let reason = reason.trim();
        let current = self.load(number).await?;
        Self::check(current.status, ApplicationStatus::Disapproved)?;
        if reason.is_empty() {
            return Err(ApprovalError::ReasonRequired);
        }
        self.apply(
            number,
            current.status,
            ApplicationStatus::Disapproved,
            Some(reason),
            actor,
        )
        .await
    }

    /// Explicit revert to pending.
    pub async fn revert_to_pending(
        &self,
        number: &ApplicationNumber,
        reason: Option<&str>,
        actor: &Actor,
    ) -> Result<StatusTransition, ApprovalError> {
        let current = self.load(number).await?;
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        self.apply(
            number,
            current.status,
            ApplicationStatus::Pending,
            reason,
            actor,
        )
        .await
    }
}
