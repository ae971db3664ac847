//! Submission orchestrator.
//!
//! Steps run strictly in sequence because each needs an identifier produced
//! by the one before it:
//!
//! 1. validate the record
//! 2. look up the applicant identity; a register application is refused
//!    when that identity already has one
//! 3. upload ID documents (register only)
//! 4. create the identity if there was none
//! 5. create the application, minting its number
//! 6. write the branch sub-records in [`BranchKind`] order
//!
//! There is no transaction across steps 5 and 6. A failed sub-record write
//! leaves the earlier ones in place and is reported with the branch name and
//! the payloads still to be written, which [`Orchestrator::retry_branches`]
//! accepts to finish the same application.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use voterreg_ids::{ActorId, ApplicationNumber, IdentityId};
use voterreg_record::{
    ApplicationBranch, ApplicationRecord, ApplicationType, Attachment, Field, ValidationReport,
    Validator,
};

use crate::backend::{Actor, BackendError, BranchKind, FileUpload, FileUploader, SubmissionBackend};
use crate::config::SubmissionConfig;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationReport),

    #[error("an applicant identity ({identity}) already exists for this account")]
    DuplicateIdentity { actor: ActorId, identity: IdentityId },

    #[error("upload of {field} failed: {message}")]
    UploadFailed { field: Field, message: String },

    #[error(
        "application {application_number} was created but its {branch} record failed: {message}"
    )]
    PartialSubmissionFailure {
        application_number: ApplicationNumber,
        branch: BranchKind,
        message: String,
        /// The failed write and everything after it, in write order.
        remaining: Vec<(BranchKind, Value)>,
    },

    #[error("application {0} not found")]
    UnknownApplication(ApplicationNumber),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl SubmissionError {
    /// Whether resubmitting the same record can succeed.
    ///
    /// A partial failure is not: the application exists, so the remaining
    /// branch writes go through [`Orchestrator::retry_branches`] instead.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmissionError::UploadFailed { .. } | SubmissionError::BackendUnavailable(_)
        )
    }
}

impl From<BackendError> for SubmissionError {
    fn from(err: BackendError) -> Self {
        SubmissionError::BackendUnavailable(err.message)
    }
}

/// Runs submissions against a backend and an uploader.
pub struct Orchestrator<B: SubmissionBackend, U: FileUploader> {
    backend: Arc<B>,
    uploader: Arc<U>,
    config: SubmissionConfig,
    today: Option<NaiveDate>,
}

impl<B: SubmissionBackend, U: FileUploader> Orchestrator<B, U> {
    pub fn new(backend: Arc<B>, uploader: Arc<U>, config: SubmissionConfig) -> Self {
        Self {
            backend,
            uploader,
            config,
            today: None,
        }
    }

    /// Validate against a fixed date instead of the local calendar.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// The validator `submit` applies, including the configured residency policy.
    pub fn validator(&self) -> Validator {
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Validator::new(today).with_residency_minimum(self.config.residency_minimum)
    }

    /// Submit `record` for `actor`, returning the minted application number.
    pub async fn submit(
        &self,
        record: &ApplicationRecord,
        actor: &Actor,
    ) -> Result<ApplicationNumber, SubmissionError> {
        let report = self.validator().validate(record);
        if !report.is_valid() {
            info!(failures = report.len(), "submission rejected by validation");
            return Err(SubmissionError::ValidationFailed(report));
        }

        // Validation guarantees a branch; this only keeps the match total.
        let kind = record.application_type().ok_or_else(|| {
            let mut report = ValidationReport::new();
            report.push(Field::ApplicationType, "Select an application type");
            SubmissionError::ValidationFailed(report)
        })?;

        let existing = self.existing_identity(kind, actor).await?;

        // The frozen copy carries uploaded URLs instead of file bytes.
        let mut frozen = record.clone();
        if let Some(ApplicationBranch::Register(registration)) = frozen.application.as_mut() {
            self.upload_attachment(
                Field::IdFrontPhoto,
                &mut registration.id_front_photo,
                &self.config.id_front_bucket,
            )
            .await?;
            self.upload_attachment(
                Field::IdSelfieUrl,
                &mut registration.id_selfie_url,
                &self.config.id_selfie_bucket,
            )
            .await?;
        }

        let identity = match existing {
            Some(identity) => identity,
            None => {
                let identity = self
                    .backend
                    .create_identity(&actor.id, identity_profile(&frozen))
                    .await?;
                info!(actor = %actor.id, identity = %identity, "applicant identity created");
                identity
            }
        };

        let application_number = self
            .backend
            .create_application(&frozen, &identity, actor)
            .await?;
        info!(
            application_number = %application_number,
            application_type = %kind,
            "application created"
        );

        self.write_branches(&application_number, branch_payloads(&frozen))
            .await?;

        info!(application_number = %application_number, "submission complete");
        Ok(application_number)
    }

    /// Finish an application whose branch writes stopped part way, using the
    /// `remaining` payloads carried by [`SubmissionError::PartialSubmissionFailure`].
    pub async fn retry_branches(
        &self,
        application_number: &ApplicationNumber,
        remaining: Vec<(BranchKind, Value)>,
    ) -> Result<(), SubmissionError> {
        if self.backend.application(application_number).await?.is_none() {
            return Err(SubmissionError::UnknownApplication(
                application_number.clone(),
            ));
        }
        info!(
            application_number = %application_number,
            branches = remaining.len(),
            "retrying branch writes"
        );
        self.write_branches(application_number, remaining).await?;
        info!(application_number = %application_number, "submission complete");
        Ok(())
    }

    async fn write_branches(
        &self,
        application_number: &ApplicationNumber,
        mut pending: Vec<(BranchKind, Value)>,
    ) -> Result<(), SubmissionError> {
        for index in 0..pending.len() {
            let (branch, payload) = pending[index].clone();
            if let Err(err) = self
                .backend
                .create_branch_record(branch, application_number, payload)
                .await
            {
                warn!(
                    application_number = %application_number,
                    branch = %branch,
                    error = %err,
                    "branch record write failed"
                );
                return Err(SubmissionError::PartialSubmissionFailure {
                    application_number: application_number.clone(),
                    branch,
                    message: err.message,
                    remaining: pending.split_off(index),
                });
            }
        }
        Ok(())
    }

    async fn upload_attachment(
        &self,
        field: Field,
        slot: &mut Option<Attachment>,
        bucket: &str,
    ) -> Result<(), SubmissionError> {
        let Some(attachment) = slot.as_mut() else {
            return Ok(());
        };
        if attachment.is_uploaded() {
            return Ok(());
        }

        let file = FileUpload {
            file_name: attachment.file_name.clone(),
            content_type: attachment.content_type.clone(),
            bytes: std::mem::take(&mut attachment.bytes),
        };
        let url = self
            .uploader
            .upload(file, bucket)
            .await
            .map_err(|err| SubmissionError::UploadFailed {
                field,
                message: err.message,
            })?;
        attachment.public_url = Some(url);
        Ok(())
    }

    /// The actor's identity, if any. Only an identity that already filed a
    /// register application makes a new one a duplicate; one left behind by
    /// a failed attempt is reused.
    async fn existing_identity(
        &self,
        kind: ApplicationType,
        actor: &Actor,
    ) -> Result<Option<IdentityId>, SubmissionError> {
        let Some(identity) = self.backend.find_identity(&actor.id).await? else {
            return Ok(None);
        };
        if kind == ApplicationType::Register && self.backend.has_registration(&identity).await? {
            warn!(actor = %actor.id, identity = %identity, "duplicate registration attempt");
            return Err(SubmissionError::DuplicateIdentity {
                actor: actor.id.clone(),
                identity,
            });
        }
        Ok(Some(identity))
    }
}

/// Always-present applicant groups, as stored on the identity.
pub fn identity_profile(record: &ApplicationRecord) -> Value {
    json!({
        "identity": record.identity,
        "citizenship": record.citizenship,
        "contact": record.contact,
        "civil": record.civil,
        "parents": record.parents,
        "sector": record.sector,
    })
}

fn attachment_url(attachment: &Option<Attachment>) -> Option<&str> {
    attachment.as_ref().and_then(|a| a.public_url.as_deref())
}

/// Sub-record payloads of the active branch, in write order.
pub fn branch_payloads(record: &ApplicationRecord) -> Vec<(BranchKind, Value)> {
    let Some(branch) = record.application.as_ref() else {
        return Vec::new();
    };

    let payload = |kind: BranchKind| -> Value {
        match (kind, branch) {
            (BranchKind::Registration, ApplicationBranch::Register(registration)) => json!({
                "track": registration.track,
                "idFrontPhotoUrl": attachment_url(&registration.id_front_photo),
                "idSelfieUrl": attachment_url(&registration.id_selfie_url),
            }),
            (BranchKind::Transfer, _) => json!({ "origin": branch.origin() }),
            (BranchKind::Reactivation, _) => {
                let reason = branch.reason_for_deactivation();
                json!({
                    "reasonForDeactivation": reason,
                    "reasonDescription": reason.map(|r| r.description()),
                })
            }
            (BranchKind::Correction, ApplicationBranch::CorrectionOfEntry(correction)) => {
                json!(correction)
            }
            (BranchKind::Reinstatement, ApplicationBranch::Reinstatement(reinstatement)) => {
                let kind = reinstatement.reinstatement_type;
                json!({
                    "reinstatementType": kind,
                    "description": kind.map(|k| k.description()),
                })
            }
            (BranchKind::Address, _) => json!(branch.address()),
            _ => Value::Null,
        }
    };

    BranchKind::for_application(branch.kind())
        .iter()
        .map(|kind| (*kind, payload(*kind)))
        .collect()
}
