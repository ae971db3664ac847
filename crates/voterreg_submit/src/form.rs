//! One applicant's editing session over the record.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};
use voterreg_draft::{DraftError, DraftGuard, MountOutcome};
use voterreg_ids::ApplicationNumber;
use voterreg_record::{resolve, ApplicationRecord, DiscriminantChange, ValidationReport, Validator};

use crate::backend::{Actor, BranchKind, FileUploader, SubmissionBackend};
use crate::orchestrator::{Orchestrator, SubmissionError};

/// The in-memory record plus its draft persistence.
pub struct ApplicationForm {
    record: ApplicationRecord,
    guard: DraftGuard,
}

impl ApplicationForm {
    /// Start a session from whatever the draft slot holds.
    pub fn mount(guard: DraftGuard) -> Result<(Self, MountOutcome), DraftError> {
        let outcome = guard.on_mount()?;
        let record = outcome.clone().into_record();
        Ok((Self { record, guard }, outcome))
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn guard(&self) -> &DraftGuard {
        &self.guard
    }

    /// Apply a discriminant change through the resolver, then autosave.
    pub fn change(&mut self, change: DiscriminantChange) {
        let next = resolve(&self.record, change);
        if next == self.record {
            return;
        }
        self.record = next;
        self.guard.autosave(&self.record);
    }

    /// Edit a non-discriminant field, then autosave.
    pub fn edit<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut ApplicationRecord),
    {
        edit(&mut self.record);
        self.guard.autosave(&self.record);
    }

    pub fn validate(&self, today: NaiveDate) -> ValidationReport {
        Validator::new(today).validate(&self.record)
    }

    /// Submit the current record. On success the draft is retired and the
    /// form starts over; on failure the record is left as it was.
    pub async fn submit<B, U>(
        &mut self,
        orchestrator: &Orchestrator<B, U>,
        actor: &Actor,
    ) -> Result<ApplicationNumber, SubmissionError>
    where
        B: SubmissionBackend,
        U: FileUploader,
    {
        let number = orchestrator.submit(&self.record, actor).await?;
        self.retire(&number);
        Ok(number)
    }

    /// Finish a submission whose branch writes stopped part way. The draft
    /// is kept until the application is complete.
    pub async fn retry_branches<B, U>(
        &mut self,
        orchestrator: &Orchestrator<B, U>,
        application_number: &ApplicationNumber,
        remaining: Vec<(BranchKind, Value)>,
    ) -> Result<(), SubmissionError>
    where
        B: SubmissionBackend,
        U: FileUploader,
    {
        orchestrator
            .retry_branches(application_number, remaining)
            .await?;
        self.retire(application_number);
        Ok(())
    }

    fn retire(&mut self, number: &ApplicationNumber) {
        if let Err(err) = self.guard.record_submission(&self.record) {
            warn!(application_number = %number, error = %err, "could not record submission locally");
        }
        self.record = ApplicationRecord::default();
        debug!(application_number = %number, "form reset after submission");
    }

    /// Drop the draft and start from an empty record.
    pub fn reset(&mut self) -> Result<(), DraftError> {
        self.guard.reset()?;
        self.record = ApplicationRecord::default();
        Ok(())
    }
}
