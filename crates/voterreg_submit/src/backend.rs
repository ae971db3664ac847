//! Remote collaborators: the hosted backend and the file uploader.
//!
//! Both are opaque. The core only relies on each call either succeeding or
//! failing with a message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use voterreg_ids::{ActorId, ApplicationNumber, IdentityId};
use voterreg_record::{ApplicationRecord, ApplicationType};

use crate::status::ApplicationStatus;

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The signed-in user on whose behalf a call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Actor {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Sub-records written after the application itself, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Registration,
    Transfer,
    Reactivation,
    Correction,
    Reinstatement,
    Address,
}

impl BranchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Registration => "registration",
            BranchKind::Transfer => "transfer",
            BranchKind::Reactivation => "reactivation",
            BranchKind::Correction => "correction",
            BranchKind::Reinstatement => "reinstatement",
            BranchKind::Address => "address",
        }
    }

    /// Sub-records an application of `kind` writes, in order.
    pub fn for_application(kind: ApplicationType) -> &'static [BranchKind] {
        match kind {
            ApplicationType::Register => &[BranchKind::Registration, BranchKind::Address],
            ApplicationType::Transfer => &[BranchKind::Transfer, BranchKind::Address],
            ApplicationType::Reactivation => &[BranchKind::Reactivation],
            ApplicationType::TransferWithReactivation => &[
                BranchKind::Transfer,
                BranchKind::Reactivation,
                BranchKind::Address,
            ],
            ApplicationType::CorrectionOfEntry => &[BranchKind::Correction],
            ApplicationType::Reinstatement => &[BranchKind::Reinstatement],
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the backend knows about a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub application_number: ApplicationNumber,
    pub application_type: ApplicationType,
    pub identity_id: IdentityId,
    pub status: ApplicationStatus,
}

/// Persistence calls made by the orchestrator and the approval workflow.
#[async_trait::async_trait]
pub trait SubmissionBackend: Send + Sync {
    /// The applicant identity already linked to this actor, if any.
    async fn find_identity(&self, actor: &ActorId) -> Result<Option<IdentityId>, BackendError>;

    /// Whether `identity` has already filed a register application.
    async fn has_registration(&self, identity: &IdentityId) -> Result<bool, BackendError>;

    async fn create_identity(
        &self,
        actor: &ActorId,
        profile: Value,
    ) -> Result<IdentityId, BackendError>;

    /// Create the application row and mint its number.
    async fn create_application(
        &self,
        record: &ApplicationRecord,
        identity: &IdentityId,
        actor: &Actor,
    ) -> Result<ApplicationNumber, BackendError>;

    async fn create_branch_record(
        &self,
        branch: BranchKind,
        application_number: &ApplicationNumber,
        payload: Value,
    ) -> Result<(), BackendError>;

    async fn application(
        &self,
        application_number: &ApplicationNumber,
    ) -> Result<Option<ApplicationSummary>, BackendError>;

    async fn set_application_status(
        &self,
        application_number: &ApplicationNumber,
        status: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<(), BackendError>;

    async fn create_voter_record(
        &self,
        identity: &IdentityId,
        precinct_number: &str,
        voter_id: &str,
    ) -> Result<(), BackendError>;
}

/// A file picked by the applicant, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait::async_trait]
pub trait FileUploader: Send + Sync {
    /// Store the file in `bucket` and return its public URL.
    async fn upload(&self, file: FileUpload, bucket: &str) -> Result<String, BackendError>;
}
