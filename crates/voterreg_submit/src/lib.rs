//! Submission and review of voter-registration applications.
//!
//! [`Orchestrator`] turns a validated record into an application on the
//! backend. [`ApprovalWorkflow`] moves submitted applications through their
//! review statuses. [`ApplicationForm`] is the applicant-side session that
//! ties editing, draft persistence and submission together.

pub mod approval;
pub mod backend;
pub mod config;
pub mod form;
pub mod memory;
pub mod orchestrator;
pub mod status;

pub use approval::{ApprovalError, ApprovalWorkflow, VoterDetails};
pub use backend::{
    Actor, ApplicationSummary, BackendError, BranchKind, FileUpload, FileUploader,
    SubmissionBackend,
};
pub use config::SubmissionConfig;
pub use form::ApplicationForm;
pub use memory::{MemoryBackend, MemoryUploader, StoredApplication, VoterRecord};
pub use orchestrator::{branch_payloads, identity_profile, Orchestrator, SubmissionError};
pub use status::{ApplicationStatus, StatusParseError, StatusTransition};
