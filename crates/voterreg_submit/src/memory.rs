//! In-process backend and uploader.
//!
//! Used by the CLI's offline mode and by tests. Every call can be made to fail
//! so the orchestrator's partial-failure and rollback paths can be driven.

use async_trait::async_trait;
use chrono::Datelike;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;
use voterreg_ids::{ActorId, ApplicationNumber, IdentityId};
use voterreg_record::{ApplicationRecord, ApplicationType};

use crate::backend::{
    Actor, ApplicationSummary, BackendError, BranchKind, FileUpload, FileUploader,
    SubmissionBackend,
};
use crate::status::{ApplicationStatus, StatusTransition};

const APPLICATION_PREFIX: &str = "VR";

#[derive(Debug, Clone)]
pub struct StoredApplication {
    pub summary: ApplicationSummary,
    pub submitted_by: ActorId,
    pub history: Vec<StatusTransition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterRecord {
    pub identity: IdentityId,
    pub precinct_number: String,
    pub voter_id: String,
}

#[derive(Default)]
struct State {
    identities: HashMap<ActorId, (IdentityId, Value)>,
    applications: HashMap<ApplicationNumber, StoredApplication>,
    branch_records: Vec<(ApplicationNumber, BranchKind, Value)>,
    voter_records: Vec<VoterRecord>,
    next_seq: u64,
}

#[derive(Default)]
struct Failures {
    unavailable: bool,
    create_application: bool,
    voter_record: bool,
    branches: HashSet<BranchKind>,
    status_changes: HashSet<ApplicationStatus>,
}

/// Backend holding everything in memory.
pub struct MemoryBackend {
    year: i32,
    state: Mutex<State>,
    failures: Mutex<Failures>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            year: chrono::Utc::now().year(),
            state: Mutex::new(State::default()),
            failures: Mutex::new(Failures::default()),
        }
    }

    /// Year used in minted application numbers.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Fail every call, as if the backend could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.failures.lock().await.unavailable = unavailable;
    }

    pub async fn fail_create_application(&self, fail: bool) {
        self.failures.lock().await.create_application = fail;
    }

    pub async fn fail_branch(&self, branch: BranchKind) {
        self.failures.lock().await.branches.insert(branch);
    }

    pub async fn clear_branch_failure(&self, branch: BranchKind) {
        self.failures.lock().await.branches.remove(&branch);
    }

    pub async fn fail_voter_record(&self, fail: bool) {
        self.failures.lock().await.voter_record = fail;
    }

    /// Reject status changes to `status`.
    pub async fn fail_status_change_to(&self, status: ApplicationStatus) {
        self.failures.lock().await.status_changes.insert(status);
    }

    /// Link an identity to `actor` without going through a submission.
    pub async fn seed_identity(&self, actor: &ActorId) -> IdentityId {
        let identity = IdentityId::new();
        self.state
            .lock()
            .await
            .identities
            .insert(actor.clone(), (identity.clone(), Value::Null));
        identity
    }

    /// Link an identity to `actor` that already filed a register application.
    pub async fn seed_registration(&self, actor: &ActorId) -> (IdentityId, ApplicationNumber) {
        let identity = self.seed_identity(actor).await;
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let number = ApplicationNumber::sequential(APPLICATION_PREFIX, self.year, state.next_seq);
        state.applications.insert(
            number.clone(),
            StoredApplication {
                summary: ApplicationSummary {
                    application_number: number.clone(),
                    application_type: ApplicationType::Register,
                    identity_id: identity.clone(),
                    status: ApplicationStatus::Pending,
                },
                submitted_by: actor.clone(),
                history: Vec::new(),
            },
        );
        (identity, number)
    }

    pub async fn identity_count(&self) -> usize {
        self.state.lock().await.identities.len()
    }

    pub async fn identity_profile(&self, actor: &ActorId) -> Option<Value> {
        self.state
            .lock()
            .await
            .identities
            .get(actor)
            .map(|(_, profile)| profile.clone())
    }

    pub async fn stored_application(
        &self,
        number: &ApplicationNumber,
    ) -> Option<StoredApplication> {
        self.state.lock().await.applications.get(number).cloned()
    }

    pub async fn application_count(&self) -> usize {
        self.state.lock().await.applications.len()
    }

    /// Branch records written for `number`, in write order.
    pub async fn branch_records(&self, number: &ApplicationNumber) -> Vec<(BranchKind, Value)> {
        self.state
            .lock()
            .await
            .branch_records
            .iter()
            .filter(|(n, _, _)| n == number)
            .map(|(_, kind, payload)| (*kind, payload.clone()))
            .collect()
    }

    pub async fn voter_records(&self) -> Vec<VoterRecord> {
        self.state.lock().await.voter_records.clone()
    }

    async fn check_available(&self) -> Result<(), BackendError> {
        if self.failures.lock().await.unavailable {
            Err(BackendError::new("backend unavailable"))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionBackend for MemoryBackend {
    async fn find_identity(&self, actor: &ActorId) -> Result<Option<IdentityId>, BackendError> {
        self.check_available().await?;
        Ok(self
            .state
            .lock()
            .await
            .identities
            .get(actor)
            .map(|(id, _)| id.clone()))
    }

    async fn has_registration(&self, identity: &IdentityId) -> Result<bool, BackendError> {
        self.check_available().await?;
        Ok(self.state.lock().await.applications.values().any(|stored| {
            stored.summary.identity_id == *identity
                && stored.summary.application_type == ApplicationType::Register
        }))
    }

    async fn create_identity(
        &self,
        actor: &ActorId,
        profile: Value,
    ) -> Result<IdentityId, BackendError> {
        self.check_available().await?;
        let mut state = self.state.lock().await;
        if state.identities.contains_key(actor) {
            return Err(BackendError::new(format!(
                "identity already exists for {}",
                actor
            )));
        }
        let identity = IdentityId::new();
        state
            .identities
            .insert(actor.clone(), (identity.clone(), profile));
        Ok(identity)
    }

    async fn create_application(
        &self,
        record: &ApplicationRecord,
        identity: &IdentityId,
        actor: &Actor,
    ) -> Result<ApplicationNumber, BackendError> {
        self.check_available().await?;
        if self.failures.lock().await.create_application {
            return Err(BackendError::new("application insert rejected"));
        }
        let application_type: ApplicationType = record
            .application_type()
            .ok_or_else(|| BackendError::new("application type is required"))?;

        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let number = ApplicationNumber::sequential(APPLICATION_PREFIX, self.year, state.next_seq);
        state.applications.insert(
            number.clone(),
            StoredApplication {
                summary: ApplicationSummary {
                    application_number: number.clone(),
                    application_type,
                    identity_id: identity.clone(),
                    status: ApplicationStatus::Pending,
                },
                submitted_by: actor.id.clone(),
                history: Vec::new(),
            },
        );
        Ok(number)
    }

    async fn create_branch_record(
        &self,
        branch: BranchKind,
        application_number: &ApplicationNumber,
        payload: Value,
    ) -> Result<(), BackendError> {
        self.check_available().await?;
        if self.failures.lock().await.branches.contains(&branch) {
            return Err(BackendError::new(format!("{} insert rejected", branch)));
        }
        let mut state = self.state.lock().await;
        if !state.applications.contains_key(application_number) {
            return Err(BackendError::new(format!(
                "unknown application {}",
                application_number
            )));
        }
        state
            .branch_records
            .push((application_number.clone(), branch, payload));
        Ok(())
    }

    async fn application(
        &self,
        application_number: &ApplicationNumber,
    ) -> Result<Option<ApplicationSummary>, BackendError> {
        self.check_available().await?;
        Ok(self
            .state
            .lock()
            .await
            .applications
            .get(application_number)
            .map(|stored| stored.summary.clone()))
    }

    async fn set_application_status(
        &self,
        application_number: &ApplicationNumber,
        status: ApplicationStatus,
        reason: Option<&str>,
    ) -> Result<(), BackendError> {
        self.check_available().await?;
        if self.failures.lock().await.status_changes.contains(&status) {
            return Err(BackendError::new(format!("status update to {} rejected", status)));
        }
        let mut state = self.state.lock().await;
        let stored = state
            .applications
            .get_mut(application_number)
            .ok_or_else(|| BackendError::new(format!("unknown application {}", application_number)))?;

        let mut transition = StatusTransition::new(stored.summary.status, status);
        if let Some(reason) = reason {
            transition = transition.with_reason(reason);
        }
        stored.history.push(transition);
        stored.summary.status = status;
        Ok(())
    }

    async fn create_voter_record(
        &self,
        identity: &IdentityId,
        precinct_number: &str,
        voter_id: &str,
    ) -> Result<(), BackendError> {
        self.check_available().await?;
        if self.failures.lock().await.voter_record {
            return Err(BackendError::new("voter record insert rejected"));
        }
        let mut state = self.state.lock().await;
        if state.voter_records.iter().any(|r| r.voter_id == voter_id) {
            return Err(BackendError::new(format!("voter ID {} already issued", voter_id)));
        }
        state.voter_records.push(VoterRecord {
            identity: identity.clone(),
            precinct_number: precinct_number.to_string(),
            voter_id: voter_id.to_string(),
        });
        Ok(())
    }
}

/// Uploader that keeps files in memory and returns `memory://` URLs.
pub struct MemoryUploader {
    fail: AtomicBool,
    upload_count: AtomicU32,
    files: Mutex<Vec<(String, FileUpload)>>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            upload_count: AtomicU32::new(0),
            files: Mutex::new(Vec::new()),
        }
    }

    pub fn with_failure(self, fail: bool) -> Self {
        self.fail.store(fail, Ordering::SeqCst);
        self
    }

    pub fn set_failure(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn upload_count(&self) -> u32 {
        self.upload_count.load(Ordering::SeqCst)
    }

    /// Stored files as `(bucket, file)` pairs.
    pub async fn files(&self) -> Vec<(String, FileUpload)> {
        self.files.lock().await.clone()
    }
}

impl Default for MemoryUploader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileUploader for MemoryUploader {
    async fn upload(&self, file: FileUpload, bucket: &str) -> Result<String, BackendError> {
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackendError::new(format!("upload to {} failed", bucket)));
        }
        let mut files = self.files.lock().await;
        let url = format!("memory://{}/{}/{}", bucket, files.len() + 1, file.file_name);
        files.push((bucket.to_string(), file));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voterreg_record::sample::sample_record;

    #[tokio::test]
    async fn test_numbers_are_sequential() {
        let backend = MemoryBackend::new().with_year(2026);
        let actor = Actor::new(ActorId::new());
        let identity = backend.seed_identity(&actor.id).await;
        let record = sample_record(ApplicationType::Transfer);

        let first = backend.create_application(&record, &identity, &actor).await.unwrap();
        let second = backend.create_application(&record, &identity, &actor).await.unwrap();
        assert_eq!(first.as_str(), "VR-2026-000001");
        assert_eq!(second.as_str(), "VR-2026-000002");
    }

    #[tokio::test]
    async fn test_status_changes_are_recorded() {
        let backend = MemoryBackend::new();
        let actor = Actor::new(ActorId::new());
        let identity = backend.seed_identity(&actor.id).await;
        let number = backend
            .create_application(&sample_record(ApplicationType::Reactivation), &identity, &actor)
            .await
            .unwrap();

        backend
            .set_application_status(&number, ApplicationStatus::Verified, Some("ok"))
            .await
            .unwrap();
        let stored = backend.stored_application(&number).await.unwrap();
        assert_eq!(stored.summary.status, ApplicationStatus::Verified);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].reason.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_registration_is_tracked_per_identity() {
        let backend = MemoryBackend::new();
        let actor = Actor::new(ActorId::new());
        let identity = backend.seed_identity(&actor.id).await;
        assert!(!backend.has_registration(&identity).await.unwrap());

        backend
            .create_application(&sample_record(ApplicationType::Transfer), &identity, &actor)
            .await
            .unwrap();
        assert!(!backend.has_registration(&identity).await.unwrap());

        let other = ActorId::new();
        let (registered, _) = backend.seed_registration(&other).await;
        assert!(backend.has_registration(&registered).await.unwrap());
        assert!(!backend.has_registration(&identity).await.unwrap());
    }

    #[tokio::test]
    async fn test_uploader_failure() {
        let uploader = MemoryUploader::new().with_failure(true);
        let file = FileUpload {
            file_name: "front.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(uploader.upload(file, "bucket").await.is_err());
        assert_eq!(uploader.upload_count(), 1);
        assert!(uploader.files().await.is_empty());
    }
}
