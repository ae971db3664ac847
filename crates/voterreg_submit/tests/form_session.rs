//! Applicant session: edits, autosave, submission and remount.

use std::sync::Arc;
use tempfile::TempDir;
use voterreg_draft::{DraftGuard, FileKeyValueStore, MountOutcome};
use voterreg_ids::ActorId;
use voterreg_record::sample::{sample_record, sample_today};
use voterreg_record::{ApplicationRecord, ApplicationType, DiscriminantChange, TransferType};
use voterreg_submit::{
    Actor, ApplicationForm, BranchKind, MemoryBackend, MemoryUploader, Orchestrator,
    SubmissionConfig, SubmissionError,
};

fn guard(dir: &TempDir) -> DraftGuard {
    DraftGuard::new(Arc::new(FileKeyValueStore::open(dir.path()).unwrap()))
}

fn orchestrator(backend: Arc<MemoryBackend>) -> Orchestrator<MemoryBackend, MemoryUploader> {
    Orchestrator::new(
        backend,
        Arc::new(MemoryUploader::new()),
        SubmissionConfig::default(),
    )
    .with_today(sample_today())
}

#[test]
fn test_changes_are_autosaved_and_resumed() {
    let dir = TempDir::new().unwrap();
    let (mut form, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome, MountOutcome::NoDraft);

    form.change(DiscriminantChange::ApplicationType(Some(ApplicationType::Transfer)));
    form.change(DiscriminantChange::TransferType(Some(TransferType::WithinCity)));
    form.edit(|record| record.identity.first_name = Some("Ana".to_string()));

    let (resumed, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome.as_str(), "resumable");
    assert_eq!(resumed.record(), form.record());
}

#[test]
fn test_noop_change_does_not_save() {
    let dir = TempDir::new().unwrap();
    let (mut form, _) = ApplicationForm::mount(guard(&dir)).unwrap();

    // No transfer branch: the resolver leaves the record untouched.
    form.change(DiscriminantChange::TransferType(Some(TransferType::WithinCity)));
    assert!(form.guard().drafts().load().unwrap().is_none());
}

#[tokio::test]
async fn test_submit_retires_draft() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MemoryBackend::new());
    let (mut form, _) = ApplicationForm::mount(guard(&dir)).unwrap();
    form.edit(|record| *record = sample_record(ApplicationType::Reinstatement));
    let submitted = form.record().clone();

    form.submit(&orchestrator(backend.clone()), &Actor::new(ActorId::new()))
        .await
        .unwrap();
    assert_eq!(*form.record(), ApplicationRecord::default());
    assert_eq!(backend.application_count().await, 1);

    let (_, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome, MountOutcome::NoDraft);

    // A copy of the submitted draft reappearing is recognised as stale.
    form.guard().drafts().save(&submitted).unwrap();
    let (remounted, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome.as_str(), "stale");
    assert_eq!(*remounted.record(), ApplicationRecord::default());
}

#[tokio::test]
async fn test_failed_submit_keeps_record_and_draft() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MemoryBackend::new());
    backend.set_unavailable(true).await;
    let (mut form, _) = ApplicationForm::mount(guard(&dir)).unwrap();
    form.edit(|record| *record = sample_record(ApplicationType::Reactivation));

    let err = form
        .submit(&orchestrator(backend), &Actor::new(ActorId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::BackendUnavailable(_)));
    assert_eq!(*form.record(), sample_record(ApplicationType::Reactivation));

    let (resumed, _) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(*resumed.record(), sample_record(ApplicationType::Reactivation));
}

#[tokio::test]
async fn test_partial_submit_keeps_draft_until_branches_finish() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MemoryBackend::new());
    backend.fail_branch(BranchKind::Address).await;
    let orchestrator = orchestrator(backend.clone());
    let actor = Actor::new(ActorId::new());
    let (mut form, _) = ApplicationForm::mount(guard(&dir)).unwrap();
    form.edit(|record| *record = sample_record(ApplicationType::Transfer));

    let err = form.submit(&orchestrator, &actor).await.unwrap_err();
    let SubmissionError::PartialSubmissionFailure {
        application_number,
        remaining,
        ..
    } = err
    else {
        panic!("expected a partial failure");
    };
    assert_eq!(*form.record(), sample_record(ApplicationType::Transfer));
    let (_, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome.as_str(), "resumable");

    backend.clear_branch_failure(BranchKind::Address).await;
    form.retry_branches(&orchestrator, &application_number, remaining)
        .await
        .unwrap();
    assert_eq!(*form.record(), ApplicationRecord::default());
    assert_eq!(backend.application_count().await, 1);
    let (_, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome, MountOutcome::NoDraft);
}

#[test]
fn test_reset_clears_everything() {
    let dir = TempDir::new().unwrap();
    let (mut form, _) = ApplicationForm::mount(guard(&dir)).unwrap();
    form.edit(|record| *record = sample_record(ApplicationType::Transfer));

    form.reset().unwrap();
    assert_eq!(*form.record(), ApplicationRecord::default());
    let (_, outcome) = ApplicationForm::mount(guard(&dir)).unwrap();
    assert_eq!(outcome, MountOutcome::NoDraft);
}
