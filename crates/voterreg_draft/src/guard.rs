//! Mount-time decision between resuming a draft and discarding an already submitted one.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use voterreg_record::ApplicationRecord;

use crate::draft::{DraftError, DraftStore};
use crate::fingerprint::{fingerprint, Fingerprint, FingerprintStore};
use crate::kv::KeyValueStore;

/// What the form should start from.
#[derive(Debug, Clone, PartialEq)]
pub enum MountOutcome {
    /// Nothing saved; start empty.
    NoDraft,
    /// The saved draft matches the last submission. Draft and fingerprint were discarded.
    Stale { fingerprint: Fingerprint },
    /// A draft that was never submitted; continue editing it.
    Resumable {
        record: ApplicationRecord,
        saved_at: Option<DateTime<Utc>>,
    },
    /// The saved draft could not be decoded and was discarded.
    Corrupt { reason: String },
}

impl MountOutcome {
    /// Message to show the applicant, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            MountOutcome::NoDraft => None,
            MountOutcome::Stale { .. } => Some(
                "Your previous application was already submitted. The form has been cleared.",
            ),
            MountOutcome::Resumable { .. } => Some("Your saved draft has been restored."),
            MountOutcome::Corrupt { .. } => {
                Some("Your saved draft could not be read and has been discarded.")
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MountOutcome::NoDraft => "no_draft",
            MountOutcome::Stale { .. } => "stale",
            MountOutcome::Resumable { .. } => "resumable",
            MountOutcome::Corrupt { .. } => "corrupt",
        }
    }

    /// The record the form starts from: the draft when resumable, otherwise empty.
    pub fn into_record(self) -> ApplicationRecord {
        match self {
            MountOutcome::Resumable { record, .. } => record,
            _ => ApplicationRecord::default(),
        }
    }
}

/// Draft slot plus last-submitted fingerprint, sharing one store.
#[derive(Clone)]
pub struct DraftGuard {
    drafts: DraftStore,
    fingerprints: FingerprintStore,
}

impl DraftGuard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            drafts: DraftStore::new(store.clone()),
            fingerprints: FingerprintStore::new(store),
        }
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn fingerprints(&self) -> &FingerprintStore {
        &self.fingerprints
    }

    /// Decide what the form starts from, discarding stale or unreadable drafts.
    pub fn on_mount(&self) -> Result<MountOutcome, DraftError> {
        let stored = match self.drafts.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(MountOutcome::NoDraft),
            Err(DraftError::Corrupt(reason)) => {
                warn!(%reason, "discarding unreadable draft");
                self.drafts.clear()?;
                return Ok(MountOutcome::Corrupt { reason });
            }
            Err(err) => return Err(err),
        };

        let current = fingerprint(&stored.record);
        match self.fingerprints.last_submitted()? {
            Some(last) if last == current => {
                info!(fingerprint = %current, "draft matches last submission; discarding");
                self.drafts.clear()?;
                // A fingerprint left behind only flags the same draft again.
                if let Err(err) = self.fingerprints.forget() {
                    warn!(error = %err, "could not forget last submission fingerprint");
                }
                Ok(MountOutcome::Stale {
                    fingerprint: current,
                })
            }
            _ => {
                info!(fingerprint = %current, "restoring saved draft");
                Ok(MountOutcome::Resumable {
                    record: stored.record,
                    saved_at: stored.saved_at,
                })
            }
        }
    }

    /// Save after an accepted edit. Failures are logged, never returned.
    pub fn autosave(&self, record: &ApplicationRecord) -> bool {
        match self.drafts.save(record) {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "draft autosave failed");
                false
            }
        }
    }

    /// Remember the submitted record's fingerprint, then drop the draft.
    pub fn record_submission(&self, record: &ApplicationRecord) -> Result<Fingerprint, DraftError> {
        let fp = fingerprint(record);
        self.fingerprints.remember(&fp)?;
        self.drafts.clear()?;
        info!(fingerprint = %fp, "recorded submission");
        Ok(fp)
    }

    /// Explicit reset: drop the draft and forget the last submission.
    pub fn reset(&self) -> Result<(), DraftError> {
        self.drafts.clear()?;
        self.fingerprints.forget()?;
        info!("draft reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryKeyValueStore, StoreError};
    use voterreg_record::sample::sample_record;
    use voterreg_record::{ApplicationType, DiscriminantChange};

    fn guard() -> DraftGuard {
        DraftGuard::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[test]
    fn test_empty_store_has_no_draft() {
        let outcome = guard().on_mount().unwrap();
        assert_eq!(outcome, MountOutcome::NoDraft);
        assert_eq!(outcome.notice(), None);
    }

    #[test]
    fn test_unsubmitted_draft_resumes() {
        let guard = guard();
        let record = sample_record(ApplicationType::Transfer);
        assert!(guard.autosave(&record));

        match guard.on_mount().unwrap() {
            MountOutcome::Resumable { record: restored, saved_at } => {
                assert_eq!(restored, record);
                assert!(saved_at.is_some());
            }
            other => panic!("expected resumable draft, got {:?}", other),
        }
    }

    #[test]
    fn test_draft_of_different_type_is_not_stale() {
        let guard = guard();
        let submitted = sample_record(ApplicationType::Register);
        guard.record_submission(&submitted).unwrap();

        let next = voterreg_record::resolve(
            &submitted,
            DiscriminantChange::ApplicationType(Some(ApplicationType::Reinstatement)),
        );
        guard.autosave(&next);
        assert_eq!(guard.on_mount().unwrap().as_str(), "resumable");
    }

    #[test]
    fn test_reset_forgets_last_submission() {
        let guard = guard();
        let record = sample_record(ApplicationType::Reactivation);
        guard.record_submission(&record).unwrap();
        guard.reset().unwrap();

        guard.autosave(&record);
        assert_eq!(guard.on_mount().unwrap().as_str(), "resumable");
    }

    #[test]
    fn test_corrupt_draft_is_discarded() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.put(crate::draft::DRAFT_KEY, "[]]").unwrap();
        let guard = DraftGuard::new(kv.clone());

        let outcome = guard.on_mount().unwrap();
        assert_eq!(outcome.as_str(), "corrupt");
        assert!(outcome.notice().is_some());
        assert_eq!(kv.get(crate::draft::DRAFT_KEY).unwrap(), None);
        assert_eq!(outcome.into_record(), ApplicationRecord::default());
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::LockPoisoned)
        }

        fn remove(&self, _key: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    /// Memory store whose removals of one key fail.
    struct StickyKeyStore {
        inner: MemoryKeyValueStore,
        sticky: &'static str,
    }

    impl KeyValueStore for StickyKeyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.put(key, value)
        }

        fn remove(&self, key: &str) -> Result<bool, StoreError> {
            if key == self.sticky {
                return Err(StoreError::LockPoisoned);
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_stale_draft_cleared_when_fingerprint_cannot_be_forgotten() {
        let kv = Arc::new(StickyKeyStore {
            inner: MemoryKeyValueStore::new(),
            sticky: crate::fingerprint::FINGERPRINT_KEY,
        });
        let guard = DraftGuard::new(kv.clone());
        let record = sample_record(ApplicationType::Transfer);
        guard.record_submission(&record).unwrap();
        guard.autosave(&record);

        let outcome = guard.on_mount().unwrap();
        assert_eq!(outcome.as_str(), "stale");
        assert_eq!(kv.get(crate::draft::DRAFT_KEY).unwrap(), None);
        assert_eq!(guard.on_mount().unwrap(), MountOutcome::NoDraft);

        // The same draft coming back is still caught.
        guard.autosave(&record);
        assert_eq!(guard.on_mount().unwrap().as_str(), "stale");
    }

    #[test]
    fn test_autosave_failure_is_swallowed() {
        let guard = DraftGuard::new(Arc::new(FailingStore));
        assert!(!guard.autosave(&sample_record(ApplicationType::Register)));
    }
}
