//! Identity fingerprint of a draft, and the slot remembering the last submitted one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use voterreg_record::ApplicationRecord;

use crate::kv::{KeyValueStore, StoreError};

/// Key holding the fingerprint of the last successful submission.
pub const FINGERPRINT_KEY: &str = "last_submitted_fingerprint";

const SEPARATOR: &str = "\u{1f}";

/// 16 hex chars of blake3 over the identity-defining fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn folded(value: Option<&String>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}

/// Fingerprint over first name, last name, date of birth and application type.
///
/// Everything else can be edited freely without changing the fingerprint.
pub fn fingerprint(record: &ApplicationRecord) -> Fingerprint {
    let identity = &record.identity;
    let parts = [
        folded(identity.first_name.as_ref()),
        folded(identity.last_name.as_ref()),
        identity
            .date_of_birth
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        record
            .application_type()
            .map_or("unselected", |kind| kind.as_str())
            .to_string(),
    ];
    let hash = blake3::hash(parts.join(SEPARATOR).as_bytes());
    Fingerprint(hash.to_hex()[..16].to_string())
}

/// Persistence for the last submitted fingerprint.
#[derive(Clone)]
pub struct FingerprintStore {
    store: Arc<dyn KeyValueStore>,
}

impl FingerprintStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn last_submitted(&self) -> Result<Option<Fingerprint>, StoreError> {
        Ok(self
            .store
            .get(FINGERPRINT_KEY)?
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(Fingerprint))
    }

    pub fn remember(&self, fingerprint: &Fingerprint) -> Result<(), StoreError> {
        self.store.put(FINGERPRINT_KEY, fingerprint.as_str())
    }

    pub fn forget(&self) -> Result<bool, StoreError> {
        self.store.remove(FINGERPRINT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use voterreg_record::sample::sample_record;
    use voterreg_record::ApplicationType;

    #[test]
    fn test_fingerprint_is_sixteen_hex_chars() {
        let fp = fingerprint(&sample_record(ApplicationType::Register));
        assert_eq!(fp.as_str().len(), 16);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_ignores_case_whitespace_and_other_fields() {
        let record = sample_record(ApplicationType::Register);
        let mut edited = record.clone();
        edited.identity.first_name = Some("  JUAN ".into());
        edited.contact.email_address = Some("other@example.ph".into());
        edited.identity.middle_name = None;
        assert_eq!(fingerprint(&record), fingerprint(&edited));
    }

    #[test]
    fn test_unselected_type_differs_from_every_type() {
        let mut record = sample_record(ApplicationType::Register);
        let register = fingerprint(&record);
        record.application = None;
        assert_ne!(fingerprint(&record), register);
    }

    #[test]
    fn test_store_remember_and_forget() {
        let fingerprints = FingerprintStore::new(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(fingerprints.last_submitted().unwrap(), None);

        let fp = fingerprint(&sample_record(ApplicationType::Transfer));
        fingerprints.remember(&fp).unwrap();
        assert_eq!(fingerprints.last_submitted().unwrap(), Some(fp));
        assert!(fingerprints.forget().unwrap());
        assert_eq!(fingerprints.last_submitted().unwrap(), None);
    }
}
