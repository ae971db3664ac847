//! The in-progress application, persisted after every accepted edit.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use voterreg_record::ApplicationRecord;

use crate::kv::{KeyValueStore, StoreError};

/// Key holding the serialized draft.
pub const DRAFT_KEY: &str = "application_draft";

#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("saved draft is unreadable: {0}")]
    Corrupt(String),

    #[error("failed to encode draft: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A draft read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDraft {
    /// `None` for drafts written as a bare record, without the envelope.
    pub saved_at: Option<DateTime<Utc>>,
    pub record: ApplicationRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftDocument<'a> {
    saved_at: DateTime<Utc>,
    record: &'a ApplicationRecord,
}

/// Single-slot draft persistence on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the slot with `record`, stamped now.
    pub fn save(&self, record: &ApplicationRecord) -> Result<DateTime<Utc>, DraftError> {
        let saved_at = Utc::now();
        self.save_at(record, saved_at)?;
        Ok(saved_at)
    }

    pub fn save_at(
        &self,
        record: &ApplicationRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), DraftError> {
        let json = serde_json::to_string(&DraftDocument { saved_at, record })?;
        self.store.put(DRAFT_KEY, &json)?;
        debug!(application_type = ?record.application_type(), "saved draft");
        Ok(())
    }

    pub fn load(&self) -> Result<Option<StoredDraft>, DraftError> {
        match self.store.get(DRAFT_KEY)? {
            None => Ok(None),
            Some(raw) => decode_draft(&raw).map(Some),
        }
    }

    /// Remove the draft. Returns whether one was stored.
    pub fn clear(&self) -> Result<bool, DraftError> {
        Ok(self.store.remove(DRAFT_KEY)?)
    }
}

/// Decode a draft document or a bare record, normalizing timestamp-shaped dates.
pub fn decode_draft(raw: &str) -> Result<StoredDraft, DraftError> {
    let mut document: Value =
        serde_json::from_str(raw).map_err(|e| DraftError::Corrupt(e.to_string()))?;

    let (saved_at, mut record) = if document.get("record").is_some() {
        let saved_at = document
            .get("savedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc));
        (saved_at, document["record"].take())
    } else {
        (None, document)
    };

    normalize_dates(&mut record);
    let record: ApplicationRecord =
        serde_json::from_value(record).map_err(|e| DraftError::Corrupt(e.to_string()))?;
    Ok(StoredDraft { saved_at, record })
}

/// Rewrite timestamp-shaped date fields to `YYYY-MM-DD`.
fn normalize_dates(record: &mut Value) {
    let paths: [&[&str]; 2] = [
        &["identity", "dateOfBirth"],
        &["citizenship", "naturalizationDate"],
    ];
    for path in paths {
        if let Some(slot) = pointer_mut(record, path) {
            if let Some(date) = slot.as_str().and_then(normalize_date) {
                *slot = Value::String(date);
            }
        }
    }
}

fn pointer_mut<'a>(value: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    path.iter().try_fold(value, |node, key| node.get_mut(*key))
}

/// Calendar date of a stored timestamp, as the applicant's clock showed it.
///
/// Plain dates and anything unparseable come back as `None` and are left alone.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
        return None;
    }
    let date = if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        ts.with_timezone(&Local).date_naive()
    } else if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        ts.date()
    } else {
        return None;
    };
    Some(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKeyValueStore;
    use voterreg_record::sample::sample_record;
    use voterreg_record::ApplicationType;

    fn store() -> (Arc<MemoryKeyValueStore>, DraftStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let drafts = DraftStore::new(kv.clone());
        (kv, drafts)
    }

    #[test]
    fn test_save_load_clear() {
        let (_, drafts) = store();
        assert!(drafts.load().unwrap().is_none());

        let record = sample_record(ApplicationType::Reactivation);
        let saved_at = drafts.save(&record).unwrap();
        let loaded = drafts.load().unwrap().unwrap();
        assert_eq!(loaded.record, record);
        assert_eq!(loaded.saved_at, Some(saved_at));

        assert!(drafts.clear().unwrap());
        assert!(drafts.load().unwrap().is_none());
    }

    #[test]
    fn test_document_shape() {
        let (kv, drafts) = store();
        drafts
            .save(&sample_record(ApplicationType::Reinstatement))
            .unwrap();
        let raw = kv.get(DRAFT_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert!(value["savedAt"].is_string());
        assert_eq!(
            value["record"]["application"]["applicationType"],
            "reinstatement"
        );
    }

    #[test]
    fn test_timestamp_dates_are_normalized() {
        let (kv, drafts) = store();
        let raw = serde_json::json!({
            "savedAt": "2026-01-02T03:04:05Z",
            "record": {
                "identity": { "firstName": "Ana", "dateOfBirth": "1990-01-15T12:00:00Z" },
                "citizenship": {
                    "citizenshipType": "Naturalized",
                    "naturalizationDate": "2012-06-12T12:00:00.000"
                }
            }
        });
        kv.put(DRAFT_KEY, &raw.to_string()).unwrap();

        let loaded = drafts.load().unwrap().unwrap();
        assert_eq!(
            loaded.record.identity.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 1, 15)
        );
        let details = loaded.record.citizenship.unwrap();
        assert_eq!(
            details.naturalization().unwrap().naturalization_date,
            NaiveDate::from_ymd_opt(2012, 6, 12)
        );
    }

    #[test]
    fn test_bare_record_is_accepted() {
        let (kv, drafts) = store();
        kv.put(DRAFT_KEY, r#"{"identity":{"firstName":"Ana"}}"#)
            .unwrap();
        let loaded = drafts.load().unwrap().unwrap();
        assert_eq!(loaded.saved_at, None);
        assert_eq!(loaded.record.identity.first_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_undecodable_draft_is_corrupt() {
        let (kv, drafts) = store();
        kv.put(DRAFT_KEY, "{not json").unwrap();
        assert!(matches!(drafts.load(), Err(DraftError::Corrupt(_))));

        kv.put(
            DRAFT_KEY,
            r#"{"record":{"application":{"applicationType":"emigrate"}}}"#,
        )
        .unwrap();
        assert!(matches!(drafts.load(), Err(DraftError::Corrupt(_))));
    }

    #[test]
    fn test_normalize_date_leaves_plain_dates() {
        assert_eq!(normalize_date("1990-01-15"), None);
        assert_eq!(normalize_date("someday"), None);
        assert_eq!(
            normalize_date("1990-01-15T08:30:00").as_deref(),
            Some("1990-01-15")
        );
    }
}
