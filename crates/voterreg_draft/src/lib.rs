//! Draft persistence for the application form.
//!
//! The draft slot and the last-submitted fingerprint live side by side in one
//! [`KeyValueStore`]. [`DraftGuard`] ties them together: it decides on mount
//! whether a saved draft is resumed or was already submitted, autosaves after
//! edits, and records successful submissions.

pub mod draft;
pub mod fingerprint;
pub mod guard;
pub mod kv;

pub use draft::{decode_draft, DraftError, DraftStore, StoredDraft, DRAFT_KEY};
pub use fingerprint::{fingerprint, Fingerprint, FingerprintStore, FINGERPRINT_KEY};
pub use guard::{DraftGuard, MountOutcome};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StoreError};
