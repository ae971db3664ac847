use serde::{Deserialize, Serialize};
use voterreg_record::ResidencyMinimum;

/// Upload buckets and submission-time policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub id_front_bucket: String,
    pub id_selfie_bucket: String,
    /// Minimum residence enforced at submission; unset accepts any duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residency_minimum: Option<ResidencyMinimum>,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            id_front_bucket: "id-front-photos".to_string(),
            id_selfie_bucket: "id-selfies".to_string(),
            residency_minimum: None,
        }
    }
}
