//! The application record backing the portal form.
//!
//! The record is a tagged union: always-present groups live on
//! [`ApplicationRecord`], and every discriminant-dependent group lives inside
//! the variant that owns it. A field of an inactive branch therefore cannot be
//! represented at all, which is what the draft fingerprint and the backend
//! writes rely on.
//!
//! Text fields are `Option<String>` because the record also models an
//! in-progress draft; `None` and a blank string both mean "not filled".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::choices::{
    ApplicationType, CitizenshipType, CivilStatus, DeactivationReason, RegistrationType,
    RegularRegistrationType, RegularVoterStatus, ReinstatementType, Sex, TransferType,
};

// ============================================================================
// Root record
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub identity: Identity,
    pub citizenship: Option<Citizenship>,
    pub contact: Contact,
    pub civil: Option<Civil>,
    pub parents: Parents,
    pub sector: SpecialSector,
    /// Generic legal declaration, required for every application type.
    pub declaration_accepted: bool,
    pub application: Option<ApplicationBranch>,
}

impl ApplicationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn application_type(&self) -> Option<ApplicationType> {
        self.application.as_ref().map(ApplicationBranch::kind)
    }

    pub fn citizenship_type(&self) -> Option<CitizenshipType> {
        self.citizenship.as_ref().map(Citizenship::kind)
    }

    pub fn civil_status(&self) -> Option<CivilStatus> {
        self.civil.as_ref().map(Civil::kind)
    }

    pub fn address(&self) -> Option<&Address> {
        self.application.as_ref().and_then(ApplicationBranch::address)
    }

    pub fn address_mut(&mut self) -> Option<&mut Address> {
        self.application
            .as_mut()
            .and_then(ApplicationBranch::address_mut)
    }
}

// ============================================================================
// Always-present groups
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Identity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub suffix: Option<String>,
    pub sex: Option<Sex>,
    pub date_of_birth: Option<NaiveDate>,
    pub place_of_birth_municipality: Option<String>,
    pub place_of_birth_province: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "citizenshipType")]
pub enum Citizenship {
    ByBirth,
    Naturalized(Naturalization),
    Reacquired(Naturalization),
}

impl Citizenship {
    pub fn kind(&self) -> CitizenshipType {
        match self {
            Citizenship::ByBirth => CitizenshipType::ByBirth,
            Citizenship::Naturalized(_) => CitizenshipType::Naturalized,
            Citizenship::Reacquired(_) => CitizenshipType::Reacquired,
        }
    }

    pub fn naturalization(&self) -> Option<&Naturalization> {
        match self {
            Citizenship::ByBirth => None,
            Citizenship::Naturalized(details) | Citizenship::Reacquired(details) => Some(details),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Naturalization {
    pub naturalization_date: Option<NaiveDate>,
    pub naturalization_cert_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub contact_number: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "civilStatus")]
pub enum Civil {
    Single,
    Married(Spouse),
    Widowed,
    LegallySeparated,
}

impl Civil {
    pub fn kind(&self) -> CivilStatus {
        match self {
            Civil::Single => CivilStatus::Single,
            Civil::Married(_) => CivilStatus::Married,
            Civil::Widowed => CivilStatus::Widowed,
            Civil::LegallySeparated => CivilStatus::LegallySeparated,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spouse {
    pub spouse_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parents {
    pub father_first_name: Option<String>,
    pub father_last_name: Option<String>,
    pub mother_first_name: Option<String>,
    pub mother_last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecialSector {
    pub is_illiterate: bool,
    pub is_senior_citizen: bool,
    /// `Some` when the applicant declares membership in an indigenous people.
    pub indigenous_person: Option<IndigenousPerson>,
    /// `Some` when the applicant declares a disability.
    pub disability: Option<Disability>,
    pub assistor_name: Option<String>,
    pub assistor_relationship: Option<String>,
    pub vote_on_ground_floor: bool,
}

impl SpecialSector {
    pub fn is_indigenous_person(&self) -> bool {
        self.indigenous_person.is_some()
    }

    pub fn is_pwd(&self) -> bool {
        self.disability.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndigenousPerson {
    pub tribe: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Disability {
    pub disability_type: Option<String>,
}

// ============================================================================
// Address
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub house_number: Option<String>,
    pub street: Option<String>,
    pub barangay: Option<String>,
    pub city_municipality: Option<String>,
    pub province: Option<String>,
    pub at_address: ResidencyPeriod,
    pub in_municipality: ResidencyPeriod,
    pub in_country: ResidencyPeriod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidencyPeriod {
    pub years: Option<u32>,
    pub months: Option<u32>,
}

impl ResidencyPeriod {
    pub fn new(years: u32, months: u32) -> Self {
        Self {
            years: Some(years),
            months: Some(months),
        }
    }

    /// Total length in months, when both parts are filled.
    pub fn total_months(&self) -> Option<u32> {
        match (self.years, self.months) {
            (Some(years), Some(months)) => Some(years.saturating_mul(12).saturating_add(months)),
            _ => None,
        }
    }
}

// ============================================================================
// Application branches
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "applicationType", rename_all = "snake_case")]
pub enum ApplicationBranch {
    Register(Registration),
    Transfer(Transfer),
    Reactivation(Reactivation),
    TransferWithReactivation(TransferWithReactivation),
    CorrectionOfEntry(Correction),
    Reinstatement(Reinstatement),
}

impl ApplicationBranch {
    /// A branch of the given kind with nothing filled in.
    pub fn empty(kind: ApplicationType) -> Self {
        match kind {
            ApplicationType::Register => ApplicationBranch::Register(Registration::default()),
            ApplicationType::Transfer => ApplicationBranch::Transfer(Transfer::default()),
            ApplicationType::Reactivation => {
                ApplicationBranch::Reactivation(Reactivation::default())
            }
            ApplicationType::TransferWithReactivation => {
                ApplicationBranch::TransferWithReactivation(TransferWithReactivation::default())
            }
            ApplicationType::CorrectionOfEntry => {
                ApplicationBranch::CorrectionOfEntry(Correction::default())
            }
            ApplicationType::Reinstatement => {
                ApplicationBranch::Reinstatement(Reinstatement::default())
            }
        }
    }

    pub fn kind(&self) -> ApplicationType {
        match self {
            ApplicationBranch::Register(_) => ApplicationType::Register,
            ApplicationBranch::Transfer(_) => ApplicationType::Transfer,
            ApplicationBranch::Reactivation(_) => ApplicationType::Reactivation,
            ApplicationBranch::TransferWithReactivation(_) => {
                ApplicationType::TransferWithReactivation
            }
            ApplicationBranch::CorrectionOfEntry(_) => ApplicationType::CorrectionOfEntry,
            ApplicationBranch::Reinstatement(_) => ApplicationType::Reinstatement,
        }
    }

    pub fn address(&self) -> Option<&Address> {
        match self {
            ApplicationBranch::Register(r) => Some(&r.address),
            ApplicationBranch::Transfer(t) => Some(&t.address),
            ApplicationBranch::TransferWithReactivation(t) => Some(&t.address),
            _ => None,
        }
    }

    pub fn address_mut(&mut self) -> Option<&mut Address> {
        match self {
            ApplicationBranch::Register(r) => Some(&mut r.address),
            ApplicationBranch::Transfer(t) => Some(&mut t.address),
            ApplicationBranch::TransferWithReactivation(t) => Some(&mut t.address),
            _ => None,
        }
    }

    /// Transfer origin slot, for the two branches that carry one.
    pub fn origin_slot(&mut self) -> Option<&mut Option<TransferOrigin>> {
        match self {
            ApplicationBranch::Transfer(t) => Some(&mut t.origin),
            ApplicationBranch::TransferWithReactivation(t) => Some(&mut t.origin),
            _ => None,
        }
    }

    pub fn origin(&self) -> Option<&TransferOrigin> {
        match self {
            ApplicationBranch::Transfer(t) => t.origin.as_ref(),
            ApplicationBranch::TransferWithReactivation(t) => t.origin.as_ref(),
            _ => None,
        }
    }

    pub fn reason_for_deactivation(&self) -> Option<DeactivationReason> {
        match self {
            ApplicationBranch::Reactivation(r) => r.reason_for_deactivation,
            ApplicationBranch::TransferWithReactivation(t) => t.reason_for_deactivation,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Registration {
    pub address: Address,
    pub track: Option<RegistrationTrack>,
    pub id_front_photo: Option<Attachment>,
    pub id_selfie_url: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "registrationType")]
pub enum RegistrationTrack {
    Regular(RegularTrack),
    Katipunan(KatipunanTrack),
}

impl RegistrationTrack {
    pub fn empty(kind: RegistrationType) -> Self {
        match kind {
            RegistrationType::Regular => RegistrationTrack::Regular(RegularTrack::default()),
            RegistrationType::Katipunan => RegistrationTrack::Katipunan(KatipunanTrack::default()),
        }
    }

    pub fn kind(&self) -> RegistrationType {
        match self {
            RegistrationTrack::Regular(_) => RegistrationType::Regular,
            RegistrationTrack::Katipunan(_) => RegistrationType::Katipunan,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegularTrack {
    pub regular_oath_accepted: bool,
    pub regular_registration_type: Option<RegularRegistrationType>,
    pub regular_voter_status: Option<RegularVoterStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KatipunanTrack {
    pub oath_accepted: bool,
    /// Tri-state: `None` until the applicant explicitly answers yes or no.
    pub adult_registration_consent: Option<bool>,
}

/// An uploaded or to-be-uploaded identity document image.
///
/// `bytes` only exists in memory between picking the file and uploading it;
/// drafts persist the name, type and, once uploaded, the public URL.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub public_url: Option<String>,
}

impl Attachment {
    pub fn pending(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
            public_url: None,
        }
    }

    pub fn uploaded(file_name: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: String::new(),
            bytes: Vec::new(),
            public_url: Some(public_url.into()),
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.public_url
            .as_deref()
            .map_or(false, |url| !url.trim().is_empty())
    }

    /// Either uploaded already or holding file contents ready to upload.
    pub fn is_present(&self) -> bool {
        self.is_uploaded() || !self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .field("public_url", &self.public_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transfer {
    pub address: Address,
    pub origin: Option<TransferOrigin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "transferType")]
pub enum TransferOrigin {
    WithinCity(DomesticOrigin),
    FromAnotherCity(AnotherCityOrigin),
    FromForeignPost(ForeignOrigin),
}

impl TransferOrigin {
    pub fn kind(&self) -> TransferType {
        match self {
            TransferOrigin::WithinCity(_) => TransferType::WithinCity,
            TransferOrigin::FromAnotherCity(_) => TransferType::FromAnotherCity,
            TransferOrigin::FromForeignPost(_) => TransferType::FromForeignPost,
        }
    }

    /// Previous precinct and barangay, shared by both domestic origins.
    pub fn domestic(&self) -> Option<DomesticOrigin> {
        match self {
            TransferOrigin::WithinCity(origin) => Some(origin.clone()),
            TransferOrigin::FromAnotherCity(origin) => Some(DomesticOrigin {
                previous_precinct_number: origin.previous_precinct_number.clone(),
                previous_barangay: origin.previous_barangay.clone(),
            }),
            TransferOrigin::FromForeignPost(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomesticOrigin {
    pub previous_precinct_number: Option<String>,
    pub previous_barangay: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnotherCityOrigin {
    pub previous_precinct_number: Option<String>,
    pub previous_barangay: Option<String>,
    pub previous_city_municipality: Option<String>,
    pub previous_province: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForeignOrigin {
    pub previous_foreign_post: Option<String>,
    pub previous_country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reactivation {
    pub reason_for_deactivation: Option<DeactivationReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferWithReactivation {
    pub address: Address,
    pub origin: Option<TransferOrigin>,
    pub reason_for_deactivation: Option<DeactivationReason>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Correction {
    pub target_field: Option<String>,
    pub current_value: Option<String>,
    pub requested_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reinstatement {
    pub reinstatement_type: Option<ReinstatementType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_serializes_with_application_type_tag() {
        let branch = ApplicationBranch::Reactivation(Reactivation {
            reason_for_deactivation: Some(DeactivationReason::FailureToVote),
        });
        let value = serde_json::to_value(&branch).unwrap();
        assert_eq!(value["applicationType"], "reactivation");
        assert_eq!(value["reasonForDeactivation"], "failure_to_vote");
    }

    #[test]
    fn test_origin_tag_and_fields() {
        let origin = TransferOrigin::FromForeignPost(ForeignOrigin {
            previous_foreign_post: Some("Dubai".into()),
            previous_country: Some("UAE".into()),
        });
        let value = serde_json::to_value(&origin).unwrap();
        assert_eq!(value["transferType"], "FromForeignPost");
        assert_eq!(value["previousForeignPost"], "Dubai");
        assert!(value.get("previousPrecinctNumber").is_none());
    }

    #[test]
    fn test_attachment_bytes_are_not_serialized() {
        let attachment = Attachment::pending("id.jpg", "image/jpeg", vec![1, 2, 3]);
        assert!(attachment.is_present());
        assert!(!attachment.is_uploaded());

        let json = serde_json::to_string(&attachment).unwrap();
        let restored: Attachment = serde_json::from_str(&json).unwrap();
        assert!(restored.bytes.is_empty());
        assert!(!restored.is_present());
    }

    #[test]
    fn test_empty_record_deserializes_from_empty_object() {
        let record: ApplicationRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, ApplicationRecord::default());
        assert_eq!(record.application_type(), None);
    }

    #[test]
    fn test_residency_total_months() {
        assert_eq!(ResidencyPeriod::new(2, 3).total_months(), Some(27));
        assert_eq!(ResidencyPeriod::default().total_months(), None);
    }

    #[test]
    fn test_domestic_parts_of_another_city_origin() {
        let origin = TransferOrigin::FromAnotherCity(AnotherCityOrigin {
            previous_precinct_number: Some("0123A".into()),
            previous_barangay: Some("San Roque".into()),
            previous_city_municipality: Some("Pasig".into()),
            previous_province: None,
        });
        let domestic = origin.domestic().unwrap();
        assert_eq!(domestic.previous_precinct_number.as_deref(), Some("0123A"));
        assert_eq!(domestic.previous_barangay.as_deref(), Some("San Roque"));
    }
}
