//! Application record model, field dependency resolver and validation rules.
//!
//! The record is a tagged union keyed on the application type; everything the
//! resolver clears and every rule the validator checks is expressed against
//! the variant that is active. Nothing here does I/O.

pub mod choices;
pub mod field;
pub mod record;
pub mod resolver;
pub mod rules;
pub mod sample;
pub mod validation;

pub use choices::{
    ApplicationType, ChoiceParseError, CitizenshipType, CivilStatus, DeactivationReason,
    RegistrationType, RegularRegistrationType, RegularVoterStatus, ReinstatementType, Sex,
    TransferType,
};
pub use field::Field;
pub use record::{
    Address, AnotherCityOrigin, ApplicationBranch, ApplicationRecord, Attachment, Citizenship,
    Civil, Contact, Correction, Disability, DomesticOrigin, ForeignOrigin, Identity,
    IndigenousPerson, KatipunanTrack, Naturalization, Parents, Reactivation, Registration,
    RegistrationTrack, RegularTrack, Reinstatement, ResidencyPeriod, SpecialSector, Spouse,
    Transfer, TransferOrigin, TransferWithReactivation,
};
pub use resolver::{resolve, ChangeParseError, DiscriminantChange};
pub use rules::{CrossFieldRule, ResidencyMinimum, RuleContext, CROSS_FIELD_RULES};
pub use validation::{validate, FieldFailure, ValidationReport, Validator};
