//! Closed value sets used by the application record.
//!
//! Discriminant kinds (`ApplicationType`, `TransferType`, ...) are fieldless and
//! are what the resolver receives; the record itself stores the data-carrying
//! variant enums from [`crate::record`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error when parsing a choice from its wire string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {label}: {value}")]
pub struct ChoiceParseError {
    label: &'static str,
    value: String,
}

impl ChoiceParseError {
    pub(crate) fn field(value: &str) -> Self {
        Self {
            label: "field",
            value: value.to_string(),
        }
    }
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical wire string.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ChoiceParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ChoiceParseError {
                        label: $label,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

choice_enum! {
    /// The application being filed. Drives every other conditional rule.
    ApplicationType, "application type" {
        Register => "register",
        Transfer => "transfer",
        Reactivation => "reactivation",
        TransferWithReactivation => "transfer_with_reactivation",
        CorrectionOfEntry => "correction_of_entry",
        Reinstatement => "reinstatement",
    }
}

impl ApplicationType {
    /// Application types that collect the current residential address.
    pub fn has_address(&self) -> bool {
        matches!(
            self,
            ApplicationType::Register
                | ApplicationType::Transfer
                | ApplicationType::TransferWithReactivation
        )
    }

    pub fn has_transfer(&self) -> bool {
        matches!(
            self,
            ApplicationType::Transfer | ApplicationType::TransferWithReactivation
        )
    }

    pub fn has_reactivation(&self) -> bool {
        matches!(
            self,
            ApplicationType::Reactivation | ApplicationType::TransferWithReactivation
        )
    }
}

choice_enum! {
    /// Where a transferring voter was previously registered.
    TransferType, "transfer type" {
        WithinCity => "WithinCity",
        FromAnotherCity => "FromAnotherCity",
        FromForeignPost => "FromForeignPost",
    }
}

impl TransferType {
    pub fn is_domestic(&self) -> bool {
        !matches!(self, TransferType::FromForeignPost)
    }
}

choice_enum! {
    CitizenshipType, "citizenship type" {
        ByBirth => "ByBirth",
        Naturalized => "Naturalized",
        Reacquired => "Reacquired",
    }
}

impl CitizenshipType {
    /// Naturalized and reacquired citizens must show the certificate and its date.
    pub fn needs_certificate(&self) -> bool {
        !matches!(self, CitizenshipType::ByBirth)
    }
}

choice_enum! {
    /// Registration track for a new registrant.
    RegistrationType, "registration type" {
        Regular => "Regular",
        /// Youth registration for the Katipunan ng Kabataan.
        Katipunan => "Katipunan",
    }
}

choice_enum! {
    CivilStatus, "civil status" {
        Single => "Single",
        Married => "Married",
        Widowed => "Widowed",
        LegallySeparated => "LegallySeparated",
    }
}

choice_enum! {
    Sex, "sex" {
        Male => "Male",
        Female => "Female",
    }
}

choice_enum! {
    RegularRegistrationType, "regular registration type" {
        NewRegistrant => "NewRegistrant",
        FormerKatipunanMember => "FormerKatipunanMember",
    }
}

choice_enum! {
    RegularVoterStatus, "regular voter status" {
        Civilian => "Civilian",
        UniformedPersonnel => "UniformedPersonnel",
    }
}

choice_enum! {
    /// Legal grounds on which a registration record was deactivated.
    DeactivationReason, "reason for deactivation" {
        ImprisonmentSentence => "imprisonment_sentence",
        DisloyaltyConviction => "disloyalty_conviction",
        DeclaredIncompetent => "declared_incompetent",
        FailureToVote => "failure_to_vote",
        ExclusionOrder => "exclusion_order",
        LossOfCitizenship => "loss_of_citizenship",
        NoBiometrics => "no_biometrics",
    }
}

impl DeactivationReason {
    pub fn description(&self) -> &'static str {
        match self {
            DeactivationReason::ImprisonmentSentence => {
                "Sentenced by final judgment to suffer imprisonment of not less than one (1) year"
            }
            DeactivationReason::DisloyaltyConviction => {
                "Convicted by final judgment of a crime involving disloyalty to the duly \
                 constituted government, such as rebellion, sedition, or crimes against \
                 national security"
            }
            DeactivationReason::DeclaredIncompetent => {
                "Declared by competent authority to be insane or incompetent"
            }
            DeactivationReason::FailureToVote => {
                "Did not vote in the two (2) successive preceding regular elections"
            }
            DeactivationReason::ExclusionOrder => {
                "Registration was ordered excluded by the court"
            }
            DeactivationReason::LossOfCitizenship => "Lost Filipino citizenship",
            DeactivationReason::NoBiometrics => {
                "Failed to submit for validation and capture of biometrics data"
            }
        }
    }
}

choice_enum! {
    ReinstatementType, "reinstatement type" {
        OmittedFromList => "omitted_from_list",
        ErroneouslyExcluded => "erroneously_excluded",
        RecordLostOrDestroyed => "record_lost_or_destroyed",
    }
}

impl ReinstatementType {
    pub fn description(&self) -> &'static str {
        match self {
            ReinstatementType::OmittedFromList => {
                "Name was omitted from the certified list of voters"
            }
            ReinstatementType::ErroneouslyExcluded => {
                "Name was excluded from the list of voters through error or inadvertence"
            }
            ReinstatementType::RecordLostOrDestroyed => {
                "Registration record was lost or destroyed"
            }
        }
    }
}
