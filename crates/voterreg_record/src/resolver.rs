//! Field dependency resolver.
//!
//! A discriminant change maps the old variant to the new one. Data shared by
//! both variants is carried over; everything owned only by the old variant is
//! dropped. Re-applying the same change is a no-op, and fields of a variant
//! that stays active are never touched, valid or not.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::choices::{
    ApplicationType, ChoiceParseError, CitizenshipType, CivilStatus, RegistrationType,
    TransferType,
};
use crate::field::Field;
use crate::record::{
    AnotherCityOrigin, ApplicationBranch, ApplicationRecord, Citizenship, Civil, Correction,
    DomesticOrigin, ForeignOrigin, Reactivation, Registration, RegistrationTrack,
    Reinstatement, Spouse, Transfer, TransferOrigin, TransferWithReactivation,
};

/// A new value for one of the fields that decide which other fields exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "discriminant", content = "value", rename_all = "camelCase")]
pub enum DiscriminantChange {
    ApplicationType(Option<ApplicationType>),
    TransferType(Option<TransferType>),
    CitizenshipType(Option<CitizenshipType>),
    RegistrationType(Option<RegistrationType>),
    CivilStatus(Option<CivilStatus>),
    IsPwd(bool),
    IsIndigenousPerson(bool),
}

impl DiscriminantChange {
    /// The form field whose edit produced this change.
    pub fn field(&self) -> Field {
        match self {
            DiscriminantChange::ApplicationType(_) => Field::ApplicationType,
            DiscriminantChange::TransferType(_) => Field::TransferType,
            DiscriminantChange::CitizenshipType(_) => Field::CitizenshipType,
            DiscriminantChange::RegistrationType(_) => Field::RegistrationType,
            DiscriminantChange::CivilStatus(_) => Field::CivilStatus,
            DiscriminantChange::IsPwd(_) => Field::IsPwd,
            DiscriminantChange::IsIndigenousPerson(_) => Field::IsIndigenousPerson,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChangeParseError {
    #[error("expected <field>=<value>, got '{0}'")]
    Syntax(String),
    #[error("{0} is not a discriminant field")]
    NotDiscriminant(String),
    #[error(transparent)]
    Choice(#[from] ChoiceParseError),
    #[error("expected true or false for {field}, got '{value}'")]
    Flag { field: Field, value: String },
}

fn optional<T>(value: &str) -> Result<Option<T>, ChoiceParseError>
where
    T: std::str::FromStr<Err = ChoiceParseError>,
{
    if value.is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

/// Parses `<field>=<value>` using the camelCase field path; an empty value unselects.
impl std::str::FromStr for DiscriminantChange {
    type Err = ChangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| ChangeParseError::Syntax(s.to_string()))?;
        let field: Field = name
            .trim()
            .parse()
            .map_err(|_| ChangeParseError::NotDiscriminant(name.trim().to_string()))?;
        let value = value.trim();
        let flag = |value: &str| {
            value.parse::<bool>().map_err(|_| ChangeParseError::Flag {
                field,
                value: value.to_string(),
            })
        };

        Ok(match field {
            Field::ApplicationType => DiscriminantChange::ApplicationType(optional(value)?),
            Field::TransferType => DiscriminantChange::TransferType(optional(value)?),
            Field::CitizenshipType => DiscriminantChange::CitizenshipType(optional(value)?),
            Field::RegistrationType => DiscriminantChange::RegistrationType(optional(value)?),
            Field::CivilStatus => DiscriminantChange::CivilStatus(optional(value)?),
            Field::IsPwd => DiscriminantChange::IsPwd(flag(value)?),
            Field::IsIndigenousPerson => DiscriminantChange::IsIndigenousPerson(flag(value)?),
            other => return Err(ChangeParseError::NotDiscriminant(other.to_string())),
        })
    }
}

/// Apply a discriminant change and drop whatever the new state no longer owns.
pub fn resolve(record: &ApplicationRecord, change: DiscriminantChange) -> ApplicationRecord {
    let mut next = record.clone();
    match change {
        DiscriminantChange::ApplicationType(kind) => {
            let previous = next.application.take();
            next.application = kind.map(|kind| convert_branch(previous, kind));
        }
        DiscriminantChange::TransferType(kind) => {
            // No transfer branch active: nothing owns the origin, nothing to do.
            if let Some(slot) = next.application.as_mut().and_then(ApplicationBranch::origin_slot)
            {
                let previous = slot.take();
                *slot = kind.map(|kind| convert_origin(previous, kind));
            }
        }
        DiscriminantChange::CitizenshipType(kind) => {
            let previous = next.citizenship.take();
            next.citizenship = kind.map(|kind| convert_citizenship(previous, kind));
        }
        DiscriminantChange::RegistrationType(kind) => {
            if let Some(ApplicationBranch::Register(registration)) = next.application.as_mut() {
                let previous = registration.track.take();
                registration.track = kind.map(|kind| convert_track(previous, kind));
            }
        }
        DiscriminantChange::CivilStatus(kind) => {
            let previous = next.civil.take();
            next.civil = kind.map(|kind| convert_civil(previous, kind));
        }
        DiscriminantChange::IsPwd(flag) => {
            next.sector.disability = if flag {
                Some(next.sector.disability.take().unwrap_or_default())
            } else {
                None
            };
        }
        DiscriminantChange::IsIndigenousPerson(flag) => {
            next.sector.indigenous_person = if flag {
                Some(next.sector.indigenous_person.take().unwrap_or_default())
            } else {
                None
            };
        }
    }
    debug!(field = %change.field(), changed = (next != *record), "resolved discriminant change");
    next
}

/// Move an application branch to another application type.
///
/// The address is shared by the three address-bearing types, the transfer
/// origin by both transfer types, and the deactivation reason by both
/// reactivation types.
pub fn convert_branch(old: Option<ApplicationBranch>, to: ApplicationType) -> ApplicationBranch {
    let old = match old {
        Some(branch) if branch.kind() == to => return branch,
        Some(branch) => branch,
        None => return ApplicationBranch::empty(to),
    };

    let address = old.address().cloned().unwrap_or_default();
    let origin = old.origin().cloned();
    let reason = old.reason_for_deactivation();

    match to {
        ApplicationType::Register => ApplicationBranch::Register(Registration {
            address,
            ..Registration::default()
        }),
        ApplicationType::Transfer => ApplicationBranch::Transfer(Transfer { address, origin }),
        ApplicationType::Reactivation => ApplicationBranch::Reactivation(Reactivation {
            reason_for_deactivation: reason,
        }),
        ApplicationType::TransferWithReactivation => {
            ApplicationBranch::TransferWithReactivation(TransferWithReactivation {
                address,
                origin,
                reason_for_deactivation: reason,
            })
        }
        ApplicationType::CorrectionOfEntry => {
            ApplicationBranch::CorrectionOfEntry(Correction::default())
        }
        ApplicationType::Reinstatement => ApplicationBranch::Reinstatement(Reinstatement::default()),
    }
}

/// Move a transfer origin to another transfer type.
///
/// Previous precinct and barangay survive a switch between the two domestic
/// types; previous city/province belong to `FromAnotherCity` alone and the
/// foreign post/country to `FromForeignPost` alone.
pub fn convert_origin(old: Option<TransferOrigin>, to: TransferType) -> TransferOrigin {
    let old = match old {
        Some(origin) if origin.kind() == to => return origin,
        other => other,
    };
    let domestic = old
        .as_ref()
        .and_then(TransferOrigin::domestic)
        .unwrap_or_default();

    match to {
        TransferType::WithinCity => TransferOrigin::WithinCity(domestic),
        TransferType::FromAnotherCity => {
            let DomesticOrigin {
                previous_precinct_number,
                previous_barangay,
            } = domestic;
            TransferOrigin::FromAnotherCity(AnotherCityOrigin {
                previous_precinct_number,
                previous_barangay,
                ..AnotherCityOrigin::default()
            })
        }
        TransferType::FromForeignPost => TransferOrigin::FromForeignPost(ForeignOrigin::default()),
    }
}

/// Naturalized and reacquired citizens share certificate details.
pub fn convert_citizenship(old: Option<Citizenship>, to: CitizenshipType) -> Citizenship {
    let details = old
        .as_ref()
        .and_then(Citizenship::naturalization)
        .cloned()
        .unwrap_or_default();
    match to {
        CitizenshipType::ByBirth => Citizenship::ByBirth,
        CitizenshipType::Naturalized => Citizenship::Naturalized(details),
        CitizenshipType::Reacquired => Citizenship::Reacquired(details),
    }
}

pub fn convert_track(old: Option<RegistrationTrack>, to: RegistrationType) -> RegistrationTrack {
    match old {
        Some(track) if track.kind() == to => track,
        _ => RegistrationTrack::empty(to),
    }
}

pub fn convert_civil(old: Option<Civil>, to: CivilStatus) -> Civil {
    match to {
        CivilStatus::Single => Civil::Single,
        CivilStatus::Married => match old {
            Some(Civil::Married(spouse)) => Civil::Married(spouse),
            _ => Civil::Married(Spouse::default()),
        },
        CivilStatus::Widowed => Civil::Widowed,
        CivilStatus::LegallySeparated => Civil::LegallySeparated,
    }
}
