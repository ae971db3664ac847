//! Filled-in example records, one per application type.
//!
//! Every record built here passes validation on [`sample_today`] or later.
//! The CLI prints them as templates and downstream test suites start from them.

use chrono::NaiveDate;

use crate::choices::{
    ApplicationType, CitizenshipType, CivilStatus, DeactivationReason, RegularRegistrationType,
    RegularVoterStatus, ReinstatementType, Sex, TransferType,
};
use crate::record::{
    Address, AnotherCityOrigin, ApplicationBranch, ApplicationRecord, Attachment, Citizenship,
    Civil, Contact, Correction, DomesticOrigin, ForeignOrigin, Identity, Naturalization, Parents,
    Reactivation, Registration, RegistrationTrack, RegularTrack, Reinstatement, ResidencyPeriod,
    SpecialSector, Spouse, Transfer, TransferOrigin, TransferWithReactivation,
};

/// Reference date the samples are valid on.
pub fn sample_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap_or_default()
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub fn sample_address() -> Address {
    Address {
        house_number: text("12"),
        street: text("Mabini St."),
        barangay: text("San Isidro"),
        city_municipality: text("Quezon City"),
        province: text("Metro Manila"),
        at_address: ResidencyPeriod::new(3, 2),
        in_municipality: ResidencyPeriod::new(5, 0),
        in_country: ResidencyPeriod::new(35, 11),
    }
}

/// The always-present part of a complete application.
pub fn sample_applicant() -> ApplicationRecord {
    ApplicationRecord {
        identity: Identity {
            first_name: text("Juan"),
            last_name: text("Dela Cruz"),
            middle_name: text("Santos"),
            suffix: None,
            sex: Some(Sex::Male),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 15),
            place_of_birth_municipality: text("Malolos"),
            place_of_birth_province: text("Bulacan"),
        },
        citizenship: Some(Citizenship::ByBirth),
        contact: Contact {
            contact_number: text("09171234567"),
            email_address: text("juan.delacruz@example.ph"),
        },
        civil: Some(Civil::Single),
        parents: Parents {
            father_first_name: text("Jose"),
            father_last_name: text("Dela Cruz"),
            mother_first_name: text("Maria"),
            mother_last_name: text("Santos"),
        },
        sector: SpecialSector::default(),
        declaration_accepted: true,
        application: None,
    }
}

/// A complete, valid application of the given type.
pub fn sample_record(kind: ApplicationType) -> ApplicationRecord {
    let branch = match kind {
        ApplicationType::Register => ApplicationBranch::Register(Registration {
            address: sample_address(),
            track: Some(RegistrationTrack::Regular(RegularTrack {
                regular_oath_accepted: true,
                regular_registration_type: Some(RegularRegistrationType::NewRegistrant),
                regular_voter_status: Some(RegularVoterStatus::Civilian),
            })),
            id_front_photo: Some(Attachment::pending(
                "id-front.jpg",
                "image/jpeg",
                b"front".to_vec(),
            )),
            id_selfie_url: Some(Attachment::pending(
                "id-selfie.jpg",
                "image/jpeg",
                b"selfie".to_vec(),
            )),
        }),
        ApplicationType::Transfer => ApplicationBranch::Transfer(Transfer {
            address: sample_address(),
            origin: Some(sample_origin(TransferType::FromAnotherCity)),
        }),
        ApplicationType::Reactivation => ApplicationBranch::Reactivation(Reactivation {
            reason_for_deactivation: Some(DeactivationReason::FailureToVote),
        }),
        ApplicationType::TransferWithReactivation => {
            ApplicationBranch::TransferWithReactivation(TransferWithReactivation {
                address: sample_address(),
                origin: Some(sample_origin(TransferType::WithinCity)),
                reason_for_deactivation: Some(DeactivationReason::FailureToVote),
            })
        }
        ApplicationType::CorrectionOfEntry => ApplicationBranch::CorrectionOfEntry(Correction {
            target_field: text("lastName"),
            current_value: text("Dela Crus"),
            requested_value: text("Dela Cruz"),
        }),
        ApplicationType::Reinstatement => ApplicationBranch::Reinstatement(Reinstatement {
            reinstatement_type: Some(ReinstatementType::OmittedFromList),
        }),
    };

    ApplicationRecord {
        application: Some(branch),
        ..sample_applicant()
    }
}

/// A complete origin of the given transfer type.
pub fn sample_origin(kind: TransferType) -> TransferOrigin {
    match kind {
        TransferType::WithinCity => TransferOrigin::WithinCity(DomesticOrigin {
            previous_precinct_number: text("0123A"),
            previous_barangay: text("Bagong Silang"),
        }),
        TransferType::FromAnotherCity => TransferOrigin::FromAnotherCity(AnotherCityOrigin {
            previous_precinct_number: text("0456B"),
            previous_barangay: text("Poblacion"),
            previous_city_municipality: text("Malolos"),
            previous_province: text("Bulacan"),
        }),
        TransferType::FromForeignPost => TransferOrigin::FromForeignPost(ForeignOrigin {
            previous_foreign_post: text("Riyadh"),
            previous_country: text("Saudi Arabia"),
        }),
    }
}

/// Citizenship of the given type with its details filled in.
pub fn sample_citizenship(kind: CitizenshipType) -> Citizenship {
    let details = Naturalization {
        naturalization_date: NaiveDate::from_ymd_opt(2012, 6, 12),
        naturalization_cert_no: text("NC-2012-0042"),
    };
    match kind {
        CitizenshipType::ByBirth => Citizenship::ByBirth,
        CitizenshipType::Naturalized => Citizenship::Naturalized(details),
        CitizenshipType::Reacquired => Citizenship::Reacquired(details),
    }
}

pub fn sample_civil(kind: CivilStatus) -> Civil {
    match kind {
        CivilStatus::Single => Civil::Single,
        CivilStatus::Married => Civil::Married(Spouse {
            spouse_name: text("Maria Clara Dela Cruz"),
        }),
        CivilStatus::Widowed => Civil::Widowed,
        CivilStatus::LegallySeparated => Civil::LegallySeparated,
    }
}
