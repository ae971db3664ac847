//! End-to-end validation scenarios: resolver plus rule engine on realistic records.

use chrono::NaiveDate;
use voterreg_record::sample::{sample_origin, sample_record, sample_today};
use voterreg_record::{
    resolve, ApplicationBranch, ApplicationRecord, ApplicationType, Citizenship, Civil,
    CivilStatus, DiscriminantChange, DomesticOrigin, Field, KatipunanTrack, Naturalization,
    RegistrationTrack, ResidencyMinimum, ResidencyPeriod, Spouse, TransferOrigin, TransferType,
    ValidationReport, Validator,
};

fn check(record: &ApplicationRecord) -> ValidationReport {
    Validator::new(sample_today()).validate(record)
}

#[test]
fn naturalized_registrant_without_details_fails_on_both_detail_fields() {
    let mut record = sample_record(ApplicationType::Register);
    record.citizenship = Some(Citizenship::Naturalized(Naturalization::default()));

    let report = check(&record);
    assert_eq!(
        report.fields(),
        vec![Field::NaturalizationDate, Field::NaturalizationCertNo]
    );
}

#[test]
fn switching_to_foreign_post_clears_domestic_origin() {
    let mut record = sample_record(ApplicationType::Transfer);
    if let Some(ApplicationBranch::Transfer(transfer)) = record.application.as_mut() {
        transfer.origin = Some(TransferOrigin::WithinCity(DomesticOrigin {
            previous_precinct_number: Some("001A".into()),
            previous_barangay: Some("Bagumbayan".into()),
        }));
    }

    let record = resolve(
        &record,
        DiscriminantChange::TransferType(Some(TransferType::FromForeignPost)),
    );

    let serialized = serde_json::to_value(&record).unwrap();
    assert!(serialized.to_string().find("001A").is_none());

    let report = check(&record);
    assert!(!report.contains(Field::PreviousPrecinctNumber));
    assert_eq!(
        report.fields(),
        vec![Field::PreviousForeignPost, Field::PreviousCountry]
    );
}

#[test]
fn married_without_spouse_fails_only_on_spouse_name_and_single_clears_it() {
    let mut record = sample_record(ApplicationType::Reactivation);
    record.civil = Some(Civil::Married(Spouse::default()));
    assert_eq!(check(&record).fields(), vec![Field::SpouseName]);

    record.civil = Some(Civil::Married(Spouse {
        spouse_name: Some("Gabriela Silang".into()),
    }));
    assert!(check(&record).is_valid());

    let single = resolve(&record, DiscriminantChange::CivilStatus(Some(CivilStatus::Single)));
    assert_eq!(single.civil, Some(Civil::Single));
    assert!(check(&single).is_valid());
}

#[test]
fn each_branch_reports_its_own_required_fields() {
    let cases = [
        (
            ApplicationType::Register,
            vec![Field::RegistrationType, Field::IdFrontPhoto, Field::IdSelfieUrl],
        ),
        (ApplicationType::Transfer, vec![Field::TransferType]),
        (
            ApplicationType::Reactivation,
            vec![Field::ReasonForDeactivation],
        ),
        (
            ApplicationType::TransferWithReactivation,
            vec![Field::TransferType, Field::ReasonForDeactivation],
        ),
        (
            ApplicationType::CorrectionOfEntry,
            vec![Field::TargetField, Field::CurrentValue, Field::RequestedValue],
        ),
        (
            ApplicationType::Reinstatement,
            vec![Field::ReinstatementType],
        ),
    ];

    for (kind, expected) in cases {
        let mut record = sample_record(kind);
        let address = record.address().cloned();
        record.application = Some(ApplicationBranch::empty(kind));
        // Keep the address so only branch-owned fields are missing.
        if let (Some(slot), Some(address)) = (record.address_mut(), address) {
            *slot = address;
        }
        assert_eq!(check(&record).fields(), expected, "{}", kind);
    }
}

#[test]
fn transfer_sub_cases_require_their_own_origin_fields() {
    let cases = [
        (
            TransferType::WithinCity,
            vec![Field::PreviousPrecinctNumber, Field::PreviousBarangay],
        ),
        (
            TransferType::FromAnotherCity,
            vec![
                Field::PreviousPrecinctNumber,
                Field::PreviousBarangay,
                Field::PreviousCityMunicipality,
            ],
        ),
        (
            TransferType::FromForeignPost,
            vec![Field::PreviousForeignPost, Field::PreviousCountry],
        ),
    ];
    for (kind, expected) in cases {
        let mut record = sample_record(ApplicationType::Transfer);
        let selected = resolve(&record, DiscriminantChange::TransferType(None));
        record = resolve(&selected, DiscriminantChange::TransferType(Some(kind)));
        assert_eq!(check(&record).fields(), expected, "{}", kind);

        if let Some(slot) = record.application.as_mut().and_then(ApplicationBranch::origin_slot) {
            *slot = Some(sample_origin(kind));
        }
        assert!(check(&record).is_valid(), "{}", kind);
    }
}

#[test]
fn missing_application_type_is_reported_before_branch_rules() {
    let mut record = sample_record(ApplicationType::Register);
    record.application = None;
    assert_eq!(check(&record).fields(), vec![Field::ApplicationType]);
}

#[test]
fn declaration_and_branch_oath_are_independent() {
    let mut record = sample_record(ApplicationType::Register);
    record.declaration_accepted = false;
    if let Some(ApplicationBranch::Register(registration)) = record.application.as_mut() {
        registration.track = Some(RegistrationTrack::Katipunan(KatipunanTrack {
            oath_accepted: false,
            adult_registration_consent: Some(true),
        }));
    }
    assert_eq!(
        check(&record).fields(),
        vec![Field::DeclarationAccepted, Field::OathAccepted]
    );

    // Reinstatement has no branch oath, only the declaration.
    let mut record = sample_record(ApplicationType::Reinstatement);
    record.declaration_accepted = false;
    assert_eq!(check(&record).fields(), vec![Field::DeclarationAccepted]);
}

#[test]
fn residency_rules_apply_only_to_address_bearing_types() {
    let mut record = sample_record(ApplicationType::TransferWithReactivation);
    if let Some(address) = record.address_mut() {
        address.at_address = ResidencyPeriod::new(0, 12);
        address.in_municipality = ResidencyPeriod::new(0, 4);
        address.in_country = ResidencyPeriod {
            years: Some(40),
            months: None,
        };
    }
    assert_eq!(
        check(&record).fields(),
        vec![Field::MonthsInCountry, Field::MonthsAtAddress]
    );

    let eligibility = Validator::new(sample_today())
        .with_residency_minimum(Some(ResidencyMinimum::default()));
    assert_eq!(
        eligibility.validate(&record).fields(),
        vec![
            Field::MonthsInCountry,
            Field::MonthsAtAddress,
            Field::YearsInMunicipality,
        ]
    );

    let reactivation = resolve(
        &record,
        DiscriminantChange::ApplicationType(Some(ApplicationType::Reactivation)),
    );
    assert!(reactivation.address().is_none());
    assert!(check(&reactivation).is_valid());
}

#[test]
fn validation_does_not_mutate_the_record() {
    let mut record = sample_record(ApplicationType::Transfer);
    record.identity.first_name = None;
    record.identity.date_of_birth = NaiveDate::from_ymd_opt(2030, 1, 1);
    let before = record.clone();
    let first = check(&record);
    let second = check(&record);
    assert_eq!(record, before);
    assert_eq!(first, second);
    assert!(first.contains(Field::FirstName));
    assert!(first.contains(Field::DateOfBirth));
}
