//! Cross-field rule table.
//!
//! Each rule reads the record and attaches failures to the field the
//! applicant has to fix, not to the discriminant that made it required.
//! Branch rules dispatch on the active [`ApplicationBranch`] variant, so a
//! rule never sees fields of an inactive branch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::record::{
    Address, ApplicationBranch, ApplicationRecord, Civil, Correction, Reactivation, Registration,
    RegistrationTrack, Reinstatement, ResidencyPeriod, Transfer, TransferOrigin,
    TransferWithReactivation,
};
use crate::validation::{is_blank, require, require_text, required_message, ValidationReport};

/// Shortest residence in the city/municipality before registering, in months.
pub const MIN_MONTHS_IN_MUNICIPALITY: u32 = 6;
/// Shortest residence in the country before registering, in months.
pub const MIN_MONTHS_IN_COUNTRY: u32 = 12;

/// Minimum residence an address-bearing application must declare.
///
/// Off unless the validator is given one; the default is the voter
/// eligibility rule of six months locally and one year in the country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidencyMinimum {
    pub municipality_months: u32,
    pub country_months: u32,
}

impl Default for ResidencyMinimum {
    fn default() -> Self {
        Self {
            municipality_months: MIN_MONTHS_IN_MUNICIPALITY,
            country_months: MIN_MONTHS_IN_COUNTRY,
        }
    }
}

/// Inputs a rule needs besides the record.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub today: NaiveDate,
    pub residency_minimum: Option<ResidencyMinimum>,
}

impl RuleContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            residency_minimum: None,
        }
    }
}

fn months_phrase(months: u32) -> String {
    match (months / 12, months % 12) {
        (1, 0) => "1 year".to_string(),
        (years, 0) => format!("{} years", years),
        (0, 1) => "1 month".to_string(),
        _ => format!("{} months", months),
    }
}

pub type RuleCheck = fn(&ApplicationRecord, &RuleContext, &mut ValidationReport);

/// A named entry in the cross-field table.
#[derive(Clone, Copy)]
pub struct CrossFieldRule {
    pub name: &'static str,
    pub check: RuleCheck,
}

impl std::fmt::Debug for CrossFieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossFieldRule")
            .field("name", &self.name)
            .finish()
    }
}

/// Evaluated in declaration order; all rules run, none short-circuits.
pub const CROSS_FIELD_RULES: &[CrossFieldRule] = &[
    CrossFieldRule {
        name: "application_type_selected",
        check: application_type_selected,
    },
    CrossFieldRule {
        name: "citizenship_details",
        check: citizenship_details,
    },
    CrossFieldRule {
        name: "civil_status_details",
        check: civil_status_details,
    },
    CrossFieldRule {
        name: "special_sector_details",
        check: special_sector_details,
    },
    CrossFieldRule {
        name: "address_complete",
        check: address_complete,
    },
    CrossFieldRule {
        name: "residency_bounds",
        check: residency_bounds,
    },
    CrossFieldRule {
        name: "residency_minimum",
        check: residency_minimum,
    },
    CrossFieldRule {
        name: "branch_requirements",
        check: branch_requirements,
    },
    CrossFieldRule {
        name: "correction_values_differ",
        check: correction_values_differ,
    },
    CrossFieldRule {
        name: "declaration_and_oath",
        check: declaration_and_oath,
    },
];

fn application_type_selected(
    record: &ApplicationRecord,
    _ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    if record.application.is_none() {
        report.push(Field::ApplicationType, "Select an application type");
    }
}

fn citizenship_details(record: &ApplicationRecord, ctx: &RuleContext, report: &mut ValidationReport) {
    let Some(details) = record.citizenship.as_ref().and_then(|c| c.naturalization()) else {
        return;
    };

    match details.naturalization_date {
        None => {
            report.push(
                Field::NaturalizationDate,
                required_message(Field::NaturalizationDate),
            );
        }
        Some(date) if date > ctx.today => {
            report.push(
                Field::NaturalizationDate,
                "Date of naturalization cannot be in the future",
            );
        }
        Some(date) => {
            if let Some(dob) = record.identity.date_of_birth {
                if date < dob {
                    report.push(
                        Field::NaturalizationDate,
                        "Date of naturalization cannot be before the date of birth",
                    );
                }
            }
        }
    }

    require_text(
        report,
        Field::NaturalizationCertNo,
        details.naturalization_cert_no.as_ref(),
    );
}

fn civil_status_details(
    record: &ApplicationRecord,
    _ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    if let Some(Civil::Married(spouse)) = &record.civil {
        require_text(report, Field::SpouseName, spouse.spouse_name.as_ref());
    }
}

fn special_sector_details(
    record: &ApplicationRecord,
    _ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    let sector = &record.sector;
    if let Some(indigenous) = &sector.indigenous_person {
        require_text(report, Field::Tribe, indigenous.tribe.as_ref());
    }
    if let Some(disability) = &sector.disability {
        require_text(report, Field::DisabilityType, disability.disability_type.as_ref());
    }
    if !is_blank(sector.assistor_name.as_ref()) {
        require_text(
            report,
            Field::AssistorRelationship,
            sector.assistor_relationship.as_ref(),
        );
    }
}

fn residency_periods(address: &Address) -> [(Field, Field, ResidencyPeriod); 3] {
    [
        (Field::YearsAtAddress, Field::MonthsAtAddress, address.at_address),
        (
            Field::YearsInMunicipality,
            Field::MonthsInMunicipality,
            address.in_municipality,
        ),
        (Field::YearsInCountry, Field::MonthsInCountry, address.in_country),
    ]
}

fn address_complete(record: &ApplicationRecord, _ctx: &RuleContext, report: &mut ValidationReport) {
    let Some(address) = record.address() else {
        return;
    };

    for (field, value) in [
        (Field::HouseNumber, address.house_number.as_ref()),
        (Field::Street, address.street.as_ref()),
        (Field::Barangay, address.barangay.as_ref()),
        (Field::CityMunicipality, address.city_municipality.as_ref()),
        (Field::Province, address.province.as_ref()),
    ] {
        require_text(report, field, value);
    }

    for (years_field, months_field, period) in residency_periods(address) {
        require(report, years_field, period.years);
        require(report, months_field, period.months);
    }
}

fn residency_bounds(record: &ApplicationRecord, _ctx: &RuleContext, report: &mut ValidationReport) {
    let Some(address) = record.address() else {
        return;
    };
    for (_, months_field, period) in residency_periods(address) {
        if period.months.map_or(false, |months| months > 11) {
            report.push(
                months_field,
                format!("{} must be between 0 and 11", months_field.label()),
            );
        }
    }
}

/// Residency eligibility, when a [`ResidencyMinimum`] is configured.
fn residency_minimum(record: &ApplicationRecord, ctx: &RuleContext, report: &mut ValidationReport) {
    let (Some(minimum), Some(address)) = (ctx.residency_minimum, record.address()) else {
        return;
    };

    let checks = [
        (
            Field::YearsInMunicipality,
            address.in_municipality,
            minimum.municipality_months,
            "Residence in the city/municipality",
        ),
        (
            Field::YearsInCountry,
            address.in_country,
            minimum.country_months,
            "Residence in the Philippines",
        ),
    ];
    for (field, period, minimum, subject) in checks {
        // Out-of-range months are already reported; a total built on them is meaningless.
        if period.months.map_or(false, |months| months > 11) {
            continue;
        }
        if let Some(total) = period.total_months() {
            if total < minimum {
                report.push(
                    field,
                    format!("{} must be at least {}", subject, months_phrase(minimum)),
                );
            }
        }
    }
}

fn branch_requirements(
    record: &ApplicationRecord,
    _ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    match &record.application {
        None => {}
        Some(ApplicationBranch::Register(registration)) => validate_registration(registration, report),
        Some(ApplicationBranch::Transfer(transfer)) => validate_transfer(transfer, report),
        Some(ApplicationBranch::Reactivation(reactivation)) => {
            validate_reactivation(reactivation, report)
        }
        Some(ApplicationBranch::TransferWithReactivation(branch)) => {
            validate_transfer_with_reactivation(branch, report)
        }
        Some(ApplicationBranch::CorrectionOfEntry(correction)) => {
            validate_correction(correction, report)
        }
        Some(ApplicationBranch::Reinstatement(reinstatement)) => {
            validate_reinstatement(reinstatement, report)
        }
    }
}

pub fn validate_registration(registration: &Registration, report: &mut ValidationReport) {
    match &registration.track {
        None => {
            report.push(Field::RegistrationType, required_message(Field::RegistrationType));
        }
        Some(RegistrationTrack::Regular(track)) => {
            require(
                report,
                Field::RegularRegistrationType,
                track.regular_registration_type,
            );
            require(report, Field::RegularVoterStatus, track.regular_voter_status);
        }
        Some(RegistrationTrack::Katipunan(track)) => {
            if track.adult_registration_consent.is_none() {
                report.push(
                    Field::AdultRegistrationConsent,
                    "Answer whether you consent to adult registration",
                );
            }
        }
    }

    let attachments = [
        (Field::IdFrontPhoto, registration.id_front_photo.as_ref()),
        (Field::IdSelfieUrl, registration.id_selfie_url.as_ref()),
    ];
    for (field, attachment) in attachments {
        if !attachment.map_or(false, |a| a.is_present()) {
            report.push(field, required_message(field));
        }
    }
}

fn validate_origin(origin: Option<&TransferOrigin>, report: &mut ValidationReport) {
    match origin {
        None => {
            report.push(Field::TransferType, required_message(Field::TransferType));
        }
        Some(TransferOrigin::WithinCity(origin)) => {
            require_text(
                report,
                Field::PreviousPrecinctNumber,
                origin.previous_precinct_number.as_ref(),
            );
            require_text(report, Field::PreviousBarangay, origin.previous_barangay.as_ref());
        }
        Some(TransferOrigin::FromAnotherCity(origin)) => {
            require_text(
                report,
                Field::PreviousPrecinctNumber,
                origin.previous_precinct_number.as_ref(),
            );
            require_text(report, Field::PreviousBarangay, origin.previous_barangay.as_ref());
            require_text(
                report,
                Field::PreviousCityMunicipality,
                origin.previous_city_municipality.as_ref(),
            );
        }
        Some(TransferOrigin::FromForeignPost(origin)) => {
            require_text(
                report,
                Field::PreviousForeignPost,
                origin.previous_foreign_post.as_ref(),
            );
            require_text(report, Field::PreviousCountry, origin.previous_country.as_ref());
        }
    }
}

pub fn validate_transfer(transfer: &Transfer, report: &mut ValidationReport) {
    validate_origin(transfer.origin.as_ref(), report);
}

pub fn validate_reactivation(reactivation: &Reactivation, report: &mut ValidationReport) {
    require(
        report,
        Field::ReasonForDeactivation,
        reactivation.reason_for_deactivation,
    );
}

pub fn validate_transfer_with_reactivation(
    branch: &TransferWithReactivation,
    report: &mut ValidationReport,
) {
    validate_origin(branch.origin.as_ref(), report);
    require(report, Field::ReasonForDeactivation, branch.reason_for_deactivation);
}

pub fn validate_correction(correction: &Correction, report: &mut ValidationReport) {
    require_text(report, Field::TargetField, correction.target_field.as_ref());
    require_text(report, Field::CurrentValue, correction.current_value.as_ref());
    require_text(report, Field::RequestedValue, correction.requested_value.as_ref());
}

pub fn validate_reinstatement(reinstatement: &Reinstatement, report: &mut ValidationReport) {
    require(report, Field::ReinstatementType, reinstatement.reinstatement_type);
}

fn correction_values_differ(
    record: &ApplicationRecord,
    _ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    if let Some(ApplicationBranch::CorrectionOfEntry(correction)) = &record.application {
        if let (Some(current), Some(requested)) = (
            correction.current_value.as_deref().map(str::trim),
            correction.requested_value.as_deref().map(str::trim),
        ) {
            if !current.is_empty() && current == requested {
                report.push(
                    Field::RequestedValue,
                    "Requested value must differ from the current value",
                );
            }
        }
    }
}

fn declaration_and_oath(
    record: &ApplicationRecord,
    _ctx: &RuleContext,
    report: &mut ValidationReport,
) {
    if !record.declaration_accepted {
        report.push(Field::DeclarationAccepted, "You must accept the declaration");
    }
    if let Some(ApplicationBranch::Register(registration)) = &record.application {
        match &registration.track {
            Some(RegistrationTrack::Regular(track)) if !track.regular_oath_accepted => {
                report.push(Field::RegularOathAccepted, "You must take the voter's oath");
            }
            Some(RegistrationTrack::Katipunan(track)) if !track.oath_accepted => {
                report.push(Field::OathAccepted, "You must take the Katipunan oath");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::DeactivationReason;
    use crate::record::{Attachment, KatipunanTrack, RegularTrack};

    fn ctx() -> RuleContext {
        RuleContext {
            today: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            residency_minimum: Some(ResidencyMinimum::default()),
        }
    }

    fn run(rule: &str, record: &ApplicationRecord) -> ValidationReport {
        let mut report = ValidationReport::new();
        let rule = CROSS_FIELD_RULES
            .iter()
            .find(|r| r.name == rule)
            .unwrap();
        (rule.check)(record, &ctx(), &mut report);
        report
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<&str> = CROSS_FIELD_RULES.iter().map(|r| r.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CROSS_FIELD_RULES.len());
    }

    #[test]
    fn test_katipunan_consent_must_be_answered() {
        let mut registration = Registration {
            track: Some(RegistrationTrack::Katipunan(KatipunanTrack {
                oath_accepted: true,
                adult_registration_consent: None,
            })),
            id_front_photo: Some(Attachment::uploaded("front.jpg", "https://cdn/front.jpg")),
            id_selfie_url: Some(Attachment::uploaded("selfie.jpg", "https://cdn/selfie.jpg")),
            ..Registration::default()
        };
        let mut report = ValidationReport::new();
        validate_registration(&registration, &mut report);
        assert_eq!(report.fields(), vec![Field::AdultRegistrationConsent]);

        // An explicit "no" is an answer.
        registration.track = Some(RegistrationTrack::Katipunan(KatipunanTrack {
            oath_accepted: true,
            adult_registration_consent: Some(false),
        }));
        let mut report = ValidationReport::new();
        validate_registration(&registration, &mut report);
        assert!(report.is_valid());
    }

    #[test]
    fn test_regular_track_requirements_and_missing_ids() {
        let registration = Registration {
            track: Some(RegistrationTrack::Regular(RegularTrack::default())),
            id_front_photo: Some(Attachment::default()),
            ..Registration::default()
        };
        let mut report = ValidationReport::new();
        validate_registration(&registration, &mut report);
        assert_eq!(
            report.fields(),
            vec![
                Field::RegularRegistrationType,
                Field::RegularVoterStatus,
                Field::IdFrontPhoto,
                Field::IdSelfieUrl,
            ]
        );
    }

    #[test]
    fn test_months_out_of_range_reported_once() {
        let mut record = ApplicationRecord {
            application: Some(ApplicationBranch::empty(
                crate::choices::ApplicationType::Transfer,
            )),
            ..ApplicationRecord::default()
        };
        let address = record.address_mut().unwrap();
        address.in_municipality = ResidencyPeriod::new(0, 14);
        address.in_country = ResidencyPeriod::new(0, 3);

        let bounds = run("residency_bounds", &record);
        assert_eq!(bounds.fields(), vec![Field::MonthsInMunicipality]);

        let minimum = run("residency_minimum", &record);
        assert_eq!(minimum.fields(), vec![Field::YearsInCountry]);
        assert_eq!(
            minimum.message_for(Field::YearsInCountry),
            Some("Residence in the Philippines must be at least 1 year")
        );
    }

    #[test]
    fn test_residency_minimum_is_opt_in() {
        let mut record = ApplicationRecord {
            application: Some(ApplicationBranch::empty(
                crate::choices::ApplicationType::Register,
            )),
            ..ApplicationRecord::default()
        };
        let address = record.address_mut().unwrap();
        address.in_municipality = ResidencyPeriod::new(0, 2);
        address.in_country = ResidencyPeriod::new(0, 2);

        let rule = CROSS_FIELD_RULES
            .iter()
            .find(|r| r.name == "residency_minimum")
            .unwrap();
        let mut report = ValidationReport::new();
        (rule.check)(&record, &RuleContext::new(ctx().today), &mut report);
        assert!(report.is_valid());

        let strict = RuleContext {
            residency_minimum: Some(ResidencyMinimum {
                municipality_months: 3,
                country_months: 24,
            }),
            ..ctx()
        };
        let mut report = ValidationReport::new();
        (rule.check)(&record, &strict, &mut report);
        assert_eq!(
            report.fields(),
            vec![Field::YearsInMunicipality, Field::YearsInCountry]
        );
        assert_eq!(
            report.message_for(Field::YearsInMunicipality),
            Some("Residence in the city/municipality must be at least 3 months")
        );
        assert_eq!(
            report.message_for(Field::YearsInCountry),
            Some("Residence in the Philippines must be at least 2 years")
        );
    }

    #[test]
    fn test_naturalization_before_birth() {
        let mut record = ApplicationRecord::default();
        record.identity.date_of_birth = NaiveDate::from_ymd_opt(1990, 1, 15);
        record.citizenship = Some(crate::record::Citizenship::Reacquired(
            crate::record::Naturalization {
                naturalization_date: NaiveDate::from_ymd_opt(1980, 5, 5),
                naturalization_cert_no: Some("RA-9225-001".into()),
            },
        ));
        let report = run("citizenship_details", &record);
        assert_eq!(
            report.message_for(Field::NaturalizationDate),
            Some("Date of naturalization cannot be before the date of birth")
        );
    }

    #[test]
    fn test_assistor_relationship_needed_only_with_assistor() {
        let mut record = ApplicationRecord::default();
        assert!(run("special_sector_details", &record).is_valid());
        record.sector.assistor_name = Some("Pedro Penduko".into());
        assert_eq!(
            run("special_sector_details", &record).fields(),
            vec![Field::AssistorRelationship]
        );
    }

    #[test]
    fn test_correction_values_must_differ() {
        let record = ApplicationRecord {
            application: Some(ApplicationBranch::CorrectionOfEntry(Correction {
                target_field: Some("lastName".into()),
                current_value: Some("Dela Cruz".into()),
                requested_value: Some(" Dela Cruz ".into()),
            })),
            ..ApplicationRecord::default()
        };
        assert_eq!(
            run("correction_values_differ", &record).fields(),
            vec![Field::RequestedValue]
        );
    }

    #[test]
    fn test_transfer_with_reactivation_needs_origin_and_reason() {
        let branch = TransferWithReactivation::default();
        let mut report = ValidationReport::new();
        validate_transfer_with_reactivation(&branch, &mut report);
        assert_eq!(
            report.fields(),
            vec![Field::TransferType, Field::ReasonForDeactivation]
        );

        let branch = TransferWithReactivation {
            reason_for_deactivation: Some(DeactivationReason::ExclusionOrder),
            origin: Some(TransferOrigin::FromAnotherCity(Default::default())),
            ..TransferWithReactivation::default()
        };
        let mut report = ValidationReport::new();
        validate_transfer_with_reactivation(&branch, &mut report);
        assert_eq!(
            report.fields(),
            vec![
                Field::PreviousPrecinctNumber,
                Field::PreviousBarangay,
                Field::PreviousCityMunicipality,
            ]
        );
    }
}
