//! Validation rule engine: per-field base rules, then the cross-field table.
//!
//! Validation is a pure function of the record and a reference date. The
//! report keeps at most one message per field; base rules run first and
//! cross-field rules follow in [`crate::rules::CROSS_FIELD_RULES`] order, so
//! the earliest failing rule wins.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::field::Field;
use crate::record::ApplicationRecord;
use crate::rules::{ResidencyMinimum, RuleContext, CROSS_FIELD_RULES};

/// Longest accepted value for any name field.
pub const MAX_NAME_LEN: usize = 100;

static MOBILE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(09\d{9}|\+639\d{9})$").expect("static mobile number pattern"));

static EMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email address pattern")
});

/// One field-level message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: Field,
    pub message: String,
}

/// Field-level failures collected from a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<FieldFailure>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure unless the field already has one.
    ///
    /// Returns `false` when the message was dropped.
    pub fn push(&mut self, field: Field, message: impl Into<String>) -> bool {
        if self.contains(field) {
            return false;
        }
        self.failures.push(FieldFailure {
            field,
            message: message.into(),
        });
        true
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn fields(&self) -> Vec<Field> {
        self.failures.iter().map(|f| f.field).collect()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.failures.iter().any(|f| f.field == field)
    }

    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.failures
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }

    pub fn into_failures(self) -> Vec<FieldFailure> {
        self.failures
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no validation failures");
        }
        write!(f, "{} field(s) failed validation", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.field, failure.message)?;
        }
        Ok(())
    }
}

/// Validates records against a fixed reference date.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    today: NaiveDate,
    residency_minimum: Option<ResidencyMinimum>,
}

impl Validator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            residency_minimum: None,
        }
    }

    /// Also enforce a minimum residence on address-bearing applications.
    pub fn with_residency_minimum(mut self, minimum: Option<ResidencyMinimum>) -> Self {
        self.residency_minimum = minimum;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn validate(&self, record: &ApplicationRecord) -> ValidationReport {
        let mut report = ValidationReport::new();
        check_base_rules(record, self.today, &mut report);

        let context = RuleContext {
            today: self.today,
            residency_minimum: self.residency_minimum,
        };
        for rule in CROSS_FIELD_RULES {
            (rule.check)(record, &context, &mut report);
        }
        report
    }
}

/// Validate against the local calendar date.
pub fn validate(record: &ApplicationRecord) -> ValidationReport {
    Validator::new(Local::now().date_naive()).validate(record)
}

pub(crate) fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

pub(crate) fn required_message(field: Field) -> String {
    format!("{} is required", field.label())
}

/// Push a "required" failure for a blank text field.
pub(crate) fn require_text(report: &mut ValidationReport, field: Field, value: Option<&String>) {
    if is_blank(value) {
        report.push(field, required_message(field));
    }
}

pub(crate) fn require<T>(report: &mut ValidationReport, field: Field, value: Option<T>) {
    if value.is_none() {
        report.push(field, required_message(field));
    }
}

fn always_required_text(record: &ApplicationRecord) -> [(Field, Option<&String>); 8] {
    let identity = &record.identity;
    let parents = &record.parents;
    [
        (Field::FirstName, identity.first_name.as_ref()),
        (Field::LastName, identity.last_name.as_ref()),
        (
            Field::PlaceOfBirthMunicipality,
            identity.place_of_birth_municipality.as_ref(),
        ),
        (
            Field::PlaceOfBirthProvince,
            identity.place_of_birth_province.as_ref(),
        ),
        (Field::FatherFirstName, parents.father_first_name.as_ref()),
        (Field::FatherLastName, parents.father_last_name.as_ref()),
        (Field::MotherFirstName, parents.mother_first_name.as_ref()),
        (Field::MotherLastName, parents.mother_last_name.as_ref()),
    ]
}

fn name_fields(record: &ApplicationRecord) -> [(Field, Option<&String>); 8] {
    let identity = &record.identity;
    let parents = &record.parents;
    [
        (Field::FirstName, identity.first_name.as_ref()),
        (Field::LastName, identity.last_name.as_ref()),
        (Field::MiddleName, identity.middle_name.as_ref()),
        (Field::Suffix, identity.suffix.as_ref()),
        (Field::FatherFirstName, parents.father_first_name.as_ref()),
        (Field::FatherLastName, parents.father_last_name.as_ref()),
        (Field::MotherFirstName, parents.mother_first_name.as_ref()),
        (Field::MotherLastName, parents.mother_last_name.as_ref()),
    ]
}

/// Static per-field classification, independent of any discriminant.
fn check_base_rules(record: &ApplicationRecord, today: NaiveDate, report: &mut ValidationReport) {
    for (field, value) in always_required_text(record) {
        require_text(report, field, value);
    }

    for (field, value) in name_fields(record) {
        if let Some(value) = value {
            if value.trim().chars().count() > MAX_NAME_LEN {
                report.push(
                    field,
                    format!("{} must be at most {} characters", field.label(), MAX_NAME_LEN),
                );
            }
        }
    }

    require(report, Field::Sex, record.identity.sex);

    match record.identity.date_of_birth {
        None => {
            report.push(Field::DateOfBirth, required_message(Field::DateOfBirth));
        }
        Some(dob) if dob > today => {
            report.push(Field::DateOfBirth, "Date of birth cannot be in the future");
        }
        Some(_) => {}
    }

    require(report, Field::CitizenshipType, record.citizenship.as_ref());
    require(report, Field::CivilStatus, record.civil.as_ref());

    if let Some(number) = record.contact.contact_number.as_ref() {
        let number = number.trim();
        if !number.is_empty() && !MOBILE_NUMBER.is_match(number) {
            report.push(
                Field::ContactNumber,
                "Contact number must be 09XXXXXXXXX or +639XXXXXXXXX",
            );
        }
    }

    if let Some(email) = record.contact.email_address.as_ref() {
        let email = email.trim();
        if !email.is_empty() && !EMAIL_ADDRESS.is_match(email) {
            report.push(Field::EmailAddress, "Enter a valid email address");
        }
    }
}
