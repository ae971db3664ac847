//! Field paths reported by validation and named by correction requests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::choices::ChoiceParseError;

macro_rules! define_fields {
    ( $( $variant:ident => $path:literal, $label:literal; )+ ) => {
        /// Every user-facing field of the application form.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Field {
            $( #[serde(rename = $path)] $variant, )+
        }

        impl Field {
            pub const ALL: &'static [Field] = &[$(Field::$variant),+];

            /// camelCase path as rendered by the form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Field::$variant => $path,)+
                }
            }

            /// Human-readable label used in messages.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Field::$variant => $label,)+
                }
            }
        }

        impl std::str::FromStr for Field {
            type Err = ChoiceParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($path => Ok(Field::$variant),)+
                    _ => Err(crate::choices::ChoiceParseError::field(s)),
                }
            }
        }
    };
}

define_fields! {
    // Identity
    FirstName => "firstName", "First name";
    LastName => "lastName", "Last name";
    MiddleName => "middleName", "Middle name";
    Suffix => "suffix", "Suffix";
    Sex => "sex", "Sex";
    DateOfBirth => "dateOfBirth", "Date of birth";
    PlaceOfBirthMunicipality => "placeOfBirthMunicipality", "Municipality of birth";
    PlaceOfBirthProvince => "placeOfBirthProvince", "Province of birth";

    // Citizenship
    CitizenshipType => "citizenshipType", "Citizenship";
    NaturalizationDate => "naturalizationDate", "Date of naturalization";
    NaturalizationCertNo => "naturalizationCertNo", "Naturalization certificate number";

    // Contact and civil status
    ContactNumber => "contactNumber", "Contact number";
    EmailAddress => "emailAddress", "Email address";
    CivilStatus => "civilStatus", "Civil status";
    SpouseName => "spouseName", "Spouse name";
    FatherFirstName => "fatherFirstName", "Father's first name";
    FatherLastName => "fatherLastName", "Father's last name";
    MotherFirstName => "motherFirstName", "Mother's first name";
    MotherLastName => "motherLastName", "Mother's maiden last name";

    // Special sector
    IsIlliterate => "isIlliterate", "Illiterate";
    IsSeniorCitizen => "isSeniorCitizen", "Senior citizen";
    IsIndigenousPerson => "isIndigenousPerson", "Indigenous person";
    Tribe => "tribe", "Tribe";
    IsPwd => "isPwd", "Person with disability";
    DisabilityType => "disabilityType", "Type of disability";
    AssistorName => "assistorName", "Assistor name";
    AssistorRelationship => "assistorRelationship", "Relationship to assistor";
    VoteOnGroundFloor => "voteOnGroundFloor", "Vote on ground floor";

    // Address
    HouseNumber => "houseNumber", "House number";
    Street => "street", "Street";
    Barangay => "barangay", "Barangay";
    CityMunicipality => "cityMunicipality", "City/municipality";
    Province => "province", "Province";
    YearsAtAddress => "yearsAtAddress", "Years at current address";
    MonthsAtAddress => "monthsAtAddress", "Months at current address";
    YearsInMunicipality => "yearsInMunicipality", "Years in city/municipality";
    MonthsInMunicipality => "monthsInMunicipality", "Months in city/municipality";
    YearsInCountry => "yearsInCountry", "Years in the Philippines";
    MonthsInCountry => "monthsInCountry", "Months in the Philippines";

    // Discriminant
    ApplicationType => "applicationType", "Application type";

    // Registration
    RegistrationType => "registrationType", "Registration type";
    RegularOathAccepted => "regularOathAccepted", "Oath of a regular voter";
    RegularRegistrationType => "regularRegistrationType", "Regular registration type";
    RegularVoterStatus => "regularVoterStatus", "Voter status";
    OathAccepted => "oathAccepted", "Katipunan oath";
    AdultRegistrationConsent => "adultRegistrationConsent", "Adult registration consent";
    DeclarationAccepted => "declarationAccepted", "Declaration";
    IdFrontPhoto => "idFrontPhoto", "Photo of ID (front)";
    IdSelfieUrl => "idSelfieUrl", "Selfie holding ID";

    // Transfer
    TransferType => "transferType", "Transfer type";
    PreviousPrecinctNumber => "previousPrecinctNumber", "Previous precinct number";
    PreviousBarangay => "previousBarangay", "Previous barangay";
    PreviousCityMunicipality => "previousCityMunicipality", "Previous city/municipality";
    PreviousProvince => "previousProvince", "Previous province";
    PreviousForeignPost => "previousForeignPost", "Previous foreign post";
    PreviousCountry => "previousCountry", "Previous country";

    // Reactivation
    ReasonForDeactivation => "reasonForDeactivation", "Reason for deactivation";

    // Correction of entry
    TargetField => "targetField", "Entry to correct";
    CurrentValue => "currentValue", "Current value";
    RequestedValue => "requestedValue", "Requested value";

    // Reinstatement
    ReinstatementType => "reinstatementType", "Reinstatement type";
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
