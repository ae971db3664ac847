//! Shared identifier wrappers for the voter registration portal.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error returned when parsing an identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

macro_rules! define_uuid_id {
    ($name:ident, $label:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(value)
                    .map_err(|e| IdParseError::new(format!("Invalid {}: {}", $label, e)))?;
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_uuid_id!(ActorId, "actor ID");
define_uuid_id!(IdentityId, "identity ID");

/// Application number minted by the backend when an application row is created.
///
/// The format is owned by the backend; the portal only requires it to be a
/// non-blank token without whitespace so it can be quoted in tracking links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationNumber(String);

impl ApplicationNumber {
    pub fn parse(value: &str) -> Result<Self, IdParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::new("Invalid application number: empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdParseError::new(format!(
                "Invalid application number: '{}' contains whitespace",
                value
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build the `<prefix>-<year>-<seq>` form used by the in-process backend.
    pub fn sequential(prefix: &str, year: i32, seq: u64) -> Self {
        Self(format!("{}-{}-{:06}", prefix, year, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ApplicationNumber {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_id_roundtrip() {
        let id = IdentityId::new();
        let parsed: IdentityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_uuid_id_rejects_garbage() {
        let err = ActorId::parse("not-a-uuid").unwrap_err();
        assert!(err.to_string().contains("actor ID"));
    }

    #[test]
    fn test_application_number_sequential_format() {
        let number = ApplicationNumber::sequential("VR", 2026, 42);
        assert_eq!(number.as_str(), "VR-2026-000042");
    }

    #[test]
    fn test_application_number_rejects_blank_and_whitespace() {
        assert!(ApplicationNumber::parse("   ").is_err());
        assert!(ApplicationNumber::parse("VR 2026").is_err());
        assert_eq!(
            ApplicationNumber::parse(" VR-1 ").unwrap().as_str(),
            "VR-1"
        );
    }

    #[test]
    fn test_serde_is_transparent() {
        let number = ApplicationNumber::parse("VR-2026-000001").unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"VR-2026-000001\"");
    }
}
