//! Application review status and its transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Application Status
// ============================================================================

/// Review status of a submitted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Submitted, awaiting an officer
    Pending,
    /// Documents checked by an officer
    Verified,
    /// Accepted; a voter record exists
    Approved,
    /// Rejected with a reason
    Disapproved,
}

impl ApplicationStatus {
    pub const ALL: &'static [ApplicationStatus] = &[
        ApplicationStatus::Pending,
        ApplicationStatus::Verified,
        ApplicationStatus::Approved,
        ApplicationStatus::Disapproved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Verified => "verified",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Disapproved => "disapproved",
        }
    }

    /// Statuses reachable in one step. Every status except `Pending` may revert to it.
    pub fn valid_transitions(&self) -> &'static [ApplicationStatus] {
        match self {
            ApplicationStatus::Pending => &[ApplicationStatus::Verified],
            ApplicationStatus::Verified => &[
                ApplicationStatus::Approved,
                ApplicationStatus::Disapproved,
                ApplicationStatus::Pending,
            ],
            ApplicationStatus::Approved => &[ApplicationStatus::Pending],
            ApplicationStatus::Disapproved => &[ApplicationStatus::Pending],
        }
    }

    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Decided statuses; leaving them is a revert.
    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Disapproved
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when parsing an ApplicationStatus from string.
#[derive(Debug, Error, Clone)]
#[error("invalid application status: {0}")]
pub struct StatusParseError(String);

impl std::str::FromStr for ApplicationStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "verified" => Ok(ApplicationStatus::Verified),
            "approved" => Ok(ApplicationStatus::Approved),
            "disapproved" => Ok(ApplicationStatus::Disapproved),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

// ============================================================================
// Status Transition - history entry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl StatusTransition {
    pub fn new(from: ApplicationStatus, to: ApplicationStatus) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
            reason: None,
            actor: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// A compensating transition is a revert that was not asked for.
    pub fn is_rollback(&self) -> bool {
        self.reason
            .as_deref()
            .map_or(false, |r| r.starts_with(ROLLBACK_PREFIX))
    }
}

pub(crate) const ROLLBACK_PREFIX: &str = "ROLLBACK: ";
