// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Family group name is empty or invalid.
    InvalidFamilyGroupName(String),
    /// Family group name is not unique within the organization.
    DuplicateFamilyGroup {
        /// The organization in which the duplicate was found.
        organization_id: i64,
        /// The duplicate name.
        name: String,
    },
    /// Family group does not exist.
    FamilyGroupNotFound {
        /// The organization that was searched.
        organization_id: i64,
        /// The requested family group name.
        name: String,
    },
    /// Family group display color is not a `#RRGGBB` value.
    InvalidColor(String),
    /// A host member record is invalid.
    InvalidHostMember {
        /// The member's name.
        member: String,
        /// Description of the problem.
        reason: String,
    },
    /// Rotation configuration violates its invariants.
    InvalidRotationConfig {
        /// Description of the violated rule.
        reason: String,
    },
    /// The rotation order contains the same family more than once.
    DuplicateRotationEntry(String),
    /// Selection round string is not recognized.
    InvalidSelectionRound(String),
    /// Selection phase string is not recognized.
    InvalidSelectionPhase(String),
    /// Billing method string is not recognized.
    InvalidBillingMethod(String),
    /// Billing configuration violates its invariants.
    InvalidBillingConfig {
        /// Description of the violated rule.
        reason: String,
    },
    /// Season configuration violates its invariants.
    InvalidSeasonConfig {
        /// Description of the violated rule.
        reason: String,
    },
    /// Timezone name could not be resolved.
    InvalidTimezone(String),
    /// A date range does not end after it starts.
    InvalidDateRange {
        /// The range start.
        start: time::Date,
        /// The range end.
        end: time::Date,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse date from string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A billing amount does not fit in its integer type.
    BillingOverflow {
        /// The amount being computed.
        operation: String,
    },
    /// An occupancy entry is invalid.
    InvalidOccupancy {
        /// Description of the problem.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFamilyGroupName(msg) => write!(f, "Invalid family group name: {msg}"),
            Self::DuplicateFamilyGroup {
                organization_id,
                name,
            } => {
                write!(
                    f,
                    "Family group '{name}' already exists in organization {organization_id}"
                )
            }
            Self::FamilyGroupNotFound {
                organization_id,
                name,
            } => {
                write!(
                    f,
                    "Family group '{name}' not found in organization {organization_id}"
                )
            }
            Self::InvalidColor(color) => {
                write!(f, "Invalid color '{color}': expected #RRGGBB")
            }
            Self::InvalidHostMember { member, reason } => {
                write!(f, "Invalid host member '{member}': {reason}")
            }
            Self::InvalidRotationConfig { reason } => {
                write!(f, "Invalid rotation configuration: {reason}")
            }
            Self::DuplicateRotationEntry(name) => {
                write!(f, "Family group '{name}' appears more than once in the rotation order")
            }
            Self::InvalidSelectionRound(round) => write!(f, "Invalid selection round: {round}"),
            Self::InvalidSelectionPhase(phase) => write!(f, "Invalid selection phase: {phase}"),
            Self::InvalidBillingMethod(method) => write!(f, "Invalid billing method: {method}"),
            Self::InvalidBillingConfig { reason } => {
                write!(f, "Invalid billing configuration: {reason}")
            }
            Self::InvalidSeasonConfig { reason } => {
                write!(f, "Invalid season configuration: {reason}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::InvalidDateRange { start, end } => {
                write!(
                    f,
                    "Invalid date range: check-out {end} must be after check-in {start}"
                )
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::BillingOverflow { operation } => {
                write!(f, "Billing amount overflow while computing {operation}")
            }
            Self::InvalidOccupancy { reason } => write!(f, "Invalid occupancy: {reason}"),
        }
    }
}

impl std::error::Error for DomainError {}
