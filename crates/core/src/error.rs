// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cabin_rotation_domain::{DomainError, RotationScope, SelectionPhase};

/// Errors that can occur while running rotation and season services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The backing store failed.
    Store {
        /// Description of the failure.
        message: String,
    },
    /// The turn pointer moved since it was read. Reload and retry.
    TurnConflict(RotationScope),
    /// A required per-organization configuration has not been saved.
    ConfigurationNotLoaded {
        /// The organization.
        organization_id: i64,
        /// Which configuration is missing.
        what: &'static str,
    },
    /// No rotation order exists for the scope.
    RotationOrderNotFound(RotationScope),
    /// No family currently holds a turn.
    NoActiveTurn(RotationScope),
    /// Selection cannot be advanced in this phase.
    InvalidPhaseForAdvance(SelectionPhase),
    /// Secondary selection is disabled for the organization.
    SecondarySelectionDisabled(i64),
    /// The payment does not exist.
    PaymentNotFound(i64),
    /// The reservation does not exist.
    ReservationNotFound(i64),
}

impl CoreError {
    /// Whether repeating the operation after reloading state may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TurnConflict(_))
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Store { message } => write!(f, "Store error: {message}"),
            Self::TurnConflict(scope) => write!(
                f,
                "Selection turn for {scope} was changed concurrently; reload and retry"
            ),
            Self::ConfigurationNotLoaded {
                organization_id,
                what,
            } => write!(
                f,
                "No {what} configuration saved for organization {organization_id}"
            ),
            Self::RotationOrderNotFound(scope) => {
                write!(f, "No rotation order exists for {scope}")
            }
            Self::NoActiveTurn(scope) => write!(f, "No family holds a selection turn for {scope}"),
            Self::InvalidPhaseForAdvance(phase) => {
                write!(f, "Selection cannot be advanced during the {phase} phase")
            }
            Self::SecondarySelectionDisabled(organization_id) => write!(
                f,
                "Secondary selection is disabled for organization {organization_id}"
            ),
            Self::PaymentNotFound(id) => write!(f, "Payment {id} not found"),
            Self::ReservationNotFound(id) => write!(f, "Reservation {id} not found"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
