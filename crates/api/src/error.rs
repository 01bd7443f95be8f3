// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use cabin_rotation::CoreError;
use cabin_rotation_domain::DomainError;
use cabin_rotation_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The state changed underneath the request. Reload and retry.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Whether the caller may retry after reloading state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidFamilyGroupName(_) => invalid("name", message),
        DomainError::DuplicateFamilyGroup { .. } => ApiError::DomainRuleViolation {
            rule: String::from("unique_family_group"),
            message,
        },
        DomainError::FamilyGroupNotFound { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Family group"),
            message,
        },
        DomainError::InvalidColor(_) => invalid("color", message),
        DomainError::InvalidHostMember { .. } => invalid("host_members", message),
        DomainError::InvalidRotationConfig { .. } => invalid("rotation_config", message),
        DomainError::DuplicateRotationEntry(_) => ApiError::DomainRuleViolation {
            rule: String::from("unique_rotation_entry"),
            message,
        },
        DomainError::InvalidSelectionRound(_) => invalid("selection_round", message),
        DomainError::InvalidSelectionPhase(_) => invalid("phase", message),
        DomainError::InvalidBillingMethod(_) => invalid("method", message),
        DomainError::InvalidBillingConfig { .. } => invalid("billing_config", message),
        DomainError::InvalidSeasonConfig { .. } => invalid("season_config", message),
        DomainError::InvalidTimezone(_) => invalid("timezone", message),
        DomainError::InvalidDateRange { .. } => invalid("date_range", message),
        DomainError::DateArithmeticOverflow { .. } | DomainError::DateParseError { .. } => {
            invalid("date", message)
        }
        DomainError::InvalidOccupancy { .. } => invalid("daily_occupancy", message),
        DomainError::BillingOverflow { .. } => invalid("guests", message),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let message: String = err.to_string();
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Store { message } => ApiError::Internal { message },
        CoreError::TurnConflict(_) => ApiError::Conflict { message },
        CoreError::ConfigurationNotLoaded { what, .. } => ApiError::ResourceNotFound {
            resource_type: format!("{} configuration", capitalize(what)),
            message,
        },
        CoreError::RotationOrderNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Rotation order"),
            message,
        },
        CoreError::NoActiveTurn(_) => ApiError::DomainRuleViolation {
            rule: String::from("active_turn"),
            message,
        },
        CoreError::InvalidPhaseForAdvance(_) => ApiError::DomainRuleViolation {
            rule: String::from("advance_phase"),
            message,
        },
        CoreError::SecondarySelectionDisabled(_) => ApiError::DomainRuleViolation {
            rule: String::from("secondary_selection_enabled"),
            message,
        },
        CoreError::PaymentNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Payment"),
            message,
        },
        CoreError::ReservationNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Reservation"),
            message,
        },
    }
}

/// Wraps a persistence failure as an internal error with context.
pub(crate) fn persistence_error(context: &str, err: &PersistenceError) -> ApiError {
    ApiError::Internal {
        message: format!("{context}: {err}"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
