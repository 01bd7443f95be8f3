// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor roles and authorization checks.
//!
//! Authentication happens upstream; the API only receives the caller's id
//! and role and decides whether the action is permitted.

use crate::error::AuthError;
use std::str::FromStr;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Organization administrators.
    ///
    /// Admins may:
    /// - save rotation, billing and season configuration
    /// - manage family groups and the rotation order
    /// - extend selection windows and generate secondary periods
    /// - reconcile usage and record payments
    /// - book outside the rotation rules (admin override)
    Admin,
    /// Family members. Members may book within the rules, advance the
    /// selection turn and read state.
    Member,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{other}'"),
            }),
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }
}

/// Role checks for API operations.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming `action` if the actor is not
    /// an admin.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Member => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks that the actor may request an admin override of the booking rules.
    ///
    /// Requests without an override are always permitted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` if an override is requested by a non-admin.
    pub fn authorize_booking(
        actor: &AuthenticatedActor,
        admin_override: bool,
    ) -> Result<(), AuthError> {
        if admin_override {
            Self::authorize_admin(actor, "admin_override")
        } else {
            Ok(())
        }
    }
}
