// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The `(organization, rotation year)` pair every rotation operation is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RotationScope {
    /// The owning organization.
    pub organization_id: i64,
    /// The rotation year (e.g., 2026).
    pub rotation_year: i32,
}

impl RotationScope {
    /// Creates a new rotation scope.
    #[must_use]
    pub const fn new(organization_id: i64, rotation_year: i32) -> Self {
        Self {
            organization_id,
            rotation_year,
        }
    }
}

impl std::fmt::Display for RotationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "organization={},rotation_year={}",
            self.organization_id, self.rotation_year
        )
    }
}

/// Contact details for a family lead or host member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A member of a family group who may host stays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMember {
    /// The member's name and contact details.
    pub contact: Contact,
    /// Whether this member may host a reservation.
    pub can_host: bool,
}

/// A family group sharing the property.
///
/// The name is the family group's identity within its organization; the
/// rotation order, usage rows and reservations all refer to it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyGroup {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the family group has not been persisted yet.
    pub family_group_id: Option<i64>,
    /// The owning organization.
    pub organization_id: i64,
    /// Display name, unique within the organization.
    pub name: String,
    /// Lead contact.
    pub lead: Option<Contact>,
    /// Host members, in display order.
    pub host_members: Vec<HostMember>,
    /// Display color (`#RRGGBB`).
    pub color: Option<String>,
}

impl FamilyGroup {
    /// Creates a new, unpersisted family group with no members.
    #[must_use]
    pub fn new(organization_id: i64, name: &str) -> Self {
        Self {
            family_group_id: None,
            organization_id,
            name: name.trim().to_string(),
            lead: None,
            host_members: Vec::new(),
            color: None,
        }
    }

    /// The contact notified when this family's selection turn opens.
    ///
    /// The lead contact wins; otherwise the first host-eligible member.
    #[must_use]
    pub fn notification_contact(&self) -> Option<&Contact> {
        self.lead.as_ref().or_else(|| {
            self.host_members
                .iter()
                .find(|member| member.can_host)
                .map(|member| &member.contact)
        })
    }
}

/// The selection round a usage row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRound {
    /// The first pass through the rotation order.
    #[default]
    Primary,
    /// The reversed second pass.
    Secondary,
}

impl SelectionRound {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl FromStr for SelectionRound {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            _ => Err(DomainError::InvalidSelectionRound(s.to_string())),
        }
    }
}

impl std::fmt::Display for SelectionRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
