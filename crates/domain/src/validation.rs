// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::FamilyGroup;
use std::collections::HashSet;

/// Validates that a family group's own fields are well formed.
///
/// This function does NOT check for uniqueness (that requires context).
///
/// # Arguments
///
/// * `family_group` - The family group to validate
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty after trimming
/// - The color is present and not `#RRGGBB`
/// - A host member has an empty name
/// - Hosts are listed but no host-eligible member has an email
pub fn validate_family_group_fields(family_group: &FamilyGroup) -> Result<(), DomainError> {
    if family_group.name.trim().is_empty() {
        return Err(DomainError::InvalidFamilyGroupName(String::from(
            "Family group name cannot be empty",
        )));
    }

    if let Some(color) = &family_group.color {
        validate_color(color)?;
    }

    for member in &family_group.host_members {
        if member.contact.name.trim().is_empty() {
            return Err(DomainError::InvalidHostMember {
                member: member.contact.name.clone(),
                reason: String::from("Host member name cannot be empty"),
            });
        }
    }

    if !family_group.host_members.is_empty() {
        let reachable: bool = family_group
            .host_members
            .iter()
            .any(|member| member.can_host && member.contact.email.is_some());
        if !reachable {
            return Err(DomainError::InvalidHostMember {
                member: family_group.name.clone(),
                reason: String::from("At least one host-eligible member must have an email"),
            });
        }
    }

    Ok(())
}

/// Validates a `#RRGGBB` display color.
///
/// # Errors
///
/// Returns `DomainError::InvalidColor` for anything else.
pub fn validate_color(color: &str) -> Result<(), DomainError> {
    let valid: bool = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidColor(color.to_string()))
    }
}

/// Validates that a family group name is unique within its organization.
///
/// Comparison is case-insensitive and ignores surrounding whitespace.
///
/// # Errors
///
/// Returns `DomainError::DuplicateFamilyGroup` if the name is taken.
pub fn validate_family_group_unique(
    family_group: &FamilyGroup,
    existing: &[FamilyGroup],
) -> Result<(), DomainError> {
    let name: String = family_group.name.trim().to_lowercase();
    let taken: bool = existing.iter().any(|other| {
        other.organization_id == family_group.organization_id
            && other.family_group_id != family_group.family_group_id
            && other.name.trim().to_lowercase() == name
    });

    if taken {
        return Err(DomainError::DuplicateFamilyGroup {
            organization_id: family_group.organization_id,
            name: family_group.name.clone(),
        });
    }
    Ok(())
}

/// Validates a rotation order against the organization's family groups.
///
/// # Errors
///
/// Returns an error if a name appears twice or does not name a family group.
pub fn validate_rotation_order(
    organization_id: i64,
    rotation_order: &[String],
    family_groups: &[FamilyGroup],
) -> Result<(), DomainError> {
    let known: HashSet<&str> = family_groups.iter().map(|fg| fg.name.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    for name in rotation_order {
        if !seen.insert(name.as_str()) {
            return Err(DomainError::DuplicateRotationEntry(name.clone()));
        }
        if !known.contains(name.as_str()) {
            return Err(DomainError::FamilyGroupNotFound {
                organization_id,
                name: name.clone(),
            });
        }
    }
    Ok(())
}
