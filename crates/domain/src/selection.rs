// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Turn order and per-family selection status.
//!
//! The primary round walks the rotation order, wrapping circularly, and
//! skips families whose turn is already completed. The secondary round
//! walks the reversed order once, without wrapping, and skips families
//! whose secondary allowance is used up.

use crate::phase::SelectionPhase;
use crate::usage::TimePeriodUsage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Selection status of a family within the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyStatus {
    /// It is this family's turn.
    Active,
    /// The family has finished selecting for this phase.
    Completed,
    /// The family has not had its turn yet.
    Waiting,
}

impl FamilyStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Waiting => "waiting",
        }
    }
}

impl std::fmt::Display for FamilyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One family's entry in the selection status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySelectionStatus {
    /// The family group name.
    pub family_group: String,
    /// The family's status in the current phase.
    pub status: FamilyStatus,
    /// 1-based position in the phase's turn order.
    pub position: usize,
    /// Periods used in the current phase.
    pub periods_used: u32,
    /// Periods allowed in the current phase.
    pub periods_allowed: u32,
}

/// State of the secondary round as stored on the rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecondaryTurnState {
    /// The family whose secondary turn is active.
    pub current_family: Option<String>,
    /// Whether a secondary round is running.
    pub round_active: bool,
}

/// Inputs to status derivation besides the phase.
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs<'a> {
    /// Family group names in rotation order.
    pub rotation_order: &'a [String],
    /// All usage rows for the rotation year.
    pub usage: &'a [TimePeriodUsage],
    /// The authoritative primary turn pointer.
    pub current_primary_turn_family: Option<&'a str>,
    /// Secondary round state.
    pub secondary: &'a SecondaryTurnState,
    /// Families with an active day-based selection extension.
    pub extended_families: &'a HashSet<String>,
}

/// Returns the rotation order reversed, as used by the secondary round.
#[must_use]
pub fn secondary_order(rotation_order: &[String]) -> Vec<String> {
    rotation_order.iter().rev().cloned().collect()
}

/// Finds the next family whose primary turn is not completed.
///
/// The scan starts immediately after `current` and wraps around the
/// rotation order. When `current` is `None` or not in the order, the scan
/// starts at the first family. Returns `None` once every family is in
/// `completed`.
#[must_use]
pub fn next_incomplete_family(
    rotation_order: &[String],
    current: Option<&str>,
    completed: &HashSet<String>,
) -> Option<String> {
    let len: usize = rotation_order.len();
    if len == 0 {
        return None;
    }

    let start: usize = current
        .and_then(|name| rotation_order.iter().position(|family| family == name))
        .map_or(0, |index| index + 1);

    (0..len)
        .map(|offset| &rotation_order[(start + offset) % len])
        .find(|family| !completed.contains(*family))
        .cloned()
}

/// Finds the next family in the secondary round.
///
/// Walks the reversed rotation order after `current` without wrapping and
/// returns the first family that still has secondary allowance left. A
/// family without a usage row has no allowance. When `current` is `None`
/// the walk starts at the first family of the reversed order.
#[must_use]
pub fn next_secondary_family(
    rotation_order: &[String],
    current: Option<&str>,
    usage: &[TimePeriodUsage],
) -> Option<String> {
    let reversed: Vec<String> = secondary_order(rotation_order);

    let start: usize = match current {
        Some(name) => match reversed.iter().position(|family| family == name) {
            Some(index) => index + 1,
            None => return None,
        },
        None => 0,
    };

    reversed.into_iter().skip(start).find(|family| {
        usage
            .iter()
            .find(|row| &row.family_group == family)
            .is_some_and(|row| !row.secondary_exhausted())
    })
}

/// Derives each family's status for the given phase.
///
/// The post-rotation phase reuses primary derivation: no family holds the
/// pointer, so each family is either completed or waiting.
#[must_use]
pub fn generate_family_statuses(
    phase: SelectionPhase,
    inputs: &StatusInputs<'_>,
) -> Vec<FamilySelectionStatus> {
    match phase {
        SelectionPhase::Primary | SelectionPhase::PostRotation => primary_statuses(inputs),
        SelectionPhase::Secondary => secondary_statuses(inputs),
    }
}

fn find_usage<'a>(usage: &'a [TimePeriodUsage], family: &str) -> Option<&'a TimePeriodUsage> {
    usage.iter().find(|row| row.family_group == family)
}

fn primary_statuses(inputs: &StatusInputs<'_>) -> Vec<FamilySelectionStatus> {
    inputs
        .rotation_order
        .iter()
        .enumerate()
        .map(|(index, family)| {
            let row: Option<&TimePeriodUsage> = find_usage(inputs.usage, family);
            let (used, allowed): (u32, u32) =
                row.map_or((0, 0), |r| (r.time_periods_used, r.time_periods_allowed));

            let is_current: bool = inputs.current_primary_turn_family == Some(family.as_str());
            let status: FamilyStatus = if is_current {
                FamilyStatus::Active
            } else if row.is_some_and(TimePeriodUsage::primary_exhausted)
                && !inputs.extended_families.contains(family)
            {
                FamilyStatus::Completed
            } else {
                FamilyStatus::Waiting
            };

            FamilySelectionStatus {
                family_group: family.clone(),
                status,
                position: index + 1,
                periods_used: used,
                periods_allowed: allowed,
            }
        })
        .collect()
}

fn secondary_statuses(inputs: &StatusInputs<'_>) -> Vec<FamilySelectionStatus> {
    let reversed: Vec<String> = secondary_order(inputs.rotation_order);
    let active_family: Option<&str> = inputs.secondary.current_family.as_deref();
    let active_index: Option<usize> =
        active_family.and_then(|name| reversed.iter().position(|family| family == name));

    reversed
        .iter()
        .enumerate()
        .map(|(index, family)| {
            let row: Option<&TimePeriodUsage> = find_usage(inputs.usage, family);
            let (used, allowed): (u32, u32) = row.map_or((0, 0), |r| {
                (r.secondary_periods_used, r.secondary_periods_allowed)
            });

            let status: FamilyStatus = if row.is_some_and(TimePeriodUsage::secondary_exhausted) {
                FamilyStatus::Completed
            } else if active_family == Some(family.as_str()) {
                FamilyStatus::Active
            } else if inputs.secondary.round_active && active_index.is_some_and(|i| index < i) {
                FamilyStatus::Completed
            } else {
                FamilyStatus::Waiting
            };

            FamilySelectionStatus {
                family_group: family.clone(),
                status,
                position: index + 1,
                periods_used: used,
                periods_allowed: allowed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RotationScope;

    fn order(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    fn usage_row(family: &str, used: u32, allowed: u32) -> TimePeriodUsage {
        let mut row = TimePeriodUsage::new(RotationScope::new(1, 2026), family, allowed);
        row.time_periods_used = used;
        row
    }

    fn secondary_row(family: &str, used: u32, allowed: u32) -> TimePeriodUsage {
        let mut row = usage_row(family, 1, 1);
        row.secondary_periods_used = used;
        row.secondary_periods_allowed = allowed;
        row
    }

    #[test]
    fn test_next_incomplete_visits_every_family_once() {
        for len in 1..=6_usize {
            let names: Vec<String> = (0..len).map(|i| format!("Family{i}")).collect();
            for start in 0..len {
                let mut completed: HashSet<String> = HashSet::new();
                let mut visited: Vec<String> = Vec::new();
                let mut current: String = names[start].clone();
                loop {
                    visited.push(current.clone());
                    completed.insert(current.clone());
                    match next_incomplete_family(&names, Some(current.as_str()), &completed) {
                        Some(next) => current = next,
                        None => break,
                    }
                }
                assert_eq!(visited.len(), len);
                let unique: HashSet<&String> = visited.iter().collect();
                assert_eq!(unique.len(), len);
            }
        }
    }

    #[test]
    fn test_next_incomplete_wraps_around() {
        let names = order(&["A", "B", "C"]);
        let completed: HashSet<String> = HashSet::from([String::from("C")]);
        assert_eq!(
            next_incomplete_family(&names, Some("C"), &completed),
            Some(String::from("A"))
        );
    }

    #[test]
    fn test_next_incomplete_skips_completed() {
        let names = order(&["A", "B", "C"]);
        let completed: HashSet<String> = HashSet::from([String::from("A"), String::from("B")]);
        assert_eq!(
            next_incomplete_family(&names, Some("A"), &completed),
            Some(String::from("C"))
        );
    }

    #[test]
    fn test_next_incomplete_without_pointer_starts_at_first() {
        let names = order(&["A", "B"]);
        assert_eq!(
            next_incomplete_family(&names, None, &HashSet::new()),
            Some(String::from("A"))
        );
        assert_eq!(next_incomplete_family(&[], None, &HashSet::new()), None);
    }

    #[test]
    fn test_next_secondary_family_does_not_wrap() {
        let names = order(&["A", "B", "C"]);
        let usage = vec![
            secondary_row("A", 0, 1),
            secondary_row("B", 1, 1),
            secondary_row("C", 0, 1),
        ];
        // Reversed order is C, B, A.
        assert_eq!(
            next_secondary_family(&names, None, &usage),
            Some(String::from("C"))
        );
        assert_eq!(
            next_secondary_family(&names, Some("C"), &usage),
            Some(String::from("A"))
        );
        assert_eq!(next_secondary_family(&names, Some("A"), &usage), None);
    }

    #[test]
    fn test_primary_statuses() {
        let names = order(&["A", "B", "C"]);
        let usage = vec![usage_row("A", 2, 2), usage_row("B", 0, 2)];
        let secondary = SecondaryTurnState::default();
        let extended = HashSet::new();
        let inputs = StatusInputs {
            rotation_order: &names,
            usage: &usage,
            current_primary_turn_family: Some("B"),
            secondary: &secondary,
            extended_families: &extended,
        };

        let statuses = generate_family_statuses(SelectionPhase::Primary, &inputs);
        let derived: Vec<FamilyStatus> = statuses.iter().map(|s| s.status).collect();
        assert_eq!(
            derived,
            vec![
                FamilyStatus::Completed,
                FamilyStatus::Active,
                FamilyStatus::Waiting
            ]
        );
        assert_eq!(statuses[0].periods_used, 2);
        assert_eq!(statuses[2].position, 3);
    }

    #[test]
    fn test_active_extension_keeps_exhausted_family_waiting() {
        let names = order(&["A", "B"]);
        let usage = vec![usage_row("A", 2, 2)];
        let secondary = SecondaryTurnState::default();
        let extended = HashSet::from([String::from("A")]);
        let inputs = StatusInputs {
            rotation_order: &names,
            usage: &usage,
            current_primary_turn_family: Some("B"),
            secondary: &secondary,
            extended_families: &extended,
        };

        let statuses = generate_family_statuses(SelectionPhase::Primary, &inputs);
        assert_eq!(statuses[0].status, FamilyStatus::Waiting);
    }

    #[test]
    fn test_secondary_statuses_use_reversed_order() {
        let names = order(&["A", "B", "C", "D"]);
        let usage = vec![
            secondary_row("A", 0, 1),
            secondary_row("B", 0, 1),
            secondary_row("C", 0, 1),
            secondary_row("D", 0, 1),
        ];
        let secondary = SecondaryTurnState {
            current_family: Some(String::from("B")),
            round_active: true,
        };
        let extended = HashSet::new();
        let inputs = StatusInputs {
            rotation_order: &names,
            usage: &usage,
            current_primary_turn_family: None,
            secondary: &secondary,
            extended_families: &extended,
        };

        let statuses = generate_family_statuses(SelectionPhase::Secondary, &inputs);
        let derived: Vec<(&str, FamilyStatus)> = statuses
            .iter()
            .map(|s| (s.family_group.as_str(), s.status))
            .collect();
        assert_eq!(
            derived,
            vec![
                ("D", FamilyStatus::Completed),
                ("C", FamilyStatus::Completed),
                ("B", FamilyStatus::Active),
                ("A", FamilyStatus::Waiting),
            ]
        );
    }

    #[test]
    fn test_secondary_exhausted_family_is_completed_regardless_of_pointer() {
        let names = order(&["A", "B"]);
        let usage = vec![secondary_row("A", 1, 1), secondary_row("B", 0, 1)];
        let secondary = SecondaryTurnState {
            current_family: Some(String::from("A")),
            round_active: true,
        };
        let extended = HashSet::new();
        let inputs = StatusInputs {
            rotation_order: &names,
            usage: &usage,
            current_primary_turn_family: Some("A"),
            secondary: &secondary,
            extended_families: &extended,
        };

        let statuses = generate_family_statuses(SelectionPhase::Secondary, &inputs);
        let a = statuses.iter().find(|s| s.family_group == "A");
        assert_eq!(a.map(|s| s.status), Some(FamilyStatus::Completed));
    }
}
