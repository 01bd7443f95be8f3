// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use cabin_rotation_domain::{
    RotationConfig, RotationProgress, RotationScope, SecondaryTurnState, SelectionPhase,
    TimePeriodUsage,
};
use serde::{Deserialize, Serialize};

/// The persisted turn state of a rotation year.
///
/// `current_primary_turn_family` is the authoritative primary pointer; the
/// family order is only consulted to find the next family when advancing.
/// Every change to either pointer bumps `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationOrderState {
    /// The scope this state belongs to.
    pub scope: RotationScope,
    /// Family group names in rotation order.
    pub family_order: Vec<String>,
    /// The family holding the primary turn, if any.
    pub current_primary_turn_family: Option<String>,
    /// The family holding the secondary turn, if any.
    pub current_secondary_turn_family: Option<String>,
    /// Whether a secondary round is running.
    pub secondary_round_active: bool,
    /// Whether secondary allowances have been generated.
    pub secondary_periods_generated: bool,
    /// Optimistic concurrency token.
    pub version: i64,
}

impl RotationOrderState {
    /// Creates a fresh order state with the primary turn at the first family.
    #[must_use]
    pub fn new(scope: RotationScope, family_order: Vec<String>) -> Self {
        let current_primary_turn_family: Option<String> = family_order.first().cloned();
        Self {
            scope,
            family_order,
            current_primary_turn_family,
            current_secondary_turn_family: None,
            secondary_round_active: false,
            secondary_periods_generated: false,
            version: 0,
        }
    }

    /// The secondary round portion of the state.
    #[must_use]
    pub fn secondary_turn(&self) -> SecondaryTurnState {
        SecondaryTurnState {
            current_family: self.current_secondary_turn_family.clone(),
            round_active: self.secondary_round_active,
        }
    }

    /// Progress of the rotation year given the family usage rows.
    ///
    /// An empty rotation order never counts as complete.
    #[must_use]
    pub fn progress(&self, usage: &[TimePeriodUsage]) -> RotationProgress {
        let all_primary_complete: bool = !self.family_order.is_empty()
            && self.family_order.iter().all(|family| {
                usage
                    .iter()
                    .any(|row| &row.family_group == family && row.turn_completed)
            });

        RotationProgress {
            all_primary_complete,
            secondary_periods_generated: self.secondary_periods_generated,
            secondary_round_active: self.secondary_round_active,
        }
    }

    /// Derives the selection phase.
    #[must_use]
    pub fn phase(&self, config: &RotationConfig, usage: &[TimePeriodUsage]) -> SelectionPhase {
        SelectionPhase::determine(config, &self.progress(usage))
    }
}
