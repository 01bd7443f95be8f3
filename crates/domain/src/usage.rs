// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time period usage tracking.
//!
//! One usage row exists per `(organization, rotation year, family group)`.
//! Rows are created lazily on the first booking or reconciliation, bumped on
//! every booking, and corrected by reconciliation when they drift from the
//! reservations actually on the books.

use crate::phase::SelectionPhase;
use crate::rotation_config::RotationConfig;
use crate::types::{RotationScope, SelectionRound};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A family's time period consumption for a rotation year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriodUsage {
    /// The canonical row identifier; `None` until persisted.
    pub usage_id: Option<i64>,
    /// The scope this row belongs to.
    pub scope: RotationScope,
    /// The family group name.
    pub family_group: String,
    /// Primary time periods consumed.
    pub time_periods_used: u32,
    /// Primary time periods allowed.
    pub time_periods_allowed: u32,
    /// Secondary periods consumed.
    pub secondary_periods_used: u32,
    /// Secondary periods allowed (zero until secondary periods are generated).
    pub secondary_periods_allowed: u32,
    /// Whether the family's primary turn has been completed.
    pub turn_completed: bool,
    /// The round the family is currently selecting in.
    pub selection_round: SelectionRound,
}

impl TimePeriodUsage {
    /// Creates a fresh usage row with the configured primary allowance.
    #[must_use]
    pub fn new(scope: RotationScope, family_group: &str, time_periods_allowed: u32) -> Self {
        Self {
            usage_id: None,
            scope,
            family_group: family_group.to_string(),
            time_periods_used: 0,
            time_periods_allowed,
            secondary_periods_used: 0,
            secondary_periods_allowed: 0,
            turn_completed: false,
            selection_round: SelectionRound::Primary,
        }
    }

    /// Whether the primary allowance has been consumed.
    #[must_use]
    pub const fn primary_exhausted(&self) -> bool {
        self.time_periods_used >= self.time_periods_allowed
    }

    /// Whether the secondary allowance has been consumed.
    #[must_use]
    pub const fn secondary_exhausted(&self) -> bool {
        self.secondary_periods_used >= self.secondary_periods_allowed
    }
}

/// Used / allowed / remaining counts for one family in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub used: u32,
    pub allowed: u32,
    pub remaining: u32,
}

/// Phase-dependent usage lookup for a family.
///
/// Returns `None` when the rotation configuration has not been loaded. A
/// family without a usage row is reported with nothing used and the
/// configured default allowance.
#[must_use]
pub fn usage_info(
    config: Option<&RotationConfig>,
    phase: SelectionPhase,
    usage: Option<&TimePeriodUsage>,
) -> Option<UsageInfo> {
    let config: &RotationConfig = config?;

    let (used, allowed): (u32, u32) = match (phase, usage) {
        (SelectionPhase::Secondary, Some(row)) => {
            (row.secondary_periods_used, row.secondary_periods_allowed)
        }
        (SelectionPhase::Secondary, None) => (0, config.secondary_max_periods),
        (_, Some(row)) => (row.time_periods_used, row.time_periods_allowed),
        (_, None) => (0, config.max_time_slots),
    };

    Some(UsageInfo {
        used,
        allowed,
        remaining: allowed.saturating_sub(used),
    })
}

/// A correction produced by usage reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageCorrection {
    /// No row existed for the family; one must be created.
    Create(TimePeriodUsage),
    /// An existing row's primary usage drifted from the reservations.
    UpdateUsed {
        /// The row to update.
        usage_id: i64,
        /// The family group, for logging.
        family_group: String,
        /// The value currently stored.
        previous: u32,
        /// The value recomputed from reservations.
        actual: u32,
    },
}

/// Computes the corrections needed to bring usage rows in line with reservations.
///
/// `reservation_counts` maps family group name to the number of primary-round
/// reservations that family holds in the rotation year. Only
/// `time_periods_used` is ever corrected; turn completion flags and the turn
/// pointer are left alone so reconciliation cannot move a running turn.
#[must_use]
pub fn plan_usage_reconciliation(
    scope: RotationScope,
    config: &RotationConfig,
    rotation_order: &[String],
    existing: &[TimePeriodUsage],
    reservation_counts: &HashMap<String, u32>,
) -> Vec<UsageCorrection> {
    let mut corrections: Vec<UsageCorrection> = Vec::new();

    for family in rotation_order {
        let actual: u32 = reservation_counts.get(family).copied().unwrap_or(0);

        match existing.iter().find(|row| &row.family_group == family) {
            Some(row) => match row.usage_id {
                Some(usage_id) if row.time_periods_used != actual => {
                    corrections.push(UsageCorrection::UpdateUsed {
                        usage_id,
                        family_group: family.clone(),
                        previous: row.time_periods_used,
                        actual,
                    });
                }
                _ => {}
            },
            None => {
                let mut row: TimePeriodUsage =
                    TimePeriodUsage::new(scope, family, config.max_time_slots);
                row.time_periods_used = actual;
                corrections.push(UsageCorrection::Create(row));
            }
        }
    }

    corrections
}
