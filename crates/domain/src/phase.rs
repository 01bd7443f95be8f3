// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Selection phase derivation.
//!
//! The phase is computed once per operation from the rotation progress and
//! then passed to validation, status derivation and usage lookup. There is
//! no reverse transition within a rotation year.
//!
//! ```text
//! Primary ──(all families turn_completed, secondary enabled, periods generated)──▶ Secondary
//!    │                                                                               │
//!    └──(all complete, post-rotation enabled, no active secondary round)──▶ PostRotation ◀┘
//! ```

use crate::error::DomainError;
use crate::rotation_config::RotationConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The selection phase a rotation year is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPhase {
    /// Families select in rotation order, one turn at a time.
    Primary,
    /// Families select in reversed rotation order.
    Secondary,
    /// The rotation is finished; any family may book open windows.
    PostRotation,
}

/// Observed progress of a rotation year, as read from the usage and order stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationProgress {
    /// Every family in the rotation order has `turn_completed = true`.
    pub all_primary_complete: bool,
    /// Secondary period allowances have been generated for the year.
    pub secondary_periods_generated: bool,
    /// A secondary round is currently running.
    pub secondary_round_active: bool,
}

impl SelectionPhase {
    /// Returns the string representation of the phase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::PostRotation => "post_rotation",
        }
    }

    /// Human-readable label used in validation messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Primary => "primary selection",
            Self::Secondary => "secondary selection",
            Self::PostRotation => "post-rotation booking",
        }
    }

    /// Determines the current phase from configuration and progress.
    #[must_use]
    pub const fn determine(config: &RotationConfig, progress: &RotationProgress) -> Self {
        if !progress.all_primary_complete {
            return Self::Primary;
        }

        if config.enable_secondary_selection && progress.secondary_periods_generated {
            if progress.secondary_round_active || !config.enable_post_rotation_selection {
                return Self::Secondary;
            }
            return Self::PostRotation;
        }

        if config.enable_secondary_selection {
            // Waiting for secondary periods to be generated.
            return Self::Primary;
        }

        if config.enable_post_rotation_selection {
            return Self::PostRotation;
        }

        Self::Primary
    }
}

impl FromStr for SelectionPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "post_rotation" => Ok(Self::PostRotation),
            _ => Err(DomainError::InvalidSelectionPhase(s.to_string())),
        }
    }
}

impl std::fmt::Display for SelectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secondary: bool, post_rotation: bool) -> RotationConfig {
        RotationConfig {
            enable_secondary_selection: secondary,
            enable_post_rotation_selection: post_rotation,
            ..RotationConfig::default()
        }
    }

    const fn progress(primary_done: bool, generated: bool, active: bool) -> RotationProgress {
        RotationProgress {
            all_primary_complete: primary_done,
            secondary_periods_generated: generated,
            secondary_round_active: active,
        }
    }

    #[test]
    fn test_incomplete_primary_is_always_primary() {
        for (secondary, post) in [(false, false), (true, false), (false, true), (true, true)] {
            assert_eq!(
                SelectionPhase::determine(&config(secondary, post), &progress(false, true, true)),
                SelectionPhase::Primary
            );
        }
    }

    #[test]
    fn test_secondary_requires_generated_periods() {
        let cfg = config(true, false);
        assert_eq!(
            SelectionPhase::determine(&cfg, &progress(true, false, false)),
            SelectionPhase::Primary
        );
        assert_eq!(
            SelectionPhase::determine(&cfg, &progress(true, true, true)),
            SelectionPhase::Secondary
        );
    }

    #[test]
    fn test_finished_secondary_round_moves_to_post_rotation() {
        let cfg = config(true, true);
        assert_eq!(
            SelectionPhase::determine(&cfg, &progress(true, true, true)),
            SelectionPhase::Secondary
        );
        assert_eq!(
            SelectionPhase::determine(&cfg, &progress(true, true, false)),
            SelectionPhase::PostRotation
        );
    }

    #[test]
    fn test_post_rotation_without_secondary() {
        assert_eq!(
            SelectionPhase::determine(&config(false, true), &progress(true, false, false)),
            SelectionPhase::PostRotation
        );
    }

    #[test]
    fn test_phase_string_round_trip() {
        for phase in [
            SelectionPhase::Primary,
            SelectionPhase::Secondary,
            SelectionPhase::PostRotation,
        ] {
            assert_eq!(phase.as_str().parse::<SelectionPhase>(), Ok(phase));
        }
        assert!("tertiary".parse::<SelectionPhase>().is_err());
    }
}
