// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-organization rotation configuration.
//!
//! There is one configuration per organization. It is read at the time each
//! operation runs, so edits take effect on the next window calculation or
//! validation without any versioning.

use crate::calendar::parse_timezone;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use time::Weekday;

/// Rotation rules for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Day of week every time period window starts on.
    pub start_day: Weekday,
    /// Time periods each family may claim per rotation year.
    pub max_time_slots: u32,
    /// Length in nights of a single time period window.
    pub max_nights: u32,
    /// Minimum nights for a single booking (primary and secondary).
    pub min_nights_per_booking: u32,
    /// Maximum consecutive nights for one booking during primary selection.
    pub max_consecutive_nights_primary: u32,
    /// Maximum consecutive nights for one booking during secondary selection.
    pub max_consecutive_nights_secondary: u32,
    /// Optional budget of total primary-phase nights per family.
    pub total_nights_allowed_primary: Option<u32>,
    /// Minimum nights for a booking after the rotation has finished.
    pub post_rotation_min_nights: u32,
    /// Maximum consecutive nights for a booking after the rotation has finished.
    pub post_rotation_max_consecutive_nights: u32,
    /// Whether a reversed secondary round follows the primary round.
    pub enable_secondary_selection: bool,
    /// Whether open booking is allowed once the rotation has finished.
    pub enable_post_rotation_selection: bool,
    /// Days a family has to make its primary selection once its turn opens.
    pub primary_selection_days: u32,
    /// Days a family has to make its secondary selection once its turn opens.
    pub secondary_selection_days: u32,
    /// Secondary periods each family may claim.
    pub secondary_max_periods: u32,
    /// IANA timezone of the property, used to determine "today".
    pub timezone: String,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            start_day: Weekday::Friday,
            max_time_slots: 2,
            max_nights: 7,
            min_nights_per_booking: 1,
            max_consecutive_nights_primary: 7,
            max_consecutive_nights_secondary: 7,
            total_nights_allowed_primary: None,
            post_rotation_min_nights: 1,
            post_rotation_max_consecutive_nights: 7,
            enable_secondary_selection: false,
            enable_post_rotation_selection: false,
            primary_selection_days: 14,
            secondary_selection_days: 7,
            secondary_max_periods: 1,
            timezone: String::from("America/New_York"),
        }
    }
}

impl RotationConfig {
    /// Whether both the secondary and the post-rotation phases are enabled.
    ///
    /// When true, any family may book any window; window ownership and
    /// usage caps are not enforced by booking validation.
    #[must_use]
    pub const fn all_phases_active(&self) -> bool {
        self.enable_secondary_selection && self.enable_post_rotation_selection
    }

    /// Validates the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `max_nights` is zero
    /// - `min_nights_per_booking` exceeds `max_consecutive_nights_primary`
    /// - `post_rotation_min_nights` exceeds `post_rotation_max_consecutive_nights`
    /// - the timezone is unknown
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_nights == 0 {
            return Err(DomainError::InvalidRotationConfig {
                reason: String::from("max_nights must be greater than 0"),
            });
        }

        if self.min_nights_per_booking > self.max_consecutive_nights_primary {
            return Err(DomainError::InvalidRotationConfig {
                reason: format!(
                    "min_nights_per_booking ({}) exceeds max_consecutive_nights_primary ({})",
                    self.min_nights_per_booking, self.max_consecutive_nights_primary
                ),
            });
        }

        if self.post_rotation_min_nights > self.post_rotation_max_consecutive_nights {
            return Err(DomainError::InvalidRotationConfig {
                reason: format!(
                    "post_rotation_min_nights ({}) exceeds post_rotation_max_consecutive_nights ({})",
                    self.post_rotation_min_nights, self.post_rotation_max_consecutive_nights
                ),
            });
        }

        parse_timezone(&self.timezone)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RotationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_min_nights_above_max_rejected() {
        let config = RotationConfig {
            min_nights_per_booking: 8,
            max_consecutive_nights_primary: 7,
            ..RotationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DomainError::InvalidRotationConfig { .. })
        ));
    }

    #[test]
    fn test_zero_window_length_rejected() {
        let config = RotationConfig {
            max_nights: 0,
            ..RotationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let config = RotationConfig {
            timezone: String::from("Nowhere/Special"),
            ..RotationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DomainError::InvalidTimezone(String::from("Nowhere/Special")))
        );
    }

    #[test]
    fn test_all_phases_active_requires_both_flags() {
        let mut config = RotationConfig {
            enable_secondary_selection: true,
            ..RotationConfig::default()
        };
        assert!(!config.all_phases_active());
        config.enable_post_rotation_selection = true;
        assert!(config.all_phases_active());
    }
}
