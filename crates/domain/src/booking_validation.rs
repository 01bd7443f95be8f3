// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking validation against time period windows.
//!
//! Validation is pure and synchronous: the windows, usage row and phase are
//! computed beforehand and passed in. Failures are collected as
//! human-readable messages; several rules may fail at once, except that a
//! missing window stops validation immediately.
//!
//! ## Rules (in order)
//!
//! 0. Check-out must come after check-in. Terminal on failure, and not
//!    subject to the admin override.
//! 1. The dates must overlap a window (owned by the family unless the
//!    override or all-phases mode is active). Terminal on failure.
//! 2. The booking must lie inside that window.
//! 3. The night count must be within the phase's minimum and maximum.
//! 4. Primary phase: previously booked plus requested nights must fit the
//!    total-nights budget.
//! 5. The family must have an unused time period left.
//!
//! The admin override skips rules 3, 4 and 5 as well as window ownership.

use crate::calendar::{nights_between, normalize_to_noon};
use crate::error::DomainError;
use crate::phase::SelectionPhase;
use crate::rotation_config::RotationConfig;
use crate::time_periods::TimePeriodWindow;
use crate::usage::TimePeriodUsage;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// A proposed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Check-in. Only the date is significant.
    pub start: PrimitiveDateTime,
    /// Check-out. Only the date is significant.
    pub end: PrimitiveDateTime,
    /// The requesting family group.
    pub family_group: String,
}

/// Everything validation needs besides the request and the windows.
#[derive(Debug, Clone, Copy)]
pub struct BookingContext<'a> {
    /// The organization's rotation configuration.
    pub config: &'a RotationConfig,
    /// The phase the rotation year is in.
    pub phase: SelectionPhase,
    /// The family's usage row, if one exists yet.
    pub usage: Option<&'a TimePeriodUsage>,
    /// Nights the family already holds in primary-round reservations.
    pub nights_already_booked: u32,
    /// Whether an administrator is overriding the rotation rules.
    pub admin_override: bool,
}

/// Outcome of booking validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// Period number of the matched window, if one was found.
    pub matched_period: Option<u32>,
    /// Nights requested.
    pub nights: u32,
}

impl BookingValidation {
    fn from_errors(errors: Vec<String>, matched_period: Option<u32>, nights: u32) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            matched_period,
            nights,
        }
    }
}

/// Minimum and maximum nights for a single booking in the given phase.
#[must_use]
pub const fn night_limits(config: &RotationConfig, phase: SelectionPhase) -> (u32, u32) {
    match phase {
        SelectionPhase::Primary => (
            config.min_nights_per_booking,
            config.max_consecutive_nights_primary,
        ),
        SelectionPhase::Secondary => (
            config.min_nights_per_booking,
            config.max_consecutive_nights_secondary,
        ),
        SelectionPhase::PostRotation => (
            config.post_rotation_min_nights,
            config.post_rotation_max_consecutive_nights,
        ),
    }
}

/// Validates a proposed booking against the time period windows.
///
/// Time of day on both the request and the windows is discarded; all
/// comparisons happen at noon.
#[must_use]
pub fn validate_booking(
    request: &BookingRequest,
    windows: &[TimePeriodWindow],
    context: &BookingContext<'_>,
) -> BookingValidation {
    let start: PrimitiveDateTime = normalize_to_noon(request.start);
    let end: PrimitiveDateTime = normalize_to_noon(request.end);
    let nights: u32 = nights_between(start, end);

    let config: &RotationConfig = context.config;
    let open_booking: bool = context.admin_override || config.all_phases_active();

    if end <= start {
        return BookingValidation::from_errors(
            vec![
                DomainError::InvalidDateRange {
                    start: start.date(),
                    end: end.date(),
                }
                .to_string(),
            ],
            None,
            0,
        );
    }

    let mut errors: Vec<String> = Vec::new();

    // Rule 1: a window must cover the dates.
    let window: Option<TimePeriodWindow> = windows
        .iter()
        .map(TimePeriodWindow::normalized)
        .find(|window| {
            window.overlaps(start, end)
                && (open_booking || window.family_group == request.family_group)
        });

    let Some(window) = window else {
        let message: String = if open_booking {
            String::from("Selected dates do not fall within any available time period")
        } else {
            format!(
                "Selected dates do not fall within a time period assigned to {}",
                request.family_group
            )
        };
        return BookingValidation::from_errors(vec![message], None, nights);
    };

    // Rule 2: the booking must sit inside the window.
    if !window.contains(start, end) {
        if start < window.start {
            errors.push(format!(
                "Booking cannot start before the time period begins on {}",
                window.start.date()
            ));
        }
        if end > window.end {
            errors.push(format!(
                "Booking cannot extend past the end of the time period on {}",
                window.end.date()
            ));
        }
    }

    if !context.admin_override {
        // Rule 3: night count for the phase.
        let (min_nights, max_nights): (u32, u32) = night_limits(config, context.phase);
        if nights < min_nights {
            errors.push(format!(
                "Minimum stay is {min_nights} nights during {}",
                context.phase.label()
            ));
        }
        if nights > max_nights {
            errors.push(format!(
                "Maximum stay is {max_nights} consecutive nights during {}",
                context.phase.label()
            ));
        }

        // Rule 4: total-nights budget for the primary round.
        if let (SelectionPhase::Primary, Some(budget)) =
            (context.phase, config.total_nights_allowed_primary)
        {
            let total: u32 = context.nights_already_booked.saturating_add(nights);
            if total > budget {
                errors.push(format!(
                    "Booking would bring total primary nights to {total}, exceeding the allowance of {budget}"
                ));
            }
        }
    }

    // Rule 5: remaining time periods.
    if !open_booking {
        let (used, allowed): (u32, u32) = match (context.phase, context.usage) {
            (SelectionPhase::Secondary, Some(usage)) => {
                (usage.secondary_periods_used, usage.secondary_periods_allowed)
            }
            (SelectionPhase::Secondary, None) => (0, config.secondary_max_periods),
            (_, Some(usage)) => (usage.time_periods_used, usage.time_periods_allowed),
            (_, None) => (0, config.max_time_slots),
        };
        if used >= allowed {
            errors.push(format!(
                "You have already used all allocated time periods ({used}/{allowed})"
            ));
        }
    }

    BookingValidation::from_errors(errors, Some(window.period_number), nights)
}
