// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time period window calculation.
//!
//! A time period window is a contiguous block of `max_nights` nights,
//! noon to noon, starting on the configured start day of the week. Windows
//! are derived for one viewed month at a time and are never persisted.
//!
//! ## Invariants
//!
//! - Windows within a month are contiguous and never overlap
//! - Every window spans exactly `max_nights` days
//! - `period_number` starts at 1 and strictly increases
//! - Families are assigned round-robin from the rotation order
//! - Only the current year and the two following years are generated
//!
//! ## Example
//!
//! ```text
//! start_day = Friday, max_nights = 7, order = [Adams, Baker, Clark]
//! July 2026:
//!   #1 Fri Jul  3 12:00 → Fri Jul 10 12:00  Adams
//!   #2 Fri Jul 10 12:00 → Fri Jul 17 12:00  Baker
//!   #3 Fri Jul 17 12:00 → Fri Jul 24 12:00  Clark
//!   #4 Fri Jul 24 12:00 → Fri Jul 31 12:00  Adams
//!   #5 Fri Jul 31 12:00 → Fri Aug  7 12:00  Baker
//! ```

use crate::calendar::{add_days, at_noon, first_weekday_on_or_after, normalize_to_noon};
use crate::error::DomainError;
use crate::rotation_config::RotationConfig;
use serde::{Deserialize, Serialize};
use time::{Date, Month, PrimitiveDateTime};

/// Number of years past the current year that windows are generated for.
const FUTURE_YEARS: i32 = 2;

/// A derived block of nights assigned to one family group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriodWindow {
    /// Window start (noon), inclusive.
    pub start: PrimitiveDateTime,
    /// Window end (noon), exclusive.
    pub end: PrimitiveDateTime,
    /// The family group the window is assigned to.
    pub family_group: String,
    /// 1-based sequence number within the viewed month.
    pub period_number: u32,
    /// Window generation never marks a window unavailable; seat availability
    /// is checked separately against reservations.
    pub available: bool,
}

impl TimePeriodWindow {
    /// Whether the half-open range `[start, end)` overlaps this window.
    #[must_use]
    pub fn overlaps(&self, start: PrimitiveDateTime, end: PrimitiveDateTime) -> bool {
        start < self.end && end > self.start
    }

    /// The same window with both bounds moved to noon.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            start: normalize_to_noon(self.start),
            end: normalize_to_noon(self.end),
            family_group: self.family_group.clone(),
            period_number: self.period_number,
            available: self.available,
        }
    }

    /// Whether this window fully contains `[start, end]`.
    #[must_use]
    pub fn contains(&self, start: PrimitiveDateTime, end: PrimitiveDateTime) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Calculates the time period windows starting in the viewed month.
///
/// # Arguments
///
/// * `config` - The organization's rotation configuration
/// * `rotation_order` - Family group names in rotation order
/// * `current_year` - The current calendar year
/// * `year` - The year being viewed
/// * `month` - The month being viewed
///
/// # Returns
///
/// The windows whose start falls in the viewed month, or an empty vector if
/// the year is outside `[current_year, current_year + 2]`, the rotation order
/// is empty, or `max_nights` is zero.
///
/// # Errors
///
/// Returns an error if date arithmetic overflows.
pub fn calculate_time_period_windows(
    config: &RotationConfig,
    rotation_order: &[String],
    current_year: i32,
    year: i32,
    month: Month,
) -> Result<Vec<TimePeriodWindow>, DomainError> {
    if year < current_year || year > current_year + FUTURE_YEARS {
        return Ok(Vec::new());
    }
    if rotation_order.is_empty() || config.max_nights == 0 {
        return Ok(Vec::new());
    }

    let month_start: Date = Date::from_calendar_date(year, month, 1).map_err(|e| {
        DomainError::DateParseError {
            date_string: format!("{year}-{month}-01"),
            error: e.to_string(),
        }
    })?;

    let mut window_start: Date = first_weekday_on_or_after(month_start, config.start_day)?;
    let window_length: i64 = i64::from(config.max_nights);

    let mut windows: Vec<TimePeriodWindow> = Vec::new();
    let mut period_number: u32 = 1;

    while window_start.month() == month && window_start.year() == year {
        let window_end: Date = add_days(window_start, window_length)?;
        let family_index: usize = (period_number as usize - 1) % rotation_order.len();

        windows.push(TimePeriodWindow {
            start: at_noon(window_start),
            end: at_noon(window_end),
            family_group: rotation_order[family_index].clone(),
            period_number,
            available: true,
        });

        window_start = window_end;
        period_number += 1;
    }

    Ok(windows)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::Weekday;
    use time::macros::{date, datetime};

    fn order() -> Vec<String> {
        vec![
            String::from("Adams"),
            String::from("Baker"),
            String::from("Clark"),
        ]
    }

    fn friday_config(max_nights: u32) -> RotationConfig {
        RotationConfig {
            start_day: Weekday::Friday,
            max_nights,
            ..RotationConfig::default()
        }
    }

    #[test]
    fn test_windows_start_on_first_configured_weekday() {
        let windows =
            calculate_time_period_windows(&friday_config(7), &order(), 2026, 2026, Month::July)
                .unwrap();

        assert_eq!(windows.len(), 5);
        assert_eq!(windows[0].start, datetime!(2026-07-03 12:00));
        assert_eq!(windows[0].end, datetime!(2026-07-10 12:00));
        assert_eq!(windows[4].start, datetime!(2026-07-31 12:00));
        // The last window may run into the following month.
        assert_eq!(windows[4].end, datetime!(2026-08-07 12:00));
    }

    #[test]
    fn test_families_assigned_round_robin() {
        let windows =
            calculate_time_period_windows(&friday_config(7), &order(), 2026, 2026, Month::July)
                .unwrap();

        let families: Vec<&str> = windows.iter().map(|w| w.family_group.as_str()).collect();
        assert_eq!(families, vec!["Adams", "Baker", "Clark", "Adams", "Baker"]);
        let numbers: Vec<u32> = windows.iter().map(|w| w.period_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(windows.iter().all(|w| w.available));
    }

    #[test]
    fn test_windows_never_overlap_and_have_configured_length() {
        for max_nights in [3_u32, 4, 7, 10, 14] {
            for month in [Month::January, Month::February, Month::June, Month::December] {
                let windows = calculate_time_period_windows(
                    &friday_config(max_nights),
                    &order(),
                    2026,
                    2027,
                    month,
                )
                .unwrap();

                assert!(!windows.is_empty());
                for window in &windows {
                    assert_eq!(
                        (window.end - window.start).whole_days(),
                        i64::from(max_nights)
                    );
                }
                for pair in windows.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                    assert!(!pair[0].overlaps(pair[1].start, pair[1].end));
                }
            }
        }
    }

    #[test]
    fn test_year_range_is_limited() {
        let config = friday_config(7);
        assert!(
            calculate_time_period_windows(&config, &order(), 2026, 2025, Month::July)
                .unwrap()
                .is_empty()
        );
        assert!(
            calculate_time_period_windows(&config, &order(), 2026, 2029, Month::July)
                .unwrap()
                .is_empty()
        );
        assert!(
            !calculate_time_period_windows(&config, &order(), 2026, 2028, Month::July)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_empty_rotation_order_yields_no_windows() {
        let windows =
            calculate_time_period_windows(&friday_config(7), &[], 2026, 2026, Month::July)
                .unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_month_starting_on_start_day() {
        // 2026-05-01 is a Friday
        let windows =
            calculate_time_period_windows(&friday_config(7), &order(), 2026, 2026, Month::May)
                .unwrap();
        assert_eq!(windows[0].start.date(), date!(2026 - 05 - 01));
    }

    #[test]
    fn test_overlap_and_containment() {
        let window = TimePeriodWindow {
            start: datetime!(2026-07-03 12:00),
            end: datetime!(2026-07-10 12:00),
            family_group: String::from("Adams"),
            period_number: 1,
            available: true,
        };
        assert!(window.contains(datetime!(2026-07-03 12:00), datetime!(2026-07-10 12:00)));
        assert!(window.overlaps(datetime!(2026-07-01 12:00), datetime!(2026-07-05 12:00)));
        assert!(!window.contains(datetime!(2026-07-01 12:00), datetime!(2026-07-05 12:00)));
        assert!(!window.overlaps(datetime!(2026-07-10 12:00), datetime!(2026-07-12 12:00)));
    }
}
