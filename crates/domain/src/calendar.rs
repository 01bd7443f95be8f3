// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar helpers shared by window generation, validation and billing.
//!
//! All rotation dates have date-only semantics. Wherever a time of day is
//! needed (window boundaries, booking comparison) it is pinned to noon, so
//! check-in and check-out both land on 12:00 and a night is exactly one day.

use crate::error::DomainError;
use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;
use time::macros::{format_description, time};
use time::{Date, Duration, PrimitiveDateTime, Time, Weekday};

/// Check-in / check-out time used for every window boundary.
pub const NOON: Time = time!(12:00);

/// Returns the given date at noon.
#[must_use]
pub const fn at_noon(date: Date) -> PrimitiveDateTime {
    PrimitiveDateTime::new(date, NOON)
}

/// Discards the time of day of `value` and pins it to noon.
#[must_use]
pub const fn normalize_to_noon(value: PrimitiveDateTime) -> PrimitiveDateTime {
    at_noon(value.date())
}

/// Adds a signed number of days to a date.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the result is out of range.
pub fn add_days(date: Date, days: i64) -> Result<Date, DomainError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("adding {days} days to {date}"),
        })
}

/// Number of nights between two instants, rounded up to whole days.
///
/// A zero or negative span yields zero.
#[must_use]
pub fn nights_between(start: PrimitiveDateTime, end: PrimitiveDateTime) -> u32 {
    let span: Duration = end - start;
    if span <= Duration::ZERO {
        return 0;
    }
    let whole_days: i64 = span.whole_days();
    let nights: i64 = if span > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    };
    u32::try_from(nights).unwrap_or(u32::MAX)
}

/// All calendar dates in the half-open range `[start, end)`.
#[must_use]
pub fn dates_in_range(start: Date, end: Date) -> Vec<Date> {
    let mut dates: Vec<Date> = Vec::new();
    let mut current: Date = start;
    while current < end {
        dates.push(current);
        match current.next_day() {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// Returns the first date on or after `from` that falls on `weekday`.
///
/// # Errors
///
/// Returns an error if the search runs past the supported calendar range.
pub fn first_weekday_on_or_after(from: Date, weekday: Weekday) -> Result<Date, DomainError> {
    let offset: i64 = i64::from(
        (7 + weekday.number_days_from_sunday() - from.weekday().number_days_from_sunday()) % 7,
    );
    add_days(from, offset)
}

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Formats a date as ISO 8601 (`YYYY-MM-DD`).
#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Resolves an IANA timezone name.
///
/// # Errors
///
/// Returns `DomainError::InvalidTimezone` if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// The calendar date of `instant` as observed in the timezone `tz_name`.
///
/// # Errors
///
/// Returns an error if the timezone is unknown or the date cannot be
/// represented.
pub fn date_in_timezone(
    tz_name: &str,
    instant: chrono::DateTime<chrono::Utc>,
) -> Result<Date, DomainError> {
    let tz: Tz = parse_timezone(tz_name)?;
    let local: chrono::NaiveDate = tz.from_utc_datetime(&instant.naive_utc()).date_naive();

    let month: u8 = u8::try_from(local.month()).map_err(|_| DomainError::DateArithmeticOverflow {
        operation: format!("converting month of {local}"),
    })?;
    let month: time::Month =
        time::Month::try_from(month).map_err(|e| DomainError::DateParseError {
            date_string: local.to_string(),
            error: e.to_string(),
        })?;
    let day: u8 = u8::try_from(local.day()).map_err(|_| DomainError::DateArithmeticOverflow {
        operation: format!("converting day of {local}"),
    })?;

    Date::from_calendar_date(local.year(), month, day).map_err(|e| DomainError::DateParseError {
        date_string: local.to_string(),
        error: e.to_string(),
    })
}

/// Today's date in the organization's timezone.
///
/// # Errors
///
/// Returns an error if the timezone is unknown.
pub fn today_in_timezone(tz_name: &str) -> Result<Date, DomainError> {
    date_in_timezone(tz_name, chrono::Utc::now())
}
