// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod billing;
mod booking_validation;
mod calendar;
mod error;
mod occupancy;
mod phase;
mod records;
mod rotation_config;
mod season;
mod selection;
mod time_periods;
mod types;
mod usage;
mod validation;

#[cfg(test)]
mod tests;

pub use billing::{
    BillingBreakdown, BillingConfig, BillingMethod, BillingResult, DayCharge, MAX_GUESTS,
    StayDates, StayParams, calculate_from_daily_occupancy, calculate_stay_billing,
};
pub use booking_validation::{
    BookingContext, BookingRequest, BookingValidation, night_limits, validate_booking,
};
pub use calendar::{
    NOON, add_days, at_noon, date_in_timezone, dates_in_range, first_weekday_on_or_after,
    format_date, nights_between, normalize_to_noon, parse_date, parse_timezone,
    today_in_timezone,
};
pub use occupancy::{OccupancyEntry, OccupancyUpdate, prepare_occupancy_update};
pub use phase::{RotationProgress, SelectionPhase};
pub use records::{CheckInSession, DailyOccupancy, Payment, Reservation};
pub use rotation_config::RotationConfig;
pub use season::{
    BILLING_CASCADE, BillingSource, BillingStrategy, SeasonConfig, SeasonRecords, SeasonStay,
    SeasonSummary, SeasonTotals, SeasonWindow, StayInputs, missing_check_ins, price_stay,
    summarize_season,
};
pub use selection::{
    FamilySelectionStatus, FamilyStatus, SecondaryTurnState, StatusInputs,
    generate_family_statuses, next_incomplete_family, next_secondary_family, secondary_order,
};
pub use time_periods::{TimePeriodWindow, calculate_time_period_windows};
pub use usage::{
    TimePeriodUsage, UsageCorrection, UsageInfo, plan_usage_reconciliation, usage_info,
};

// Re-export public types
pub use error::DomainError;
pub use types::{Contact, FamilyGroup, HostMember, RotationScope, SelectionRound};
pub use validation::{
    validate_color, validate_family_group_fields, validate_family_group_unique,
    validate_rotation_order,
};
