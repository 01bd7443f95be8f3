// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Season billing reconciliation.
//!
//! A season summary walks a family's reservations in the season window and
//! prices each one from the most authoritative data available. Sources are
//! tried in a fixed order and the first one that applies wins; results are
//! never blended.
//!
//! | # | Source              | Applies when                                   |
//! |---|---------------------|------------------------------------------------|
//! | 1 | Upcoming            | stay starts after today (zero, not totaled)    |
//! | 2 | Daily occupancy     | payment has recorded occupancy                 |
//! | 3 | Locked amount       | payment is locked with an amount               |
//! | 4 | Payment amount      | payment has any amount                         |
//! | 5 | Awaiting data       | payment exists with nothing usable (zero)      |
//! | 6 | Check-in sessions   | no payment, check-ins recorded                 |
//! | 7 | Reservation estimate| no payment at all                              |

use crate::billing::{
    BillingConfig, BillingResult, StayDates, StayParams, calculate_from_daily_occupancy,
    calculate_stay_billing,
};
use crate::calendar::{add_days, dates_in_range};
use crate::error::DomainError;
use crate::records::{CheckInSession, Payment, Reservation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::{Date, Month};

/// Configurable season boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonConfig {
    pub start_month: u8,
    pub start_day: u8,
    pub end_month: u8,
    pub end_day: u8,
    /// Days after the season end that payment is due.
    pub payment_deadline_offset_days: i64,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            start_month: 5,
            start_day: 1,
            end_month: 10,
            end_day: 31,
            payment_deadline_offset_days: 30,
        }
    }
}

/// A resolved season for one year. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    pub start: Date,
    pub end: Date,
    pub payment_deadline: Date,
}

fn month_day(year: i32, month: u8, day: u8) -> Result<Date, DomainError> {
    let month: Month = Month::try_from(month).map_err(|e| DomainError::InvalidSeasonConfig {
        reason: format!("invalid month {month}: {e}"),
    })?;
    Date::from_calendar_date(year, month, day).map_err(|e| DomainError::InvalidSeasonConfig {
        reason: format!("invalid day {day} for {month}: {e}"),
    })
}

impl SeasonConfig {
    /// Resolves the season that starts in `year`.
    ///
    /// A season whose end month-day falls before its start month-day wraps
    /// into the following year.
    ///
    /// # Errors
    ///
    /// Returns an error if a month-day does not exist in the target year.
    pub fn window(&self, year: i32) -> Result<SeasonWindow, DomainError> {
        let start: Date = month_day(year, self.start_month, self.start_day)?;
        let wraps: bool = (self.end_month, self.end_day) < (self.start_month, self.start_day);
        let end_year: i32 = if wraps { year + 1 } else { year };
        let end: Date = month_day(end_year, self.end_month, self.end_day)?;
        let payment_deadline: Date = add_days(end, self.payment_deadline_offset_days)?;

        Ok(SeasonWindow {
            start,
            end,
            payment_deadline,
        })
    }

    /// Validates the configuration against a non-leap reference year.
    ///
    /// # Errors
    ///
    /// Returns an error if either month-day is invalid or the offset is negative.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.payment_deadline_offset_days < 0 {
            return Err(DomainError::InvalidSeasonConfig {
                reason: String::from("payment deadline offset must not be negative"),
            });
        }
        self.window(2027).map(|_| ())
    }
}

/// Where a stay's billing total came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingSource {
    Upcoming,
    DailyOccupancy,
    LockedAmount,
    PaymentAmount,
    AwaitingData,
    CheckInSessions,
    ReservationEstimate,
}

impl BillingSource {
    /// Returns the string representation of the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::DailyOccupancy => "daily_occupancy",
            Self::LockedAmount => "locked_amount",
            Self::PaymentAmount => "payment_amount",
            Self::AwaitingData => "awaiting_data",
            Self::CheckInSessions => "check_in_sessions",
            Self::ReservationEstimate => "reservation_estimate",
        }
    }
}

/// Data available for pricing one stay.
#[derive(Debug, Clone, Copy)]
pub struct StayInputs<'a> {
    pub reservation: &'a Reservation,
    pub payment: Option<&'a Payment>,
    /// Check-in sessions for this reservation.
    pub sessions: &'a [CheckInSession],
    pub config: &'a BillingConfig,
    pub today: Date,
}

impl StayInputs<'_> {
    fn stay_dates(&self) -> StayDates {
        StayDates {
            start: self.reservation.start_date,
            end: self.reservation.end_date,
        }
    }
}

/// One entry in the billing cascade.
pub struct BillingStrategy {
    pub source: BillingSource,
    pub applies: fn(&StayInputs<'_>) -> bool,
    pub compute: fn(&StayInputs<'_>) -> Result<BillingResult, DomainError>,
}

impl std::fmt::Debug for BillingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingStrategy")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn stored_amount(payment: Option<&Payment>) -> Result<BillingResult, DomainError> {
    let total_cents: i64 = match payment {
        Some(p) => checked_cents(
            p.amount_cents.unwrap_or(0),
            p.manual_adjustment_cents,
            "adjusted amount",
        )?,
        None => 0,
    };
    Ok(BillingResult {
        total_cents,
        ..BillingResult::zero()
    })
}

fn checked_cents(left: i64, right: i64, operation: &str) -> Result<i64, DomainError> {
    left.checked_add(right).ok_or_else(|| DomainError::BillingOverflow {
        operation: operation.to_string(),
    })
}

fn is_upcoming(inputs: &StayInputs<'_>) -> bool {
    inputs.reservation.start_date > inputs.today
}

fn has_daily_occupancy(inputs: &StayInputs<'_>) -> bool {
    inputs.payment.is_some_and(|p| !p.daily_occupancy.is_empty())
}

fn has_locked_amount(inputs: &StayInputs<'_>) -> bool {
    inputs
        .payment
        .is_some_and(|p| p.billing_locked && p.amount_cents.is_some())
}

fn has_payment_amount(inputs: &StayInputs<'_>) -> bool {
    inputs.payment.is_some_and(|p| p.amount_cents.is_some())
}

fn has_payment(inputs: &StayInputs<'_>) -> bool {
    inputs.payment.is_some()
}

fn has_check_ins(inputs: &StayInputs<'_>) -> bool {
    inputs.payment.is_none() && !inputs.sessions.is_empty()
}

fn has_no_payment(inputs: &StayInputs<'_>) -> bool {
    inputs.payment.is_none()
}

#[allow(clippy::unnecessary_wraps)]
fn zero_total(_: &StayInputs<'_>) -> Result<BillingResult, DomainError> {
    Ok(BillingResult::zero())
}

fn from_daily_occupancy(inputs: &StayInputs<'_>) -> Result<BillingResult, DomainError> {
    let occupancy: BTreeMap<Date, u32> = inputs
        .payment
        .map(|p| {
            p.daily_occupancy
                .iter()
                .map(|day| (day.date, day.guests))
                .collect()
        })
        .unwrap_or_default();
    calculate_from_daily_occupancy(inputs.config, &occupancy, inputs.stay_dates())
}

fn from_stored_amount(inputs: &StayInputs<'_>) -> Result<BillingResult, DomainError> {
    stored_amount(inputs.payment)
}

fn from_check_ins(inputs: &StayInputs<'_>) -> Result<BillingResult, DomainError> {
    let mut occupancy: BTreeMap<Date, u32> = BTreeMap::new();
    for session in inputs.sessions {
        let guests: &mut u32 = occupancy.entry(session.check_date).or_insert(0);
        *guests = (*guests).max(session.guest_count);
    }
    calculate_from_daily_occupancy(inputs.config, &occupancy, inputs.stay_dates())
}

fn from_reservation(inputs: &StayInputs<'_>) -> Result<BillingResult, DomainError> {
    calculate_stay_billing(
        inputs.config,
        StayParams {
            guests: inputs.reservation.guest_count,
            nights: inputs.reservation.nights(),
            check_in: inputs.reservation.start_date,
            check_out: inputs.reservation.end_date,
        },
    )
}

/// Billing sources in priority order; the first applicable entry wins.
pub static BILLING_CASCADE: [BillingStrategy; 7] = [
    BillingStrategy {
        source: BillingSource::Upcoming,
        applies: is_upcoming,
        compute: zero_total,
    },
    BillingStrategy {
        source: BillingSource::DailyOccupancy,
        applies: has_daily_occupancy,
        compute: from_daily_occupancy,
    },
    BillingStrategy {
        source: BillingSource::LockedAmount,
        applies: has_locked_amount,
        compute: from_stored_amount,
    },
    BillingStrategy {
        source: BillingSource::PaymentAmount,
        applies: has_payment_amount,
        compute: from_stored_amount,
    },
    BillingStrategy {
        source: BillingSource::AwaitingData,
        applies: has_payment,
        compute: zero_total,
    },
    BillingStrategy {
        source: BillingSource::CheckInSessions,
        applies: has_check_ins,
        compute: from_check_ins,
    },
    BillingStrategy {
        source: BillingSource::ReservationEstimate,
        applies: has_no_payment,
        compute: from_reservation,
    },
];

/// Prices a stay with the first applicable billing source.
///
/// # Errors
///
/// Returns an error if the selected strategy fails to compute.
pub fn price_stay(inputs: &StayInputs<'_>) -> Result<(BillingSource, BillingResult), DomainError> {
    for strategy in &BILLING_CASCADE {
        if (strategy.applies)(inputs) {
            return Ok((strategy.source, (strategy.compute)(inputs)?));
        }
    }
    // The final two tiers cover payment present and absent.
    Ok((BillingSource::AwaitingData, BillingResult::zero()))
}

/// Nights of the stay without a recorded check-in.
#[must_use]
pub fn missing_check_ins(reservation: &Reservation, sessions: &[CheckInSession]) -> Vec<Date> {
    let checked: BTreeSet<Date> = sessions.iter().map(|s| s.check_date).collect();
    dates_in_range(reservation.start_date, reservation.end_date)
        .into_iter()
        .filter(|date| !checked.contains(date))
        .collect()
}

/// A priced reservation within a season summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStay {
    pub reservation: Reservation,
    pub payment: Option<Payment>,
    pub billing: BillingResult,
    pub billing_source: BillingSource,
    pub missing_check_ins: Vec<Date>,
    /// True iff `missing_check_ins` is empty.
    pub has_complete_data: bool,
    pub is_upcoming: bool,
}

/// Season totals over non-upcoming stays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonTotals {
    pub total_stays: u32,
    pub total_nights: u32,
    pub total_charged_cents: i64,
    pub total_paid_cents: i64,
    pub total_outstanding_cents: i64,
    /// Summed recorded occupancy over days with an occupancy record.
    pub average_actual_guests: Option<f64>,
    /// Mean stated guest count.
    pub average_reserved_guests: Option<f64>,
}

/// A family's season, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub family_group: String,
    pub season: SeasonWindow,
    pub stays: Vec<SeasonStay>,
    pub totals: SeasonTotals,
}

/// Records read for one family and season.
#[derive(Debug, Clone, Copy)]
pub struct SeasonRecords<'a> {
    pub reservations: &'a [Reservation],
    pub payments: &'a [Payment],
    pub sessions: &'a [CheckInSession],
}

#[allow(clippy::cast_precision_loss)]
fn average(sum: u64, count: u64) -> Option<f64> {
    (count > 0).then(|| sum as f64 / count as f64)
}

/// Builds a family's season summary.
///
/// Reservations belonging to other families or falling outside the season
/// are ignored. Upcoming stays are listed with a zero total but do not
/// contribute to any total.
///
/// # Errors
///
/// Returns an error if pricing a stay fails.
pub fn summarize_season(
    family_group: &str,
    season: SeasonWindow,
    records: &SeasonRecords<'_>,
    config: &BillingConfig,
    today: Date,
) -> Result<SeasonSummary, DomainError> {
    let mut reservations: Vec<&Reservation> = records
        .reservations
        .iter()
        .filter(|r| r.family_group == family_group && r.overlaps(season.start, season.end))
        .collect();
    reservations.sort_by_key(|r| r.start_date);

    let mut stays: Vec<SeasonStay> = Vec::with_capacity(reservations.len());
    let mut totals: SeasonTotals = SeasonTotals::default();
    let mut occupancy_guests: u64 = 0;
    let mut occupancy_days: u64 = 0;
    let mut reserved_guests: u64 = 0;

    for reservation in reservations {
        let reservation_id: Option<i64> = reservation.reservation_id;
        let payment: Option<&Payment> = reservation_id
            .and_then(|id| records.payments.iter().find(|p| p.reservation_id == id));
        let sessions: Vec<CheckInSession> = records
            .sessions
            .iter()
            .filter(|s| Some(s.reservation_id) == reservation_id)
            .cloned()
            .collect();

        let inputs: StayInputs<'_> = StayInputs {
            reservation,
            payment,
            sessions: &sessions,
            config,
            today,
        };
        let (billing_source, billing): (BillingSource, BillingResult) = price_stay(&inputs)?;
        let missing: Vec<Date> = missing_check_ins(reservation, &sessions);
        let upcoming: bool = billing_source == BillingSource::Upcoming;

        if !upcoming {
            totals.total_stays += 1;
            totals.total_nights = totals.total_nights.saturating_add(reservation.nights());
            totals.total_charged_cents =
                checked_cents(totals.total_charged_cents, billing.total_cents, "total charged")?;
            totals.total_paid_cents = checked_cents(
                totals.total_paid_cents,
                payment.map_or(0, |p| p.amount_paid_cents),
                "total paid",
            )?;
            reserved_guests += u64::from(reservation.guest_count);
            if let Some(p) = payment {
                for day in &p.daily_occupancy {
                    occupancy_guests += u64::from(day.guests);
                    occupancy_days += 1;
                }
            }
        }

        stays.push(SeasonStay {
            reservation: reservation.clone(),
            payment: payment.cloned(),
            billing,
            billing_source,
            has_complete_data: missing.is_empty(),
            missing_check_ins: missing,
            is_upcoming: upcoming,
        });
    }

    totals.total_outstanding_cents = totals
        .total_charged_cents
        .checked_sub(totals.total_paid_cents)
        .ok_or_else(|| DomainError::BillingOverflow {
            operation: String::from("outstanding balance"),
        })?;
    totals.average_actual_guests = average(occupancy_guests, occupancy_days);
    totals.average_reserved_guests = average(reserved_guests, u64::from(totals.total_stays));

    Ok(SeasonSummary {
        family_group: family_group.to_string(),
        season,
        stays,
        totals,
    })
}
