// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stay pricing.
//!
//! Money is carried as integer cents. Per-day costs are computed first and
//! summed into the subtotal, so the day breakdown always adds up to the
//! subtotal exactly. Weekly and flat rates are spread across the charged
//! days with cumulative rounding for the same reason.
//!
//! ```text
//! total = subtotal + cleaning fee + round_half_up((subtotal + cleaning fee) × tax_bp / 10_000)
//! ```

use crate::calendar::add_days;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::Date;

const BASIS_POINTS: i64 = 10_000;
const DAYS_PER_WEEK: i64 = 7;

/// Largest guest count accepted for a single night or reservation.
pub const MAX_GUESTS: u32 = 500;

/// How the nightly rate is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMethod {
    /// `rate × guests` for each night.
    PerPersonPerNight,
    /// `rate` for each occupied night, independent of guest count.
    PerNight,
    /// `rate` per seven nights, prorated.
    PerWeek,
    /// `rate` once per stay.
    FlatRate,
}

impl BillingMethod {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PerPersonPerNight => "per_person_per_night",
            Self::PerNight => "per_night",
            Self::PerWeek => "per_week",
            Self::FlatRate => "flat_rate",
        }
    }
}

impl FromStr for BillingMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per_person_per_night" => Ok(Self::PerPersonPerNight),
            "per_night" => Ok(Self::PerNight),
            "per_week" => Ok(Self::PerWeek),
            "flat_rate" => Ok(Self::FlatRate),
            _ => Err(DomainError::InvalidBillingMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for BillingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An organization's pricing rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingConfig {
    pub method: BillingMethod,
    /// Rate in cents, applied per `method`.
    pub rate_cents: i64,
    /// Charged once per stay with at least one charged night.
    pub cleaning_fee_cents: i64,
    /// Tax rate in basis points (825 = 8.25%).
    pub tax_rate_basis_points: i64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            method: BillingMethod::PerPersonPerNight,
            rate_cents: 0,
            cleaning_fee_cents: 0,
            tax_rate_basis_points: 0,
        }
    }
}

impl BillingConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any amount is negative or the tax rate exceeds 100%.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.rate_cents < 0 || self.cleaning_fee_cents < 0 {
            return Err(DomainError::InvalidBillingConfig {
                reason: String::from("rate and cleaning fee must not be negative"),
            });
        }
        if !(0..=BASIS_POINTS).contains(&self.tax_rate_basis_points) {
            return Err(DomainError::InvalidBillingConfig {
                reason: format!(
                    "tax rate must be between 0 and {BASIS_POINTS} basis points, got {}",
                    self.tax_rate_basis_points
                ),
            });
        }
        Ok(())
    }
}

/// The charged range of a stay, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayDates {
    pub start: Date,
    pub end: Date,
}

/// Inputs for pricing a stay without per-day occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayParams {
    pub guests: u32,
    pub nights: u32,
    pub check_in: Date,
    pub check_out: Date,
}

/// The cost of one occupied night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCharge {
    pub date: Date,
    pub guests: u32,
    pub cost_cents: i64,
}

/// Components of a stay total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingBreakdown {
    pub subtotal_cents: i64,
    pub cleaning_fee_cents: i64,
    pub tax_cents: i64,
    /// Nights with at least one guest.
    pub nights: u32,
    /// Sum of guests over the charged nights.
    pub guest_nights: u32,
}

/// A priced stay.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingResult {
    pub total_cents: i64,
    pub day_breakdown: Vec<DayCharge>,
    pub breakdown: BillingBreakdown,
}

impl BillingResult {
    /// A zero total with no charged days.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Divides and rounds half away from zero.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let half: i128 = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

fn to_cents(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Share of `amount` owed for the `index`-th of `parts` units, so that the
/// shares over `0..parts` sum to `amount` exactly.
fn spread_share(amount: i64, index: i64, parts: i64) -> i64 {
    let amount: i128 = i128::from(amount);
    let upper: i128 = div_round_half_up(amount * i128::from(index + 1), i128::from(parts));
    let lower: i128 = div_round_half_up(amount * i128::from(index), i128::from(parts));
    to_cents(upper - lower)
}

fn day_cost(config: &BillingConfig, guests: u32, index: i64, charged_days: i64) -> i64 {
    match config.method {
        BillingMethod::PerPersonPerNight => {
            to_cents(i128::from(config.rate_cents) * i128::from(guests))
        }
        BillingMethod::PerNight => config.rate_cents,
        BillingMethod::PerWeek => spread_share(
            config.rate_cents,
            index.rem_euclid(DAYS_PER_WEEK),
            DAYS_PER_WEEK,
        ),
        BillingMethod::FlatRate => spread_share(config.rate_cents, index, charged_days),
    }
}

fn overflow(operation: &str) -> DomainError {
    DomainError::BillingOverflow {
        operation: operation.to_string(),
    }
}

fn price_days(
    config: &BillingConfig,
    days: &[(Date, u32)],
) -> Result<BillingResult, DomainError> {
    if days.is_empty() {
        return Ok(BillingResult::zero());
    }

    let charged_days: i64 = i64::try_from(days.len()).map_err(|_| overflow("charged days"))?;
    let mut index: i64 = 0;
    let day_breakdown: Vec<DayCharge> = days
        .iter()
        .map(|&(date, guests)| {
            let cost_cents: i64 = day_cost(config, guests, index, charged_days);
            index += 1;
            DayCharge {
                date,
                guests,
                cost_cents,
            }
        })
        .collect();

    let mut subtotal_cents: i64 = 0;
    let mut guest_nights: u32 = 0;
    for day in &day_breakdown {
        subtotal_cents = subtotal_cents
            .checked_add(day.cost_cents)
            .ok_or_else(|| overflow("subtotal"))?;
        guest_nights = guest_nights
            .checked_add(day.guests)
            .ok_or_else(|| overflow("guest nights"))?;
    }

    let cleaning_fee_cents: i64 = config.cleaning_fee_cents;
    let taxable: i128 = i128::from(subtotal_cents) + i128::from(cleaning_fee_cents);
    let tax_cents: i64 = i64::try_from(div_round_half_up(
        taxable * i128::from(config.tax_rate_basis_points),
        i128::from(BASIS_POINTS),
    ))
    .map_err(|_| overflow("tax"))?;
    let total_cents: i64 = subtotal_cents
        .checked_add(cleaning_fee_cents)
        .and_then(|amount| amount.checked_add(tax_cents))
        .ok_or_else(|| overflow("total"))?;

    Ok(BillingResult {
        total_cents,
        breakdown: BillingBreakdown {
            subtotal_cents,
            cleaning_fee_cents,
            tax_cents,
            nights: u32::try_from(day_breakdown.len()).map_err(|_| overflow("nights"))?,
            guest_nights,
        },
        day_breakdown,
    })
}

/// Prices a stay from recorded per-day occupancy.
///
/// Only dates inside `[stay.start, stay.end)` with at least one guest are
/// charged; everything else in `occupancy` is ignored.
///
/// # Errors
///
/// Returns `DomainError::BillingOverflow` if an amount does not fit in cents.
pub fn calculate_from_daily_occupancy(
    config: &BillingConfig,
    occupancy: &BTreeMap<Date, u32>,
    stay: StayDates,
) -> Result<BillingResult, DomainError> {
    if stay.end <= stay.start {
        return Ok(BillingResult::zero());
    }
    let days: Vec<(Date, u32)> = occupancy
        .range(stay.start..stay.end)
        .filter(|(_, guests)| **guests > 0)
        .map(|(date, guests)| (*date, *guests))
        .collect();
    price_days(config, &days)
}

/// Prices a stay from its reserved guest count and night count.
///
/// # Errors
///
/// Returns an error if the stay runs past the supported calendar range or
/// an amount does not fit in cents.
pub fn calculate_stay_billing(
    config: &BillingConfig,
    params: StayParams,
) -> Result<BillingResult, DomainError> {
    if params.guests == 0 {
        return Ok(BillingResult::zero());
    }
    let mut days: Vec<(Date, u32)> = Vec::new();
    for offset in 0..params.nights {
        days.push((
            add_days(params.check_in, i64::from(offset))?,
            params.guests,
        ));
    }
    price_days(config, &days)
}
