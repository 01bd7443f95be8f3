// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Occupancy edits on a payment.
//!
//! A day submitted with zero guests is removed from the occupancy record
//! rather than stored at zero cost. The stored charge is recomputed from
//! what remains; the amount already paid is never touched, so the
//! outstanding balance moves with every edit.

use crate::billing::{
    BillingConfig, BillingResult, MAX_GUESTS, StayDates, calculate_from_daily_occupancy,
};
use crate::error::DomainError;
use crate::records::{DailyOccupancy, Reservation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// One day of submitted occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyEntry {
    pub date: Date,
    pub guests: u32,
}

/// The values to persist for an occupancy edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyUpdate {
    /// Occupied days with their computed cost.
    pub daily_occupancy: Vec<DailyOccupancy>,
    /// The new charged amount.
    pub amount_cents: i64,
    pub billing: BillingResult,
}

/// Filters and prices submitted occupancy for a reservation.
///
/// # Errors
///
/// Returns `DomainError::InvalidOccupancy` if a date is submitted twice,
/// falls outside the stay or has more than `MAX_GUESTS` guests, and
/// `DomainError::BillingOverflow` if the cost does not fit in cents.
pub fn prepare_occupancy_update(
    config: &BillingConfig,
    reservation: &Reservation,
    entries: &[OccupancyEntry],
) -> Result<OccupancyUpdate, DomainError> {
    let mut occupancy: BTreeMap<Date, u32> = BTreeMap::new();

    for entry in entries {
        if entry.date < reservation.start_date || entry.date >= reservation.end_date {
            return Err(DomainError::InvalidOccupancy {
                reason: format!(
                    "{} is outside the stay {} to {}",
                    entry.date, reservation.start_date, reservation.end_date
                ),
            });
        }
        if entry.guests == 0 {
            continue;
        }
        if entry.guests > MAX_GUESTS {
            return Err(DomainError::InvalidOccupancy {
                reason: format!(
                    "{} has {} guests; at most {MAX_GUESTS} are allowed",
                    entry.date, entry.guests
                ),
            });
        }
        if occupancy.insert(entry.date, entry.guests).is_some() {
            return Err(DomainError::InvalidOccupancy {
                reason: format!("{} was submitted more than once", entry.date),
            });
        }
    }

    let billing: BillingResult = calculate_from_daily_occupancy(
        config,
        &occupancy,
        StayDates {
            start: reservation.start_date,
            end: reservation.end_date,
        },
    )?;

    let daily_occupancy: Vec<DailyOccupancy> = billing
        .day_breakdown
        .iter()
        .map(|day| DailyOccupancy {
            date: day.date,
            guests: day.guests,
            cost_cents: Some(day.cost_cents),
        })
        .collect();

    Ok(OccupancyUpdate {
        daily_occupancy,
        amount_cents: billing.total_cents,
        billing,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::billing::BillingMethod;
    use crate::types::SelectionRound;
    use time::macros::date;

    fn config() -> BillingConfig {
        BillingConfig {
            method: BillingMethod::PerPersonPerNight,
            rate_cents: 2_000,
            cleaning_fee_cents: 0,
            tax_rate_basis_points: 0,
        }
    }

    fn reservation() -> Reservation {
        Reservation {
            reservation_id: Some(1),
            organization_id: 1,
            rotation_year: 2026,
            family_group: String::from("Adams"),
            start_date: date!(2026 - 07 - 03),
            end_date: date!(2026 - 07 - 06),
            guest_count: 4,
            selection_round: SelectionRound::Primary,
        }
    }

    #[test]
    fn test_zero_guest_days_are_removed() {
        let d1 = date!(2026 - 07 - 03);
        let d2 = date!(2026 - 07 - 04);
        let update = prepare_occupancy_update(
            &config(),
            &reservation(),
            &[
                OccupancyEntry {
                    date: d1,
                    guests: 0,
                },
                OccupancyEntry {
                    date: d2,
                    guests: 3,
                },
            ],
        )
        .unwrap();

        assert_eq!(
            update.daily_occupancy,
            vec![DailyOccupancy {
                date: d2,
                guests: 3,
                cost_cents: Some(6_000),
            }]
        );
        assert_eq!(update.amount_cents, 6_000);
        assert_eq!(update.billing.breakdown.nights, 1);
    }

    #[test]
    fn test_all_zero_clears_the_charge() {
        let update = prepare_occupancy_update(
            &config(),
            &reservation(),
            &[OccupancyEntry {
                date: date!(2026 - 07 - 05),
                guests: 0,
            }],
        )
        .unwrap();
        assert!(update.daily_occupancy.is_empty());
        assert_eq!(update.amount_cents, 0);
    }

    #[test]
    fn test_dates_outside_stay_rejected() {
        let result = prepare_occupancy_update(
            &config(),
            &reservation(),
            &[OccupancyEntry {
                date: date!(2026 - 07 - 06),
                guests: 2,
            }],
        );
        assert!(matches!(result, Err(DomainError::InvalidOccupancy { .. })));
    }

    #[test]
    fn test_guest_count_above_limit_rejected() {
        let result = prepare_occupancy_update(
            &config(),
            &reservation(),
            &[
                OccupancyEntry {
                    date: date!(2026 - 07 - 03),
                    guests: u32::MAX,
                },
                OccupancyEntry {
                    date: date!(2026 - 07 - 04),
                    guests: u32::MAX,
                },
            ],
        );
        assert!(matches!(result, Err(DomainError::InvalidOccupancy { .. })));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let entry = OccupancyEntry {
            date: date!(2026 - 07 - 04),
            guests: 2,
        };
        let result = prepare_occupancy_update(&config(), &reservation(), &[entry, entry]);
        assert!(matches!(result, Err(DomainError::InvalidOccupancy { .. })));
    }
}
