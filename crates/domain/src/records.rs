// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reservation, payment and check-in records read by season reconciliation.

use crate::calendar::{at_noon, nights_between};
use crate::types::SelectionRound;
use serde::{Deserialize, Serialize};
use time::Date;

/// A booked stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// `None` until persisted.
    pub reservation_id: Option<i64>,
    pub organization_id: i64,
    pub rotation_year: i32,
    pub family_group: String,
    /// Check-in date.
    pub start_date: Date,
    /// Check-out date (not a charged night).
    pub end_date: Date,
    /// Guests stated at booking time.
    pub guest_count: u32,
    /// The round the stay was booked in.
    pub selection_round: SelectionRound,
}

impl Reservation {
    /// Nights in the stay.
    #[must_use]
    pub fn nights(&self) -> u32 {
        nights_between(at_noon(self.start_date), at_noon(self.end_date))
    }

    /// Whether the stay overlaps the inclusive date range `[first, last]`.
    #[must_use]
    pub fn overlaps(&self, first: Date, last: Date) -> bool {
        self.start_date <= last && self.end_date > first
    }
}

/// Guests recorded for one night of a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOccupancy {
    pub date: Date,
    pub guests: u32,
    /// Cost of the night as last computed, if any.
    pub cost_cents: Option<i64>,
}

/// Payment state of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// `None` until persisted.
    pub payment_id: Option<i64>,
    pub reservation_id: i64,
    /// Amount charged; `None` until billing has run.
    pub amount_cents: Option<i64>,
    pub amount_paid_cents: i64,
    /// A locked amount is authoritative and is not recomputed.
    pub billing_locked: bool,
    /// Added on top of a stored amount.
    pub manual_adjustment_cents: i64,
    /// Per-night occupancy as recorded by the family.
    pub daily_occupancy: Vec<DailyOccupancy>,
}

/// A check-in recorded for one night of a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInSession {
    /// `None` until persisted.
    pub session_id: Option<i64>,
    pub reservation_id: i64,
    pub check_date: Date,
    pub guest_count: u32,
}
