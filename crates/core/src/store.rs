// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store contracts the rotation and season services run against.
//!
//! Implementations must make every method that changes more than one row
//! atomic. Turn-changing methods take the version the caller read and must
//! return `Ok(false)` without writing anything when it no longer matches.

use crate::error::CoreError;
use crate::state::RotationOrderState;
use cabin_rotation_domain::{
    BillingConfig, CheckInSession, DailyOccupancy, FamilyGroup, Payment, Reservation,
    RotationConfig, RotationScope, SeasonConfig, SelectionRound, TimePeriodUsage,
    UsageCorrection,
};
use std::collections::{HashMap, HashSet};
use time::Date;

/// Notification type sent when a family's selection turn opens.
pub const SELECTION_TURN_READY: &str = "selection_turn_ready";

/// Reminder type scheduled for the day before a selection window closes.
pub const SELECTION_ENDING_TOMORROW: &str = "selection_ending_tomorrow";

/// Delivery state recorded in the notification log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// Allowances applied when the secondary round starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryRoundStart<'a> {
    /// Secondary periods each family may claim.
    pub secondary_periods_allowed: u32,
    /// Primary allowance for families that have no usage row yet.
    pub default_primary_allowed: u32,
    /// The first family of the reversed order, if the round has any turns.
    pub first_family: Option<&'a str>,
}

/// A validated booking to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking<'a> {
    pub reservation: &'a Reservation,
    /// Round whose usage counter the booking consumes.
    pub round: SelectionRound,
    /// Primary allowance for a usage row created by this booking.
    pub default_primary_allowed: u32,
}

/// Rotation configuration, turn state and usage.
pub trait RotationStore {
    /// Loads an organization's rotation configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_rotation_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<RotationConfig>, CoreError>;

    /// Loads the turn state for a rotation year.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_rotation_order(
        &mut self,
        scope: RotationScope,
    ) -> Result<Option<RotationOrderState>, CoreError>;

    /// Loads every usage row for a rotation year.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_usage(&mut self, scope: RotationScope) -> Result<Vec<TimePeriodUsage>, CoreError>;

    /// Loads a family group by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_family_group(
        &mut self,
        organization_id: i64,
        name: &str,
    ) -> Result<Option<FamilyGroup>, CoreError>;

    /// Marks `completed_family`'s primary turn complete and moves the pointer
    /// to `next_family` (which may be `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn advance_primary_turn(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        completed_family: &str,
        next_family: Option<&str>,
    ) -> Result<bool, CoreError>;

    /// Generates secondary allowances for every family in the order and
    /// activates the secondary round. Also switches every usage row to the
    /// secondary round.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn start_secondary_round(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        start: SecondaryRoundStart<'_>,
    ) -> Result<bool, CoreError>;

    /// Moves the secondary pointer; `None` ends the round.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn set_secondary_turn(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        next_family: Option<&str>,
    ) -> Result<bool, CoreError>;

    /// Opens (or reopens) a family's selection window.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn open_selection_window(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        start: Date,
        end: Date,
    ) -> Result<(), CoreError>;

    /// Families whose selection window has been extended through `today` or later.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn active_extensions(
        &mut self,
        scope: RotationScope,
        today: Date,
    ) -> Result<HashSet<String>, CoreError>;

    /// Deletes pending notifications of `notification_type` for a family.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn delete_pending_notifications(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        notification_type: &str,
    ) -> Result<usize, CoreError>;

    /// Appends to the notification log.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn record_notification(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        notification_type: &str,
        status: NotificationStatus,
    ) -> Result<(), CoreError>;

    /// Nights the family holds in primary-round reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn primary_nights_booked(
        &mut self,
        scope: RotationScope,
        family_group: &str,
    ) -> Result<u32, CoreError>;

    /// Number of primary-round reservations per family.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn primary_reservation_counts(
        &mut self,
        scope: RotationScope,
    ) -> Result<HashMap<String, u32>, CoreError>;

    /// Inserts the reservation and increments the family's usage counter
    /// for the booking's round, creating the usage row if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn record_booking(
        &mut self,
        scope: RotationScope,
        booking: &NewBooking<'_>,
    ) -> Result<i64, CoreError>;

    /// Whether usage has already been reconciled for the scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn reconciliation_recorded(&mut self, scope: RotationScope) -> Result<bool, CoreError>;

    /// Applies usage corrections and records the reconciliation marker.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn apply_usage_reconciliation(
        &mut self,
        scope: RotationScope,
        corrections: &[UsageCorrection],
    ) -> Result<(), CoreError>;
}

/// Season configuration, reservations and payments.
pub trait SeasonStore {
    /// Loads an organization's billing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_billing_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<BillingConfig>, CoreError>;

    /// Loads an organization's season configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_season_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<SeasonConfig>, CoreError>;

    /// Loads a family's reservations overlapping `[first, last]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_family_reservations(
        &mut self,
        organization_id: i64,
        family_group: &str,
        first: Date,
        last: Date,
    ) -> Result<Vec<Reservation>, CoreError>;

    /// Loads payments for the given reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_payments(&mut self, reservation_ids: &[i64]) -> Result<Vec<Payment>, CoreError>;

    /// Loads check-in sessions for the given reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn list_check_in_sessions(
        &mut self,
        reservation_ids: &[i64],
    ) -> Result<Vec<CheckInSession>, CoreError>;

    /// Loads one reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_reservation(&mut self, reservation_id: i64)
    -> Result<Option<Reservation>, CoreError>;

    /// Loads one payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn load_payment(&mut self, payment_id: i64) -> Result<Option<Payment>, CoreError>;

    /// Replaces a payment's occupancy and charged amount. The paid amount
    /// is not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn save_occupancy(
        &mut self,
        payment_id: i64,
        daily_occupancy: &[DailyOccupancy],
        amount_cents: i64,
    ) -> Result<(), CoreError>;
}
