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

mod allocation;
mod coordinator;
mod error;
mod notification;
mod reconciliation;
mod season;
mod secondary;
mod state;
mod store;

#[cfg(test)]
mod tests;

use cabin_rotation_domain::{RotationConfig, RotationScope, today_in_timezone};
use time::Date;

// Re-export public types and functions
pub use allocation::{
    BookingOutcome, book_reservation, time_period_windows, user_usage_info,
    validate_booking_request,
};
pub use coordinator::{
    AdvanceOutcome, SelectionState, SelectionWindow, advance_primary_selection,
    advance_selection, selection_phase, selection_state,
};
pub use error::CoreError;
pub use notification::{
    NotificationError, SelectionData, TurnNotification, TurnNotifier, notify_turn_ready,
    turn_ready_notification,
};
pub use reconciliation::{ReconciliationOutcome, reconcile_usage};
pub use season::{season_summary, update_occupancy};
pub use secondary::{SecondaryGeneration, advance_secondary_selection, generate_secondary_periods};
pub use state::RotationOrderState;
pub use store::{
    NewBooking, NotificationStatus, RotationStore, SELECTION_ENDING_TOMORROW,
    SELECTION_TURN_READY, SeasonStore, SecondaryRoundStart,
};

/// Loads the rotation configuration, failing if none is saved.
///
/// # Errors
///
/// Returns `CoreError::ConfigurationNotLoaded` if the organization has no
/// rotation configuration, or an error if the store fails.
pub fn require_rotation_config<S: RotationStore>(
    store: &mut S,
    organization_id: i64,
) -> Result<RotationConfig, CoreError> {
    store
        .load_rotation_config(organization_id)?
        .ok_or(CoreError::ConfigurationNotLoaded {
            organization_id,
            what: "rotation",
        })
}

/// Loads the turn state for a rotation year, if one exists.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn load_rotation_order<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
) -> Result<Option<RotationOrderState>, CoreError> {
    store.load_rotation_order(scope)
}

/// Loads the turn state for a rotation year, failing if none exists.
///
/// # Errors
///
/// Returns `CoreError::RotationOrderNotFound` if no order has been set, or
/// an error if the store fails.
pub fn require_rotation_order<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
) -> Result<RotationOrderState, CoreError> {
    store
        .load_rotation_order(scope)?
        .ok_or(CoreError::RotationOrderNotFound(scope))
}

/// Today's date in the organization's timezone.
///
/// # Errors
///
/// Returns an error if the organization has no rotation configuration, its
/// timezone is invalid, or the store fails.
pub fn organization_today<S: RotationStore>(
    store: &mut S,
    organization_id: i64,
) -> Result<Date, CoreError> {
    let config: RotationConfig = require_rotation_config(store, organization_id)?;
    Ok(today_in_timezone(&config.timezone)?)
}
