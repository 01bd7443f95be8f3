// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Season summaries and occupancy edits backed by the store.

use crate::error::CoreError;
use crate::store::SeasonStore;
use cabin_rotation_domain::{
    BillingConfig, CheckInSession, OccupancyEntry, OccupancyUpdate, Payment, Reservation,
    SeasonConfig, SeasonRecords, SeasonSummary, SeasonWindow, prepare_occupancy_update,
    summarize_season,
};
use time::Date;
use tracing::info;

fn require_billing_config<S: SeasonStore>(
    store: &mut S,
    organization_id: i64,
) -> Result<BillingConfig, CoreError> {
    store
        .load_billing_config(organization_id)?
        .ok_or(CoreError::ConfigurationNotLoaded {
            organization_id,
            what: "billing",
        })
}

/// Builds a family's summary for the season starting in `season_year`.
///
/// # Errors
///
/// Returns an error if the billing or season configuration is missing, a
/// stay cannot be priced, or the store fails.
pub fn season_summary<S: SeasonStore>(
    store: &mut S,
    organization_id: i64,
    family_group: &str,
    season_year: i32,
    today: Date,
) -> Result<SeasonSummary, CoreError> {
    let billing: BillingConfig = require_billing_config(store, organization_id)?;
    let season_config: SeasonConfig =
        store
            .load_season_config(organization_id)?
            .ok_or(CoreError::ConfigurationNotLoaded {
                organization_id,
                what: "season",
            })?;
    let season: SeasonWindow = season_config.window(season_year)?;

    let reservations: Vec<Reservation> =
        store.list_family_reservations(organization_id, family_group, season.start, season.end)?;
    let reservation_ids: Vec<i64> = reservations
        .iter()
        .filter_map(|r| r.reservation_id)
        .collect();
    let payments: Vec<Payment> = store.list_payments(&reservation_ids)?;
    let sessions: Vec<CheckInSession> = store.list_check_in_sessions(&reservation_ids)?;

    let summary: SeasonSummary = summarize_season(
        family_group,
        season,
        &SeasonRecords {
            reservations: &reservations,
            payments: &payments,
            sessions: &sessions,
        },
        &billing,
        today,
    )?;

    info!(
        organization_id,
        family = %family_group,
        season_year,
        stays = summary.stays.len(),
        total_charged_cents = summary.totals.total_charged_cents,
        "Built season summary"
    );

    Ok(summary)
}

/// Replaces a payment's recorded occupancy and recomputes its charge.
///
/// # Errors
///
/// Returns an error if the payment or its reservation does not exist, the
/// billing configuration is missing, an entry is invalid, or the store fails.
pub fn update_occupancy<S: SeasonStore>(
    store: &mut S,
    payment_id: i64,
    entries: &[OccupancyEntry],
) -> Result<OccupancyUpdate, CoreError> {
    let payment: Payment = store
        .load_payment(payment_id)?
        .ok_or(CoreError::PaymentNotFound(payment_id))?;
    let reservation: Reservation = store
        .load_reservation(payment.reservation_id)?
        .ok_or(CoreError::ReservationNotFound(payment.reservation_id))?;
    let billing: BillingConfig = require_billing_config(store, reservation.organization_id)?;

    let update: OccupancyUpdate = prepare_occupancy_update(&billing, &reservation, entries)?;
    store.save_occupancy(payment_id, &update.daily_occupancy, update.amount_cents)?;

    info!(
        payment_id,
        reservation_id = payment.reservation_id,
        days = update.daily_occupancy.len(),
        amount_cents = update.amount_cents,
        "Updated occupancy"
    );

    Ok(update)
}
