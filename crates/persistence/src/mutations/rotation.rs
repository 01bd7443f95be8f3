// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rotation mutations.
//!
//! Turn-changing writes are conditional on the `version` column of
//! `rotation_orders`: when the stored version no longer matches the one the
//! caller read, nothing is written and `Ok(false)` is returned.

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewFamilyGroup, NewReservation, NewUsage, flag, to_i32};
use crate::diesel_schema::{
    family_groups, notification_log, reservation_periods, reservations, rotation_orders,
    time_period_usage, usage_reconciliations,
};
use crate::error::PersistenceError;
use crate::queries::rotation::get_rotation_order;
use cabin_rotation::{NewBooking, NotificationStatus, RotationOrderState, SecondaryRoundStart};
use cabin_rotation_domain::{
    FamilyGroup, RotationScope, SelectionRound, TimePeriodUsage, UsageCorrection, format_date,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Date;
use tracing::{debug, info};

/// Creates a family group and returns its id.
///
/// # Errors
///
/// Returns an error if the name is already taken or the write fails.
pub fn create_family_group(
    conn: &mut SqliteConnection,
    family_group: &FamilyGroup,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(family_groups::table)
        .values(&NewFamilyGroup::from_domain(family_group)?)
        .execute(conn)?;
    let family_group_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        organization_id = family_group.organization_id,
        family_group_id,
        name = %family_group.name,
        "Created family group"
    );
    Ok(family_group_id)
}

/// Creates or replaces the rotation order of a year.
///
/// Replacing an order resets the turn to the first family, clears the
/// secondary round and bumps the version.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn set_rotation_order(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_order: &[String],
) -> Result<RotationOrderState, PersistenceError> {
    let family_order_json: String = serde_json::to_string(family_order)?;
    let first: Option<&str> = family_order.first().map(String::as_str);

    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(rotation_orders::table)
            .values((
                rotation_orders::organization_id.eq(scope.organization_id),
                rotation_orders::rotation_year.eq(scope.rotation_year),
                rotation_orders::family_order_json.eq(&family_order_json),
                rotation_orders::current_primary_turn_family.eq(first),
            ))
            .on_conflict((
                rotation_orders::organization_id,
                rotation_orders::rotation_year,
            ))
            .do_update()
            .set((
                rotation_orders::family_order_json.eq(&family_order_json),
                rotation_orders::current_primary_turn_family.eq(first),
                rotation_orders::current_secondary_turn_family.eq(None::<String>),
                rotation_orders::secondary_round_active.eq(0),
                rotation_orders::secondary_periods_generated.eq(0),
                rotation_orders::version.eq(rotation_orders::version + 1),
            ))
            .execute(conn)?;

        let state: RotationOrderState = get_rotation_order(conn, scope)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("rotation order for {scope}"))
        })?;
        info!(%scope, families = family_order.len(), version = state.version, "Saved rotation order");
        Ok(state)
    })
}

/// Returns the id of a family's usage row, creating it if needed.
fn ensure_usage_row(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
    default_allowed: u32,
) -> Result<i64, PersistenceError> {
    let usage: TimePeriodUsage = TimePeriodUsage::new(scope, family_group, default_allowed);
    let inserted: usize = diesel::insert_or_ignore_into(time_period_usage::table)
        .values(&NewUsage::from_domain(&usage)?)
        .execute(conn)?;
    if inserted > 0 {
        debug!(%scope, family = %family_group, default_allowed, "Created usage row");
    }

    Ok(time_period_usage::table
        .filter(time_period_usage::organization_id.eq(scope.organization_id))
        .filter(time_period_usage::rotation_year.eq(scope.rotation_year))
        .filter(time_period_usage::family_group.eq(family_group))
        .select(time_period_usage::usage_id)
        .first(conn)?)
}

/// Moves the primary pointer and marks the completed family's turn done.
///
/// `default_allowed` is the primary allowance given to a usage row created
/// here for a family that never booked.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn advance_primary_turn(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    expected_version: i64,
    completed_family: &str,
    next_family: Option<&str>,
    default_allowed: u32,
) -> Result<bool, PersistenceError> {
    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            rotation_orders::table
                .filter(rotation_orders::organization_id.eq(scope.organization_id))
                .filter(rotation_orders::rotation_year.eq(scope.rotation_year))
                .filter(rotation_orders::version.eq(expected_version)),
        )
        .set((
            rotation_orders::current_primary_turn_family.eq(next_family),
            rotation_orders::version.eq(rotation_orders::version + 1),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Ok(false);
        }

        let usage_id: i64 = ensure_usage_row(conn, scope, completed_family, default_allowed)?;
        diesel::update(time_period_usage::table.find(usage_id))
            .set(time_period_usage::turn_completed.eq(1))
            .execute(conn)?;
        Ok(true)
    })
}

/// Grants secondary allowances to every family and opens the secondary round.
///
/// # Errors
///
/// Returns an error if a value is out of range or the write fails.
pub fn start_secondary_round(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    expected_version: i64,
    start: SecondaryRoundStart<'_>,
) -> Result<bool, PersistenceError> {
    let allowed: i32 = to_i32(start.secondary_periods_allowed, "secondary_periods_allowed")?;

    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        let Some(order) = get_rotation_order(conn, scope)? else {
            return Ok(false);
        };
        if order.version != expected_version {
            return Ok(false);
        }

        for family in &order.family_order {
            let usage_id: i64 =
                ensure_usage_row(conn, scope, family, start.default_primary_allowed)?;
            diesel::update(time_period_usage::table.find(usage_id))
                .set((
                    time_period_usage::secondary_periods_allowed.eq(allowed),
                    time_period_usage::selection_round.eq(SelectionRound::Secondary.as_str()),
                ))
                .execute(conn)?;
        }

        let updated: usize = diesel::update(
            rotation_orders::table
                .filter(rotation_orders::organization_id.eq(scope.organization_id))
                .filter(rotation_orders::rotation_year.eq(scope.rotation_year))
                .filter(rotation_orders::version.eq(expected_version)),
        )
        .set((
            rotation_orders::secondary_periods_generated.eq(1),
            rotation_orders::secondary_round_active.eq(flag(start.first_family.is_some())),
            rotation_orders::current_secondary_turn_family.eq(start.first_family),
            rotation_orders::version.eq(rotation_orders::version + 1),
        ))
        .execute(conn)?;

        Ok(updated == 1)
    })
}

/// Moves the secondary pointer; `None` ends the round.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn set_secondary_turn(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    expected_version: i64,
    next_family: Option<&str>,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        rotation_orders::table
            .filter(rotation_orders::organization_id.eq(scope.organization_id))
            .filter(rotation_orders::rotation_year.eq(scope.rotation_year))
            .filter(rotation_orders::version.eq(expected_version)),
    )
    .set((
        rotation_orders::current_secondary_turn_family.eq(next_family),
        rotation_orders::secondary_round_active.eq(flag(next_family.is_some())),
        rotation_orders::version.eq(rotation_orders::version + 1),
    ))
    .execute(conn)?;
    Ok(updated == 1)
}

/// Opens (or reopens) a family's selection window, clearing any extension.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn open_selection_window(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
    start: Date,
    end: Date,
) -> Result<(), PersistenceError> {
    let start: String = format_date(start);
    let end: String = format_date(end);
    diesel::insert_into(reservation_periods::table)
        .values((
            reservation_periods::organization_id.eq(scope.organization_id),
            reservation_periods::rotation_year.eq(scope.rotation_year),
            reservation_periods::family_group.eq(family_group),
            reservation_periods::selection_start_date.eq(&start),
            reservation_periods::selection_end_date.eq(&end),
        ))
        .on_conflict((
            reservation_periods::organization_id,
            reservation_periods::rotation_year,
            reservation_periods::family_group,
        ))
        .do_update()
        .set((
            reservation_periods::selection_start_date.eq(&start),
            reservation_periods::selection_end_date.eq(&end),
            reservation_periods::extended_until.eq(None::<String>),
        ))
        .execute(conn)?;
    debug!(%scope, family = %family_group, %start, %end, "Opened selection window");
    Ok(())
}

/// Extends a family's selection window through `until`.
///
/// Returns `false` if the family has no selection window.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn extend_selection_window(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
    until: Date,
) -> Result<bool, PersistenceError> {
    let updated: usize = diesel::update(
        reservation_periods::table
            .filter(reservation_periods::organization_id.eq(scope.organization_id))
            .filter(reservation_periods::rotation_year.eq(scope.rotation_year))
            .filter(reservation_periods::family_group.eq(family_group)),
    )
    .set(reservation_periods::extended_until.eq(Some(format_date(until))))
    .execute(conn)?;
    Ok(updated > 0)
}

/// Deletes a family's pending notifications of one type.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_pending_notifications(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
    notification_type: &str,
) -> Result<usize, PersistenceError> {
    Ok(diesel::delete(
        notification_log::table
            .filter(notification_log::organization_id.eq(scope.organization_id))
            .filter(notification_log::rotation_year.eq(scope.rotation_year))
            .filter(notification_log::family_group.eq(family_group))
            .filter(notification_log::notification_type.eq(notification_type))
            .filter(notification_log::status.eq(NotificationStatus::Pending.as_str())),
    )
    .execute(conn)?)
}

/// Appends to the notification log.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn record_notification(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
    notification_type: &str,
    status: NotificationStatus,
) -> Result<(), PersistenceError> {
    diesel::insert_into(notification_log::table)
        .values((
            notification_log::organization_id.eq(scope.organization_id),
            notification_log::rotation_year.eq(scope.rotation_year),
            notification_log::family_group.eq(family_group),
            notification_log::notification_type.eq(notification_type),
            notification_log::status.eq(status.as_str()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Inserts a reservation and consumes one period of the booking's round.
///
/// # Errors
///
/// Returns an error if a value is out of range or the write fails.
pub fn record_booking(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    booking: &NewBooking<'_>,
) -> Result<i64, PersistenceError> {
    let new_reservation: NewReservation = NewReservation::from_domain(booking.reservation)?;
    let family_group: &str = &booking.reservation.family_group;

    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(reservations::table)
            .values(&new_reservation)
            .execute(conn)?;
        let reservation_id: i64 = get_last_insert_rowid(conn)?;

        let usage_id: i64 =
            ensure_usage_row(conn, scope, family_group, booking.default_primary_allowed)?;
        let target = time_period_usage::table.find(usage_id);
        match booking.round {
            SelectionRound::Primary => diesel::update(target)
                .set(time_period_usage::time_periods_used.eq(time_period_usage::time_periods_used + 1))
                .execute(conn)?,
            SelectionRound::Secondary => diesel::update(target)
                .set(
                    time_period_usage::secondary_periods_used
                        .eq(time_period_usage::secondary_periods_used + 1),
                )
                .execute(conn)?,
        };

        Ok(reservation_id)
    })
}

/// Applies usage corrections and records the reconciliation.
///
/// # Errors
///
/// Returns an error if a value is out of range or the write fails.
pub fn apply_usage_reconciliation(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    corrections: &[UsageCorrection],
) -> Result<(), PersistenceError> {
    let count: i32 = to_i32(
        u32::try_from(corrections.len()).unwrap_or(u32::MAX),
        "usage_reconciliations.corrections",
    )?;

    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        for correction in corrections {
            match correction {
                UsageCorrection::Create(row) => {
                    diesel::insert_or_ignore_into(time_period_usage::table)
                        .values(&NewUsage::from_domain(row)?)
                        .execute(conn)?;
                }
                UsageCorrection::UpdateUsed {
                    usage_id, actual, ..
                } => {
                    diesel::update(time_period_usage::table.find(*usage_id))
                        .set(time_period_usage::time_periods_used.eq(to_i32(*actual, "time_periods_used")?))
                        .execute(conn)?;
                }
            }
        }

        diesel::insert_into(usage_reconciliations::table)
            .values((
                usage_reconciliations::organization_id.eq(scope.organization_id),
                usage_reconciliations::rotation_year.eq(scope.rotation_year),
                usage_reconciliations::corrections.eq(count),
            ))
            .on_conflict((
                usage_reconciliations::organization_id,
                usage_reconciliations::rotation_year,
            ))
            .do_update()
            .set((
                usage_reconciliations::corrections.eq(count),
                usage_reconciliations::reconciled_at
                    .eq(diesel::dsl::sql::<diesel::sql_types::Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;
        Ok(())
    })
}
