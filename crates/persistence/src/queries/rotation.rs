// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rotation queries: family groups, turn state, usage and selection windows.

use crate::data_models::{
    FamilyGroupRow, NotificationLogData, ReservationPeriodData, ReservationRow, RotationOrderRow,
    UsageRow, stored_date,
};
use crate::diesel_schema::{
    family_groups, notification_log, reservation_periods, reservations, rotation_orders,
    time_period_usage, usage_reconciliations,
};
use crate::error::PersistenceError;
use cabin_rotation::RotationOrderState;
use cabin_rotation_domain::{
    FamilyGroup, Reservation, RotationScope, SelectionRound, TimePeriodUsage, format_date,
};
use diesel::SqliteConnection;
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use num_traits::ToPrimitive;
use std::collections::{HashMap, HashSet};
use time::Date;
use tracing::debug;

/// Loads a family group by name.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn get_family_group(
    conn: &mut SqliteConnection,
    organization_id: i64,
    name: &str,
) -> Result<Option<FamilyGroup>, PersistenceError> {
    family_groups::table
        .filter(family_groups::organization_id.eq(organization_id))
        .filter(family_groups::name.eq(name))
        .select(FamilyGroupRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_family_group: {e}")))?
        .map(FamilyGroupRow::into_domain)
        .transpose()
}

/// Lists an organization's family groups ordered by name.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn list_family_groups(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Vec<FamilyGroup>, PersistenceError> {
    family_groups::table
        .filter(family_groups::organization_id.eq(organization_id))
        .order(family_groups::name.asc())
        .select(FamilyGroupRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_family_groups: {e}")))?
        .into_iter()
        .map(FamilyGroupRow::into_domain)
        .collect()
}

/// Loads the turn state for a rotation year.
///
/// # Errors
///
/// Returns an error if the query fails or the stored order cannot be decoded.
pub fn get_rotation_order(
    conn: &mut SqliteConnection,
    scope: RotationScope,
) -> Result<Option<RotationOrderState>, PersistenceError> {
    rotation_orders::table
        .filter(rotation_orders::organization_id.eq(scope.organization_id))
        .filter(rotation_orders::rotation_year.eq(scope.rotation_year))
        .select(RotationOrderRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_rotation_order: {e}")))?
        .map(RotationOrderRow::into_domain)
        .transpose()
}

/// Loads every usage row of a rotation year.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn list_usage(
    conn: &mut SqliteConnection,
    scope: RotationScope,
) -> Result<Vec<TimePeriodUsage>, PersistenceError> {
    time_period_usage::table
        .filter(time_period_usage::organization_id.eq(scope.organization_id))
        .filter(time_period_usage::rotation_year.eq(scope.rotation_year))
        .order(time_period_usage::usage_id.asc())
        .select(UsageRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_usage: {e}")))?
        .into_iter()
        .map(UsageRow::into_domain)
        .collect()
}

/// Loads a family's selection window.
///
/// # Errors
///
/// Returns an error if the query fails or a stored date is invalid.
pub fn get_reservation_period(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
) -> Result<Option<ReservationPeriodData>, PersistenceError> {
    let row: Option<(String, String, Option<String>)> = reservation_periods::table
        .filter(reservation_periods::organization_id.eq(scope.organization_id))
        .filter(reservation_periods::rotation_year.eq(scope.rotation_year))
        .filter(reservation_periods::family_group.eq(family_group))
        .select((
            reservation_periods::selection_start_date,
            reservation_periods::selection_end_date,
            reservation_periods::extended_until,
        ))
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_reservation_period: {e}")))?;

    row.map(|(start, end, extended)| {
        Ok(ReservationPeriodData {
            family_group: family_group.to_string(),
            selection_start_date: stored_date(&start, "selection_start_date")?,
            selection_end_date: stored_date(&end, "selection_end_date")?,
            extended_until: extended
                .as_deref()
                .map(|value| stored_date(value, "extended_until"))
                .transpose()?,
        })
    })
    .transpose()
}

/// Families whose selection window is extended through `today` or later.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_extensions(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    today: Date,
) -> Result<HashSet<String>, PersistenceError> {
    // ISO dates compare correctly as text.
    let families: Vec<String> = reservation_periods::table
        .filter(reservation_periods::organization_id.eq(scope.organization_id))
        .filter(reservation_periods::rotation_year.eq(scope.rotation_year))
        .filter(reservation_periods::extended_until.ge(format_date(today)))
        .select(reservation_periods::family_group)
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("active_extensions: {e}")))?;
    Ok(families.into_iter().collect())
}

/// Lists a family's notification log, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_notifications(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
) -> Result<Vec<NotificationLogData>, PersistenceError> {
    let rows: Vec<(String, String, String)> = notification_log::table
        .filter(notification_log::organization_id.eq(scope.organization_id))
        .filter(notification_log::rotation_year.eq(scope.rotation_year))
        .filter(notification_log::family_group.eq(family_group))
        .order(notification_log::notification_id.asc())
        .select((
            notification_log::family_group,
            notification_log::notification_type,
            notification_log::status,
        ))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_notifications: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|(family_group, notification_type, status)| NotificationLogData {
            family_group,
            notification_type,
            status,
        })
        .collect())
}

fn primary_reservations(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
) -> Result<Vec<Reservation>, PersistenceError> {
    reservations::table
        .filter(reservations::organization_id.eq(scope.organization_id))
        .filter(reservations::rotation_year.eq(scope.rotation_year))
        .filter(reservations::family_group.eq(family_group))
        .filter(reservations::selection_round.eq(SelectionRound::Primary.as_str()))
        .select(ReservationRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("primary_reservations: {e}")))?
        .into_iter()
        .map(ReservationRow::into_domain)
        .collect()
}

/// Nights a family holds in primary-round reservations.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn primary_nights_booked(
    conn: &mut SqliteConnection,
    scope: RotationScope,
    family_group: &str,
) -> Result<u32, PersistenceError> {
    let nights: u32 = primary_reservations(conn, scope, family_group)?
        .iter()
        .map(Reservation::nights)
        .fold(0, u32::saturating_add);
    debug!(%scope, family = %family_group, nights, "Counted primary nights");
    Ok(nights)
}

/// Number of primary-round reservations per family.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn primary_reservation_counts(
    conn: &mut SqliteConnection,
    scope: RotationScope,
) -> Result<HashMap<String, u32>, PersistenceError> {
    let rows: Vec<(String, i64)> = reservations::table
        .filter(reservations::organization_id.eq(scope.organization_id))
        .filter(reservations::rotation_year.eq(scope.rotation_year))
        .filter(reservations::selection_round.eq(SelectionRound::Primary.as_str()))
        .group_by(reservations::family_group)
        .select((reservations::family_group, count_star()))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("primary_reservation_counts: {e}")))?;

    rows.into_iter()
        .map(|(family, count)| {
            let count: u32 = count
                .to_u32()
                .ok_or_else(|| PersistenceError::InvalidStoredValue {
                    column: "reservations.count",
                    value: count.to_string(),
                })?;
            Ok((family, count))
        })
        .collect()
}

/// Whether usage has been reconciled for the scope.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_reconciled(
    conn: &mut SqliteConnection,
    scope: RotationScope,
) -> Result<bool, PersistenceError> {
    diesel::select(exists(
        usage_reconciliations::table
            .filter(usage_reconciliations::organization_id.eq(scope.organization_id))
            .filter(usage_reconciliations::rotation_year.eq(scope.rotation_year)),
    ))
    .get_result(conn)
    .map_err(|e| PersistenceError::QueryFailed(format!("is_reconciled: {e}")))
}
