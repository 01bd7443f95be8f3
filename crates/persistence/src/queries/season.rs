// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Season queries: reservations, payments and check-in sessions.

use crate::data_models::{CheckInSessionRow, PaymentRow, ReservationRow};
use crate::diesel_schema::{check_in_sessions, payments, reservations};
use crate::error::PersistenceError;
use cabin_rotation_domain::{CheckInSession, Payment, Reservation, format_date};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::Date;

/// Loads a family's reservations overlapping `[first, last]`, ordered by start date.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn list_family_reservations(
    conn: &mut SqliteConnection,
    organization_id: i64,
    family_group: &str,
    first: Date,
    last: Date,
) -> Result<Vec<Reservation>, PersistenceError> {
    reservations::table
        .filter(reservations::organization_id.eq(organization_id))
        .filter(reservations::family_group.eq(family_group))
        .filter(reservations::start_date.le(format_date(last)))
        .filter(reservations::end_date.gt(format_date(first)))
        .order(reservations::start_date.asc())
        .select(ReservationRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_family_reservations: {e}")))?
        .into_iter()
        .map(ReservationRow::into_domain)
        .collect()
}

/// Loads one reservation.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn get_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<Option<Reservation>, PersistenceError> {
    reservations::table
        .filter(reservations::reservation_id.eq(reservation_id))
        .select(ReservationRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_reservation: {e}")))?
        .map(ReservationRow::into_domain)
        .transpose()
}

/// Loads the payments of the given reservations.
///
/// # Errors
///
/// Returns an error if the query fails or stored occupancy cannot be decoded.
pub fn list_payments(
    conn: &mut SqliteConnection,
    reservation_ids: &[i64],
) -> Result<Vec<Payment>, PersistenceError> {
    payments::table
        .filter(payments::reservation_id.eq_any(reservation_ids))
        .select(PaymentRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_payments: {e}")))?
        .into_iter()
        .map(PaymentRow::into_domain)
        .collect()
}

/// Loads one payment.
///
/// # Errors
///
/// Returns an error if the query fails or stored occupancy cannot be decoded.
pub fn get_payment(
    conn: &mut SqliteConnection,
    payment_id: i64,
) -> Result<Option<Payment>, PersistenceError> {
    payments::table
        .filter(payments::payment_id.eq(payment_id))
        .select(PaymentRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_payment: {e}")))?
        .map(PaymentRow::into_domain)
        .transpose()
}

/// Loads the payment of one reservation.
///
/// # Errors
///
/// Returns an error if the query fails or stored occupancy cannot be decoded.
pub fn get_payment_for_reservation(
    conn: &mut SqliteConnection,
    reservation_id: i64,
) -> Result<Option<Payment>, PersistenceError> {
    payments::table
        .filter(payments::reservation_id.eq(reservation_id))
        .select(PaymentRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| {
            PersistenceError::QueryFailed(format!("get_payment_for_reservation: {e}"))
        })?
        .map(PaymentRow::into_domain)
        .transpose()
}

/// Loads check-in sessions of the given reservations, ordered by date.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn list_check_in_sessions(
    conn: &mut SqliteConnection,
    reservation_ids: &[i64],
) -> Result<Vec<CheckInSession>, PersistenceError> {
    check_in_sessions::table
        .filter(check_in_sessions::reservation_id.eq_any(reservation_ids))
        .order((
            check_in_sessions::check_date.asc(),
            check_in_sessions::session_id.asc(),
        ))
        .select(CheckInSessionRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_check_in_sessions: {e}")))?
        .into_iter()
        .map(CheckInSessionRow::into_domain)
        .collect()
}
