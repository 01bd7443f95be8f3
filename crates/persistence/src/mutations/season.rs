// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Season mutations: reservations, payments, occupancy and check-ins.

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewPayment, NewReservation, flag, to_i32};
use crate::diesel_schema::{check_in_sessions, payments, reservations};
use crate::error::PersistenceError;
use cabin_rotation_domain::{CheckInSession, DailyOccupancy, Payment, Reservation, format_date};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

/// Payment fields an administrator records by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub amount_paid_cents: i64,
    pub billing_locked: bool,
    pub manual_adjustment_cents: i64,
}

/// Inserts a reservation without touching usage counters.
///
/// # Errors
///
/// Returns an error if a value is out of range or the insert fails.
pub fn insert_reservation(
    conn: &mut SqliteConnection,
    reservation: &Reservation,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(reservations::table)
        .values(&NewReservation::from_domain(reservation)?)
        .execute(conn)?;
    let reservation_id: i64 = get_last_insert_rowid(conn)?;
    debug!(reservation_id, family = %reservation.family_group, "Inserted reservation");
    Ok(reservation_id)
}

/// Creates or updates the payment row of a reservation.
///
/// Stored occupancy and the charged amount are left as they are.
///
/// # Errors
///
/// Returns an error if the reservation does not exist or the write fails.
pub fn upsert_payment(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    update: PaymentUpdate,
) -> Result<i64, PersistenceError> {
    conn.immediate_transaction::<_, PersistenceError, _>(|conn| {
        let existing: Option<i64> = payments::table
            .filter(payments::reservation_id.eq(reservation_id))
            .select(payments::payment_id)
            .first(conn)
            .optional()?;

        let payment_id: i64 = if let Some(payment_id) = existing {
            diesel::update(payments::table.find(payment_id))
                .set((
                    payments::amount_paid_cents.eq(update.amount_paid_cents),
                    payments::billing_locked.eq(flag(update.billing_locked)),
                    payments::manual_adjustment_cents.eq(update.manual_adjustment_cents),
                ))
                .execute(conn)?;
            payment_id
        } else {
            let payment: Payment = Payment {
                payment_id: None,
                reservation_id,
                amount_cents: None,
                amount_paid_cents: update.amount_paid_cents,
                billing_locked: update.billing_locked,
                manual_adjustment_cents: update.manual_adjustment_cents,
                daily_occupancy: Vec::new(),
            };
            diesel::insert_into(payments::table)
                .values(&NewPayment::from_domain(&payment)?)
                .execute(conn)?;
            get_last_insert_rowid(conn)?
        };

        info!(
            payment_id,
            reservation_id,
            amount_paid_cents = update.amount_paid_cents,
            billing_locked = update.billing_locked,
            "Recorded payment"
        );
        Ok(payment_id)
    })
}

/// Replaces a payment's occupancy and charged amount.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the payment does not exist, or an
/// error if the write fails.
pub fn save_occupancy(
    conn: &mut SqliteConnection,
    payment_id: i64,
    daily_occupancy: &[DailyOccupancy],
    amount_cents: i64,
) -> Result<(), PersistenceError> {
    let daily_occupancy_json: String = serde_json::to_string(daily_occupancy)?;
    let updated: usize = diesel::update(payments::table.find(payment_id))
        .set((
            payments::daily_occupancy_json.eq(daily_occupancy_json),
            payments::amount_cents.eq(Some(amount_cents)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("payment {payment_id}")));
    }
    Ok(())
}

/// Appends a check-in session.
///
/// # Errors
///
/// Returns an error if the reservation does not exist or the insert fails.
pub fn create_check_in_session(
    conn: &mut SqliteConnection,
    session: &CheckInSession,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(check_in_sessions::table)
        .values((
            check_in_sessions::reservation_id.eq(session.reservation_id),
            check_in_sessions::check_date.eq(format_date(session.check_date)),
            check_in_sessions::guest_count.eq(to_i32(session.guest_count, "check_in_sessions.guest_count")?),
        ))
        .execute(conn)?;
    let session_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        session_id,
        reservation_id = session.reservation_id,
        check_date = %session.check_date,
        "Recorded check-in session"
    );
    Ok(session_id)
}
