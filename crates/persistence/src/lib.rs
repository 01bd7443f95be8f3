// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Cabin Rotation system.
//!
//! Stores per-organization configuration, family groups, rotation turn
//! state, usage counters, reservations, payments and check-in sessions in
//! `SQLite` through Diesel, and implements the core crate's store traits.
//!
//! ## Databases
//!
//! - `Persistence::new_in_memory()` opens an isolated shared in-memory
//!   database. Each call gets its own database, which keeps tests independent.
//! - `Persistence::new_with_file()` opens (or creates) a file database in
//!   WAL mode.
//!
//! Migrations are embedded and applied on open. Foreign key enforcement is
//! verified before the adapter is handed out.
//!
//! ## Concurrency
//!
//! Turn-changing writes are compare-and-swap on the rotation order's
//! `version` column and run in `IMMEDIATE` transactions, so two adapters on
//! the same file cannot both advance the same turn.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{NotificationLogData, ReservationPeriodData};
pub use error::PersistenceError;
pub use mutations::season::PaymentUpdate;

use cabin_rotation::RotationOrderState;
use cabin_rotation_domain::{
    BillingConfig, CheckInSession, FamilyGroup, Payment, Reservation, RotationConfig,
    RotationScope, SeasonConfig, TimePeriodUsage,
};
use time::Date;

/// Sequence for naming isolated in-memory databases.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `SQLite` persistence adapter.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Opens a fresh, isolated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:cabin_memdb_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Opens (or creates) a file database.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8 or the database
    /// cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError(String::from("Invalid database path"))
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Saves an organization's rotation configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_rotation_config(
        &mut self,
        organization_id: i64,
        config: &RotationConfig,
    ) -> Result<(), PersistenceError> {
        mutations::config::upsert_rotation_config(&mut self.conn, organization_id, config)
    }

    /// Saves an organization's billing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_billing_config(
        &mut self,
        organization_id: i64,
        config: &BillingConfig,
    ) -> Result<(), PersistenceError> {
        mutations::config::upsert_billing_config(&mut self.conn, organization_id, config)
    }

    /// Saves an organization's season configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_season_config(
        &mut self,
        organization_id: i64,
        config: &SeasonConfig,
    ) -> Result<(), PersistenceError> {
        mutations::config::upsert_season_config(&mut self.conn, organization_id, config)
    }

    /// Loads an organization's rotation configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_rotation_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<RotationConfig>, PersistenceError> {
        queries::config::get_rotation_config(&mut self.conn, organization_id)
    }

    /// Loads an organization's billing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_billing_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<BillingConfig>, PersistenceError> {
        queries::config::get_billing_config(&mut self.conn, organization_id)
    }

    /// Loads an organization's season configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_season_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<SeasonConfig>, PersistenceError> {
        queries::config::get_season_config(&mut self.conn, organization_id)
    }

    // ========================================================================
    // Family groups and rotation order
    // ========================================================================

    /// Creates a family group and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the write fails.
    pub fn create_family_group(&mut self, family_group: &FamilyGroup) -> Result<i64, PersistenceError> {
        mutations::rotation::create_family_group(&mut self.conn, family_group)
    }

    /// Loads a family group by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_family_group(
        &mut self,
        organization_id: i64,
        name: &str,
    ) -> Result<Option<FamilyGroup>, PersistenceError> {
        queries::rotation::get_family_group(&mut self.conn, organization_id, name)
    }

    /// Lists an organization's family groups ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_family_groups(
        &mut self,
        organization_id: i64,
    ) -> Result<Vec<FamilyGroup>, PersistenceError> {
        queries::rotation::list_family_groups(&mut self.conn, organization_id)
    }

    /// Creates or replaces the rotation order of a year.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_rotation_order(
        &mut self,
        scope: RotationScope,
        family_order: &[String],
    ) -> Result<RotationOrderState, PersistenceError> {
        mutations::rotation::set_rotation_order(&mut self.conn, scope, family_order)
    }

    /// Loads the turn state of a rotation year.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_rotation_order(
        &mut self,
        scope: RotationScope,
    ) -> Result<Option<RotationOrderState>, PersistenceError> {
        queries::rotation::get_rotation_order(&mut self.conn, scope)
    }

    /// Loads every usage row of a rotation year.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_usage(&mut self, scope: RotationScope) -> Result<Vec<TimePeriodUsage>, PersistenceError> {
        queries::rotation::list_usage(&mut self.conn, scope)
    }

    // ========================================================================
    // Selection windows and notifications
    // ========================================================================

    /// Loads a family's selection window.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_reservation_period(
        &mut self,
        scope: RotationScope,
        family_group: &str,
    ) -> Result<Option<ReservationPeriodData>, PersistenceError> {
        queries::rotation::get_reservation_period(&mut self.conn, scope, family_group)
    }

    /// Extends a family's selection window through `until`.
    ///
    /// Returns `false` if the family has no selection window.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn extend_selection_window(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        until: Date,
    ) -> Result<bool, PersistenceError> {
        mutations::rotation::extend_selection_window(&mut self.conn, scope, family_group, until)
    }

    /// Loads a family's notification log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_notifications(
        &mut self,
        scope: RotationScope,
        family_group: &str,
    ) -> Result<Vec<NotificationLogData>, PersistenceError> {
        queries::rotation::list_notifications(&mut self.conn, scope, family_group)
    }

    // ========================================================================
    // Reservations, payments and check-ins
    // ========================================================================

    /// Inserts a reservation without touching usage counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_reservation(&mut self, reservation: &Reservation) -> Result<i64, PersistenceError> {
        mutations::season::insert_reservation(&mut self.conn, reservation)
    }

    /// Loads one reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_reservation(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, PersistenceError> {
        queries::season::get_reservation(&mut self.conn, reservation_id)
    }

    /// Creates or updates a reservation's payment; returns the payment id.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation does not exist or the write fails.
    pub fn upsert_payment(
        &mut self,
        reservation_id: i64,
        update: PaymentUpdate,
    ) -> Result<i64, PersistenceError> {
        mutations::season::upsert_payment(&mut self.conn, reservation_id, update)
    }

    /// Loads one payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_payment(&mut self, payment_id: i64) -> Result<Option<Payment>, PersistenceError> {
        queries::season::get_payment(&mut self.conn, payment_id)
    }

    /// Loads the payment of a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_payment_for_reservation(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<Payment>, PersistenceError> {
        queries::season::get_payment_for_reservation(&mut self.conn, reservation_id)
    }

    /// Appends a check-in session; returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation does not exist or the insert fails.
    pub fn create_check_in_session(
        &mut self,
        session: &CheckInSession,
    ) -> Result<i64, PersistenceError> {
        mutations::season::create_check_in_session(&mut self.conn, session)
    }

    /// Loads check-in sessions for the given reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_check_in_sessions(
        &mut self,
        reservation_ids: &[i64],
    ) -> Result<Vec<CheckInSession>, PersistenceError> {
        queries::season::list_check_in_sessions(&mut self.conn, reservation_ids)
    }
}
