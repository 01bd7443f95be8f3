// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration upserts. Each organization has at most one row per table.

use crate::data_models::{BillingConfigRow, RotationConfigRow, SeasonConfigRow};
use crate::diesel_schema::{billing_configs, rotation_configs, season_configs};
use crate::error::PersistenceError;
use cabin_rotation_domain::{BillingConfig, RotationConfig, SeasonConfig};
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

/// Inserts or replaces an organization's rotation configuration.
///
/// # Errors
///
/// Returns an error if a value is out of range or the write fails.
pub fn upsert_rotation_config(
    conn: &mut SqliteConnection,
    organization_id: i64,
    config: &RotationConfig,
) -> Result<(), PersistenceError> {
    let row: RotationConfigRow = RotationConfigRow::from_domain(organization_id, config)?;
    diesel::insert_into(rotation_configs::table)
        .values(&row)
        .on_conflict(rotation_configs::organization_id)
        .do_update()
        .set(&row)
        .execute(conn)?;
    info!(organization_id, "Saved rotation configuration");
    Ok(())
}

/// Inserts or replaces an organization's billing configuration.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_billing_config(
    conn: &mut SqliteConnection,
    organization_id: i64,
    config: &BillingConfig,
) -> Result<(), PersistenceError> {
    let row: BillingConfigRow = BillingConfigRow::from_domain(organization_id, config);
    diesel::insert_into(billing_configs::table)
        .values(&row)
        .on_conflict(billing_configs::organization_id)
        .do_update()
        .set(&row)
        .execute(conn)?;
    info!(organization_id, method = %config.method, "Saved billing configuration");
    Ok(())
}

/// Inserts or replaces an organization's season configuration.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_season_config(
    conn: &mut SqliteConnection,
    organization_id: i64,
    config: &SeasonConfig,
) -> Result<(), PersistenceError> {
    let row: SeasonConfigRow = SeasonConfigRow::from_domain(organization_id, config);
    diesel::insert_into(season_configs::table)
        .values(&row)
        .on_conflict(season_configs::organization_id)
        .do_update()
        .set(&row)
        .execute(conn)?;
    info!(organization_id, "Saved season configuration");
    Ok(())
}
