// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration queries.

use crate::data_models::{BillingConfigRow, RotationConfigRow, SeasonConfigRow};
use crate::diesel_schema::{billing_configs, rotation_configs, season_configs};
use crate::error::PersistenceError;
use cabin_rotation_domain::{BillingConfig, RotationConfig, SeasonConfig};
use diesel::SqliteConnection;
use diesel::prelude::*;

/// Loads an organization's rotation configuration.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn get_rotation_config(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Option<RotationConfig>, PersistenceError> {
    rotation_configs::table
        .filter(rotation_configs::organization_id.eq(organization_id))
        .select(RotationConfigRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_rotation_config: {e}")))?
        .map(RotationConfigRow::into_domain)
        .transpose()
}

/// Loads an organization's billing configuration.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn get_billing_config(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Option<BillingConfig>, PersistenceError> {
    billing_configs::table
        .filter(billing_configs::organization_id.eq(organization_id))
        .select(BillingConfigRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_billing_config: {e}")))?
        .map(BillingConfigRow::into_domain)
        .transpose()
}

/// Loads an organization's season configuration.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is invalid.
pub fn get_season_config(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Option<SeasonConfig>, PersistenceError> {
    season_configs::table
        .filter(season_configs::organization_id.eq(organization_id))
        .select(SeasonConfigRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_season_config: {e}")))?
        .map(SeasonConfigRow::into_domain)
        .transpose()
}
