// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store trait implementations for the core services.

use crate::{Persistence, mutations, queries};
use cabin_rotation::{
    CoreError, NewBooking, NotificationStatus, RotationOrderState, RotationStore, SeasonStore,
    SecondaryRoundStart,
};
use cabin_rotation_domain::{
    BillingConfig, CheckInSession, DailyOccupancy, FamilyGroup, Payment, Reservation,
    RotationConfig, RotationScope, SeasonConfig, TimePeriodUsage, UsageCorrection,
};
use std::collections::{HashMap, HashSet};
use time::Date;

impl RotationStore for Persistence {
    fn load_rotation_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<RotationConfig>, CoreError> {
        Ok(queries::config::get_rotation_config(&mut self.conn, organization_id)?)
    }

    fn load_rotation_order(
        &mut self,
        scope: RotationScope,
    ) -> Result<Option<RotationOrderState>, CoreError> {
        Ok(queries::rotation::get_rotation_order(&mut self.conn, scope)?)
    }

    fn list_usage(&mut self, scope: RotationScope) -> Result<Vec<TimePeriodUsage>, CoreError> {
        Ok(queries::rotation::list_usage(&mut self.conn, scope)?)
    }

    fn load_family_group(
        &mut self,
        organization_id: i64,
        name: &str,
    ) -> Result<Option<FamilyGroup>, CoreError> {
        Ok(queries::rotation::get_family_group(&mut self.conn, organization_id, name)?)
    }

    fn advance_primary_turn(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        completed_family: &str,
        next_family: Option<&str>,
    ) -> Result<bool, CoreError> {
        let default_allowed: u32 =
            queries::config::get_rotation_config(&mut self.conn, scope.organization_id)?
                .map_or(0, |config| config.max_time_slots);
        Ok(mutations::rotation::advance_primary_turn(
            &mut self.conn,
            scope,
            expected_version,
            completed_family,
            next_family,
            default_allowed,
        )?)
    }

    fn start_secondary_round(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        start: SecondaryRoundStart<'_>,
    ) -> Result<bool, CoreError> {
        Ok(mutations::rotation::start_secondary_round(
            &mut self.conn,
            scope,
            expected_version,
            start,
        )?)
    }

    fn set_secondary_turn(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        next_family: Option<&str>,
    ) -> Result<bool, CoreError> {
        Ok(mutations::rotation::set_secondary_turn(
            &mut self.conn,
            scope,
            expected_version,
            next_family,
        )?)
    }

    fn open_selection_window(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        start: Date,
        end: Date,
    ) -> Result<(), CoreError> {
        Ok(mutations::rotation::open_selection_window(
            &mut self.conn,
            scope,
            family_group,
            start,
            end,
        )?)
    }

    fn active_extensions(
        &mut self,
        scope: RotationScope,
        today: Date,
    ) -> Result<HashSet<String>, CoreError> {
        Ok(queries::rotation::active_extensions(&mut self.conn, scope, today)?)
    }

    fn delete_pending_notifications(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        notification_type: &str,
    ) -> Result<usize, CoreError> {
        Ok(mutations::rotation::delete_pending_notifications(
            &mut self.conn,
            scope,
            family_group,
            notification_type,
        )?)
    }

    fn record_notification(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        notification_type: &str,
        status: NotificationStatus,
    ) -> Result<(), CoreError> {
        Ok(mutations::rotation::record_notification(
            &mut self.conn,
            scope,
            family_group,
            notification_type,
            status,
        )?)
    }

    fn primary_nights_booked(
        &mut self,
        scope: RotationScope,
        family_group: &str,
    ) -> Result<u32, CoreError> {
        Ok(queries::rotation::primary_nights_booked(&mut self.conn, scope, family_group)?)
    }

    fn primary_reservation_counts(
        &mut self,
        scope: RotationScope,
    ) -> Result<HashMap<String, u32>, CoreError> {
        Ok(queries::rotation::primary_reservation_counts(&mut self.conn, scope)?)
    }

    fn record_booking(
        &mut self,
        scope: RotationScope,
        booking: &NewBooking<'_>,
    ) -> Result<i64, CoreError> {
        Ok(mutations::rotation::record_booking(&mut self.conn, scope, booking)?)
    }

    fn reconciliation_recorded(&mut self, scope: RotationScope) -> Result<bool, CoreError> {
        Ok(queries::rotation::is_reconciled(&mut self.conn, scope)?)
    }

    fn apply_usage_reconciliation(
        &mut self,
        scope: RotationScope,
        corrections: &[UsageCorrection],
    ) -> Result<(), CoreError> {
        Ok(mutations::rotation::apply_usage_reconciliation(
            &mut self.conn,
            scope,
            corrections,
        )?)
    }
}

impl SeasonStore for Persistence {
    fn load_billing_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<BillingConfig>, CoreError> {
        Ok(queries::config::get_billing_config(&mut self.conn, organization_id)?)
    }

    fn load_season_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<SeasonConfig>, CoreError> {
        Ok(queries::config::get_season_config(&mut self.conn, organization_id)?)
    }

    fn list_family_reservations(
        &mut self,
        organization_id: i64,
        family_group: &str,
        first: Date,
        last: Date,
    ) -> Result<Vec<Reservation>, CoreError> {
        Ok(queries::season::list_family_reservations(
            &mut self.conn,
            organization_id,
            family_group,
            first,
            last,
        )?)
    }

    fn list_payments(&mut self, reservation_ids: &[i64]) -> Result<Vec<Payment>, CoreError> {
        Ok(queries::season::list_payments(&mut self.conn, reservation_ids)?)
    }

    fn list_check_in_sessions(
        &mut self,
        reservation_ids: &[i64],
    ) -> Result<Vec<CheckInSession>, CoreError> {
        Ok(queries::season::list_check_in_sessions(&mut self.conn, reservation_ids)?)
    }

    fn load_reservation(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, CoreError> {
        Ok(queries::season::get_reservation(&mut self.conn, reservation_id)?)
    }

    fn load_payment(&mut self, payment_id: i64) -> Result<Option<Payment>, CoreError> {
        Ok(queries::season::get_payment(&mut self.conn, payment_id)?)
    }

    fn save_occupancy(
        &mut self,
        payment_id: i64,
        daily_occupancy: &[DailyOccupancy],
        amount_cents: i64,
    ) -> Result<(), CoreError> {
        Ok(mutations::season::save_occupancy(
            &mut self.conn,
            payment_id,
            daily_occupancy,
            amount_cents,
        )?)
    }
}
