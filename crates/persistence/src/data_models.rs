// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their mapping to domain values.
//!
//! Dates are stored as `YYYY-MM-DD` text, booleans as `0`/`1` integers and
//! nested values (contacts, rotation order, daily occupancy) as JSON text.

use crate::diesel_schema::{
    billing_configs, check_in_sessions, family_groups, payments, reservations, rotation_configs,
    rotation_orders, season_configs, time_period_usage,
};
use crate::error::PersistenceError;
use cabin_rotation::RotationOrderState;
use cabin_rotation_domain::{
    BillingConfig, BillingMethod, CheckInSession, Contact, DailyOccupancy, FamilyGroup,
    HostMember, Payment, Reservation, RotationConfig, RotationScope, SeasonConfig,
    SelectionRound, TimePeriodUsage, format_date, parse_date,
};
use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Weekday};

pub(crate) fn to_i32(value: u32, column: &'static str) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::ValueOutOfRange {
            column,
            value: value.to_string(),
        })
}

pub(crate) fn to_u32(value: i32, column: &'static str) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| PersistenceError::InvalidStoredValue {
            column,
            value: value.to_string(),
        })
}

fn to_u8(value: i32, column: &'static str) -> Result<u8, PersistenceError> {
    value
        .to_u8()
        .ok_or_else(|| PersistenceError::InvalidStoredValue {
            column,
            value: value.to_string(),
        })
}

pub(crate) const fn flag(value: bool) -> i32 {
    if value { 1 } else { 0 }
}

pub(crate) fn stored_date(value: &str, column: &'static str) -> Result<Date, PersistenceError> {
    parse_date(value).map_err(|_| PersistenceError::InvalidStoredValue {
        column,
        value: value.to_string(),
    })
}

fn stored_round(value: &str, column: &'static str) -> Result<SelectionRound, PersistenceError> {
    SelectionRound::from_str(value).map_err(|_| PersistenceError::InvalidStoredValue {
        column,
        value: value.to_string(),
    })
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = rotation_configs)]
#[diesel(primary_key(organization_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RotationConfigRow {
    pub organization_id: i64,
    pub start_day: i32,
    pub max_time_slots: i32,
    pub max_nights: i32,
    pub min_nights_per_booking: i32,
    pub max_consecutive_nights_primary: i32,
    pub max_consecutive_nights_secondary: i32,
    pub total_nights_allowed_primary: Option<i32>,
    pub post_rotation_min_nights: i32,
    pub post_rotation_max_consecutive_nights: i32,
    pub enable_secondary_selection: i32,
    pub enable_post_rotation_selection: i32,
    pub primary_selection_days: i32,
    pub secondary_selection_days: i32,
    pub secondary_max_periods: i32,
    pub timezone: String,
}

impl RotationConfigRow {
    pub fn from_domain(
        organization_id: i64,
        config: &RotationConfig,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            organization_id,
            start_day: i32::from(config.start_day.number_days_from_sunday()),
            max_time_slots: to_i32(config.max_time_slots, "max_time_slots")?,
            max_nights: to_i32(config.max_nights, "max_nights")?,
            min_nights_per_booking: to_i32(
                config.min_nights_per_booking,
                "min_nights_per_booking",
            )?,
            max_consecutive_nights_primary: to_i32(
                config.max_consecutive_nights_primary,
                "max_consecutive_nights_primary",
            )?,
            max_consecutive_nights_secondary: to_i32(
                config.max_consecutive_nights_secondary,
                "max_consecutive_nights_secondary",
            )?,
            total_nights_allowed_primary: config
                .total_nights_allowed_primary
                .map(|n| to_i32(n, "total_nights_allowed_primary"))
                .transpose()?,
            post_rotation_min_nights: to_i32(
                config.post_rotation_min_nights,
                "post_rotation_min_nights",
            )?,
            post_rotation_max_consecutive_nights: to_i32(
                config.post_rotation_max_consecutive_nights,
                "post_rotation_max_consecutive_nights",
            )?,
            enable_secondary_selection: flag(config.enable_secondary_selection),
            enable_post_rotation_selection: flag(config.enable_post_rotation_selection),
            primary_selection_days: to_i32(
                config.primary_selection_days,
                "primary_selection_days",
            )?,
            secondary_selection_days: to_i32(
                config.secondary_selection_days,
                "secondary_selection_days",
            )?,
            secondary_max_periods: to_i32(config.secondary_max_periods, "secondary_max_periods")?,
            timezone: config.timezone.clone(),
        })
    }

    pub fn into_domain(self) -> Result<RotationConfig, PersistenceError> {
        Ok(RotationConfig {
            start_day: Weekday::Sunday.nth_next(to_u8(self.start_day, "start_day")? % 7),
            max_time_slots: to_u32(self.max_time_slots, "max_time_slots")?,
            max_nights: to_u32(self.max_nights, "max_nights")?,
            min_nights_per_booking: to_u32(self.min_nights_per_booking, "min_nights_per_booking")?,
            max_consecutive_nights_primary: to_u32(
                self.max_consecutive_nights_primary,
                "max_consecutive_nights_primary",
            )?,
            max_consecutive_nights_secondary: to_u32(
                self.max_consecutive_nights_secondary,
                "max_consecutive_nights_secondary",
            )?,
            total_nights_allowed_primary: self
                .total_nights_allowed_primary
                .map(|n| to_u32(n, "total_nights_allowed_primary"))
                .transpose()?,
            post_rotation_min_nights: to_u32(
                self.post_rotation_min_nights,
                "post_rotation_min_nights",
            )?,
            post_rotation_max_consecutive_nights: to_u32(
                self.post_rotation_max_consecutive_nights,
                "post_rotation_max_consecutive_nights",
            )?,
            enable_secondary_selection: self.enable_secondary_selection != 0,
            enable_post_rotation_selection: self.enable_post_rotation_selection != 0,
            primary_selection_days: to_u32(self.primary_selection_days, "primary_selection_days")?,
            secondary_selection_days: to_u32(
                self.secondary_selection_days,
                "secondary_selection_days",
            )?,
            secondary_max_periods: to_u32(self.secondary_max_periods, "secondary_max_periods")?,
            timezone: self.timezone,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = billing_configs)]
#[diesel(primary_key(organization_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BillingConfigRow {
    pub organization_id: i64,
    pub billing_method: String,
    pub rate_cents: i64,
    pub cleaning_fee_cents: i64,
    pub tax_rate_basis_points: i64,
}

impl BillingConfigRow {
    pub fn from_domain(organization_id: i64, config: &BillingConfig) -> Self {
        Self {
            organization_id,
            billing_method: config.method.as_str().to_string(),
            rate_cents: config.rate_cents,
            cleaning_fee_cents: config.cleaning_fee_cents,
            tax_rate_basis_points: config.tax_rate_basis_points,
        }
    }

    pub fn into_domain(self) -> Result<BillingConfig, PersistenceError> {
        let method: BillingMethod = BillingMethod::from_str(&self.billing_method).map_err(|_| {
            PersistenceError::InvalidStoredValue {
                column: "billing_method",
                value: self.billing_method.clone(),
            }
        })?;
        Ok(BillingConfig {
            method,
            rate_cents: self.rate_cents,
            cleaning_fee_cents: self.cleaning_fee_cents,
            tax_rate_basis_points: self.tax_rate_basis_points,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = season_configs)]
#[diesel(primary_key(organization_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SeasonConfigRow {
    pub organization_id: i64,
    pub start_month: i32,
    pub start_day: i32,
    pub end_month: i32,
    pub end_day: i32,
    pub payment_deadline_offset_days: i64,
}

impl SeasonConfigRow {
    pub fn from_domain(organization_id: i64, config: &SeasonConfig) -> Self {
        Self {
            organization_id,
            start_month: i32::from(config.start_month),
            start_day: i32::from(config.start_day),
            end_month: i32::from(config.end_month),
            end_day: i32::from(config.end_day),
            payment_deadline_offset_days: config.payment_deadline_offset_days,
        }
    }

    pub fn into_domain(self) -> Result<SeasonConfig, PersistenceError> {
        Ok(SeasonConfig {
            start_month: to_u8(self.start_month, "start_month")?,
            start_day: to_u8(self.start_day, "start_day")?,
            end_month: to_u8(self.end_month, "end_month")?,
            end_day: to_u8(self.end_day, "end_day")?,
            payment_deadline_offset_days: self.payment_deadline_offset_days,
        })
    }
}

// ============================================================================
// Family groups and rotation state
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = family_groups)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FamilyGroupRow {
    pub family_group_id: i64,
    pub organization_id: i64,
    pub name: String,
    pub lead_json: Option<String>,
    pub host_members_json: String,
    pub color: Option<String>,
}

impl FamilyGroupRow {
    pub fn into_domain(self) -> Result<FamilyGroup, PersistenceError> {
        let lead: Option<Contact> = self
            .lead_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let host_members: Vec<HostMember> = serde_json::from_str(&self.host_members_json)?;
        Ok(FamilyGroup {
            family_group_id: Some(self.family_group_id),
            organization_id: self.organization_id,
            name: self.name,
            lead,
            host_members,
            color: self.color,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = family_groups)]
pub struct NewFamilyGroup {
    pub organization_id: i64,
    pub name: String,
    pub lead_json: Option<String>,
    pub host_members_json: String,
    pub color: Option<String>,
}

impl NewFamilyGroup {
    pub fn from_domain(family_group: &FamilyGroup) -> Result<Self, PersistenceError> {
        Ok(Self {
            organization_id: family_group.organization_id,
            name: family_group.name.clone(),
            lead_json: family_group
                .lead
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            host_members_json: serde_json::to_string(&family_group.host_members)?,
            color: family_group.color.clone(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rotation_orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RotationOrderRow {
    pub rotation_order_id: i64,
    pub organization_id: i64,
    pub rotation_year: i32,
    pub family_order_json: String,
    pub current_primary_turn_family: Option<String>,
    pub current_secondary_turn_family: Option<String>,
    pub secondary_round_active: i32,
    pub secondary_periods_generated: i32,
    pub version: i64,
}

impl RotationOrderRow {
    pub fn into_domain(self) -> Result<RotationOrderState, PersistenceError> {
        Ok(RotationOrderState {
            scope: RotationScope::new(self.organization_id, self.rotation_year),
            family_order: serde_json::from_str(&self.family_order_json)?,
            current_primary_turn_family: self.current_primary_turn_family,
            current_secondary_turn_family: self.current_secondary_turn_family,
            secondary_round_active: self.secondary_round_active != 0,
            secondary_periods_generated: self.secondary_periods_generated != 0,
            version: self.version,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = time_period_usage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UsageRow {
    pub usage_id: i64,
    pub organization_id: i64,
    pub rotation_year: i32,
    pub family_group: String,
    pub time_periods_used: i32,
    pub time_periods_allowed: i32,
    pub secondary_periods_used: i32,
    pub secondary_periods_allowed: i32,
    pub turn_completed: i32,
    pub selection_round: String,
}

impl UsageRow {
    pub fn into_domain(self) -> Result<TimePeriodUsage, PersistenceError> {
        Ok(TimePeriodUsage {
            usage_id: Some(self.usage_id),
            scope: RotationScope::new(self.organization_id, self.rotation_year),
            family_group: self.family_group,
            time_periods_used: to_u32(self.time_periods_used, "time_periods_used")?,
            time_periods_allowed: to_u32(self.time_periods_allowed, "time_periods_allowed")?,
            secondary_periods_used: to_u32(self.secondary_periods_used, "secondary_periods_used")?,
            secondary_periods_allowed: to_u32(
                self.secondary_periods_allowed,
                "secondary_periods_allowed",
            )?,
            turn_completed: self.turn_completed != 0,
            selection_round: stored_round(&self.selection_round, "time_period_usage.selection_round")?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = time_period_usage)]
pub struct NewUsage {
    pub organization_id: i64,
    pub rotation_year: i32,
    pub family_group: String,
    pub time_periods_used: i32,
    pub time_periods_allowed: i32,
    pub secondary_periods_used: i32,
    pub secondary_periods_allowed: i32,
    pub turn_completed: i32,
    pub selection_round: String,
}

impl NewUsage {
    pub fn from_domain(usage: &TimePeriodUsage) -> Result<Self, PersistenceError> {
        Ok(Self {
            organization_id: usage.scope.organization_id,
            rotation_year: usage.scope.rotation_year,
            family_group: usage.family_group.clone(),
            time_periods_used: to_i32(usage.time_periods_used, "time_periods_used")?,
            time_periods_allowed: to_i32(usage.time_periods_allowed, "time_periods_allowed")?,
            secondary_periods_used: to_i32(
                usage.secondary_periods_used,
                "secondary_periods_used",
            )?,
            secondary_periods_allowed: to_i32(
                usage.secondary_periods_allowed,
                "secondary_periods_allowed",
            )?,
            turn_completed: flag(usage.turn_completed),
            selection_round: usage.selection_round.as_str().to_string(),
        })
    }
}

/// A family's selection window for a rotation year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPeriodData {
    pub family_group: String,
    pub selection_start_date: Date,
    pub selection_end_date: Date,
    pub extended_until: Option<Date>,
}

/// One notification log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationLogData {
    pub family_group: String,
    pub notification_type: String,
    pub status: String,
}

// ============================================================================
// Stays and billing
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReservationRow {
    pub reservation_id: i64,
    pub organization_id: i64,
    pub rotation_year: i32,
    pub family_group: String,
    pub start_date: String,
    pub end_date: String,
    pub guest_count: i32,
    pub selection_round: String,
}

impl ReservationRow {
    pub fn into_domain(self) -> Result<Reservation, PersistenceError> {
        Ok(Reservation {
            reservation_id: Some(self.reservation_id),
            organization_id: self.organization_id,
            rotation_year: self.rotation_year,
            family_group: self.family_group,
            start_date: stored_date(&self.start_date, "reservations.start_date")?,
            end_date: stored_date(&self.end_date, "reservations.end_date")?,
            guest_count: to_u32(self.guest_count, "reservations.guest_count")?,
            selection_round: stored_round(&self.selection_round, "reservations.selection_round")?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub organization_id: i64,
    pub rotation_year: i32,
    pub family_group: String,
    pub start_date: String,
    pub end_date: String,
    pub guest_count: i32,
    pub selection_round: String,
}

impl NewReservation {
    pub fn from_domain(reservation: &Reservation) -> Result<Self, PersistenceError> {
        Ok(Self {
            organization_id: reservation.organization_id,
            rotation_year: reservation.rotation_year,
            family_group: reservation.family_group.clone(),
            start_date: format_date(reservation.start_date),
            end_date: format_date(reservation.end_date),
            guest_count: to_i32(reservation.guest_count, "reservations.guest_count")?,
            selection_round: reservation.selection_round.as_str().to_string(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentRow {
    pub payment_id: i64,
    pub reservation_id: i64,
    pub amount_cents: Option<i64>,
    pub amount_paid_cents: i64,
    pub billing_locked: i32,
    pub manual_adjustment_cents: i64,
    pub daily_occupancy_json: String,
}

impl PaymentRow {
    pub fn into_domain(self) -> Result<Payment, PersistenceError> {
        let daily_occupancy: Vec<DailyOccupancy> =
            serde_json::from_str(&self.daily_occupancy_json)?;
        Ok(Payment {
            payment_id: Some(self.payment_id),
            reservation_id: self.reservation_id,
            amount_cents: self.amount_cents,
            amount_paid_cents: self.amount_paid_cents,
            billing_locked: self.billing_locked != 0,
            manual_adjustment_cents: self.manual_adjustment_cents,
            daily_occupancy,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPayment {
    pub reservation_id: i64,
    pub amount_cents: Option<i64>,
    pub amount_paid_cents: i64,
    pub billing_locked: i32,
    pub manual_adjustment_cents: i64,
    pub daily_occupancy_json: String,
}

impl NewPayment {
    pub fn from_domain(payment: &Payment) -> Result<Self, PersistenceError> {
        Ok(Self {
            reservation_id: payment.reservation_id,
            amount_cents: payment.amount_cents,
            amount_paid_cents: payment.amount_paid_cents,
            billing_locked: flag(payment.billing_locked),
            manual_adjustment_cents: payment.manual_adjustment_cents,
            daily_occupancy_json: serde_json::to_string(&payment.daily_occupancy)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = check_in_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CheckInSessionRow {
    pub session_id: i64,
    pub reservation_id: i64,
    pub check_date: String,
    pub guest_count: i32,
}

impl CheckInSessionRow {
    pub fn into_domain(self) -> Result<CheckInSession, PersistenceError> {
        Ok(CheckInSession {
            session_id: Some(self.session_id),
            reservation_id: self.reservation_id,
            check_date: stored_date(&self.check_date, "check_in_sessions.check_date")?,
            guest_count: to_u32(self.guest_count, "check_in_sessions.guest_count")?,
        })
    }
}
