// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use cabin_rotation::{AdvanceOutcome, SecondaryGeneration};
use cabin_rotation_domain::{
    BillingResult, BookingValidation, Contact, DailyOccupancy, FamilyGroup, HostMember,
    OccupancyEntry, SelectionRound, TimePeriodWindow, UsageCorrection, UsageInfo,
};
use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};

/// API response for a saved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveConfigResponse {
    /// The organization the configuration belongs to.
    pub organization_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to create a family group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFamilyGroupRequest {
    /// Display name, unique within the organization.
    pub name: String,
    /// Lead contact.
    #[serde(default)]
    pub lead: Option<Contact>,
    /// Host members.
    #[serde(default)]
    pub host_members: Vec<HostMember>,
    /// Display color (`#RRGGBB`).
    #[serde(default)]
    pub color: Option<String>,
}

/// API response for a created family group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFamilyGroupResponse {
    /// The canonical numeric identifier.
    pub family_group_id: i64,
    /// The family group name.
    pub name: String,
    /// A success message.
    pub message: String,
}

/// API response listing an organization's family groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFamilyGroupsResponse {
    /// The organization.
    pub organization_id: i64,
    /// Family groups ordered by name.
    pub family_groups: Vec<FamilyGroup>,
}

/// API request to set a year's rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRotationOrderRequest {
    /// Family group names in rotation order.
    pub family_order: Vec<String>,
}

/// API response for a saved rotation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRotationOrderResponse {
    pub rotation_year: i32,
    pub family_order: Vec<String>,
    /// The family whose turn is open.
    pub current_primary_turn_family: Option<String>,
    pub version: i64,
    /// A success message.
    pub message: String,
}

/// API response with the time period windows of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTimePeriodWindowsResponse {
    pub rotation_year: i32,
    /// Calendar month, 1-12.
    pub month: u8,
    pub windows: Vec<TimePeriodWindow>,
}

/// API request to validate or create a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequestBody {
    /// The requesting family group.
    pub family_group: String,
    /// Check-in.
    pub start: PrimitiveDateTime,
    /// Check-out.
    pub end: PrimitiveDateTime,
    /// Guests staying. Ignored by validation.
    #[serde(default)]
    pub guest_count: u32,
    /// Skip window and allowance checks. Admin only.
    #[serde(default)]
    pub admin_override: bool,
}

/// API response for a booking validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateBookingResponse {
    pub family_group: String,
    pub validation: BookingValidation,
}

/// API response for a booking attempt.
///
/// A rejected booking is a successful response with `reservation_id` unset
/// and the reasons in `validation.errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationResponse {
    pub reservation_id: Option<i64>,
    /// The round whose allowance the booking consumed.
    pub round: Option<SelectionRound>,
    pub validation: BookingValidation,
    /// A human-readable summary.
    pub message: String,
}

/// API request to advance the selection turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceSelectionRequest {
    /// In the secondary round, `false` ends the round instead of moving on.
    #[serde(default = "default_completed")]
    pub completed: bool,
    /// The state version the caller read. A mismatch is reported as a conflict.
    #[serde(default)]
    pub expected_version: Option<i64>,
}

const fn default_completed() -> bool {
    true
}

/// API response for an advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceSelectionResponse {
    pub outcome: AdvanceOutcome,
    /// A success message.
    pub message: String,
}

/// API response for secondary period generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateSecondaryPeriodsResponse {
    pub generation: SecondaryGeneration,
    /// A success message.
    pub message: String,
}

/// API request to extend a family's selection window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendSelectionWindowRequest {
    /// Last day of the extension, inclusive.
    pub until: Date,
}

/// API response for an extended selection window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendSelectionWindowResponse {
    pub family_group: String,
    pub extended_until: Date,
    /// A success message.
    pub message: String,
}

/// API response with a family's usage in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUsageInfoResponse {
    pub rotation_year: i32,
    pub family_group: String,
    /// `None` when the organization has no rotation configuration.
    pub usage: Option<UsageInfo>,
}

/// API request to reconcile usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileUsageRequest {
    /// Run even if the year was already reconciled.
    #[serde(default)]
    pub force: bool,
}

/// API response for a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileUsageResponse {
    pub rotation_year: i32,
    /// True when the year had already been reconciled.
    pub skipped: bool,
    pub corrections: Vec<UsageCorrection>,
    /// A success message.
    pub message: String,
}

/// API request to replace a payment's recorded occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOccupancyRequest {
    pub daily_occupancy: Vec<OccupancyEntry>,
}

/// API response for an occupancy edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOccupancyResponse {
    pub payment_id: i64,
    /// Stored days with their computed cost.
    pub daily_occupancy: Vec<DailyOccupancy>,
    /// The new charged amount.
    pub amount_cents: i64,
    pub billing: BillingResult,
}

/// API request to record a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount_paid_cents: i64,
    #[serde(default)]
    pub billing_locked: bool,
    #[serde(default)]
    pub manual_adjustment_cents: i64,
}

/// API response for a recorded payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPaymentResponse {
    pub payment_id: i64,
    pub reservation_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to record a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCheckInRequest {
    pub check_date: Date,
    pub guest_count: u32,
}

/// API response for a recorded check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCheckInResponse {
    pub session_id: i64,
    pub reservation_id: i64,
    pub check_date: Date,
    pub guest_count: u32,
}
