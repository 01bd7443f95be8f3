// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the cabin rotation system.
//!
//! Handlers take an open [`Persistence`](cabin_rotation_persistence::Persistence),
//! the authenticated actor and a request DTO, enforce role checks, call into
//! the core services and translate every failure into an [`ApiError`].

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

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role};
pub use error::{ApiError, AuthError, translate_core_error, translate_domain_error};
pub use handlers::{
    advance_selection, create_family_group, create_reservation, extend_selection_window,
    generate_secondary_periods, get_season_summary, get_selection_state, get_time_period_windows,
    get_usage_info, list_family_groups, organization_today, reconcile_usage, record_check_in,
    record_payment, set_rotation_order, update_occupancy, upsert_billing_config,
    upsert_rotation_config, upsert_season_config, validate_booking,
};
pub use request_response::{
    AdvanceSelectionRequest, AdvanceSelectionResponse, BookingRequestBody,
    CreateFamilyGroupRequest, CreateFamilyGroupResponse, CreateReservationResponse,
    ExtendSelectionWindowRequest, ExtendSelectionWindowResponse, GenerateSecondaryPeriodsResponse,
    GetTimePeriodWindowsResponse, GetUsageInfoResponse, ListFamilyGroupsResponse,
    ReconcileUsageRequest, ReconcileUsageResponse, RecordCheckInRequest, RecordCheckInResponse,
    RecordPaymentRequest, RecordPaymentResponse, SaveConfigResponse, SetRotationOrderRequest,
    SetRotationOrderResponse, UpdateOccupancyRequest, UpdateOccupancyResponse,
    ValidateBookingResponse,
};
