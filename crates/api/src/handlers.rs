// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.

use cabin_rotation::{
    AdvanceOutcome, BookingOutcome, ReconciliationOutcome, RotationOrderState,
    SecondaryGeneration, SelectionState, TurnNotifier,
};
use cabin_rotation_domain::{
    BillingConfig, BookingRequest, BookingValidation, CheckInSession, FamilyGroup, OccupancyUpdate,
    Reservation, RotationConfig, RotationScope, SeasonConfig, SeasonSummary, TimePeriodWindow,
    MAX_GUESTS, UsageInfo, validate_family_group_fields, validate_family_group_unique,
    validate_rotation_order,
};
use cabin_rotation_persistence::{PaymentUpdate, Persistence};
use time::{Date, Month};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, persistence_error};
use crate::request_response::{
    AdvanceSelectionRequest, AdvanceSelectionResponse, BookingRequestBody,
    CreateFamilyGroupRequest, CreateFamilyGroupResponse, CreateReservationResponse,
    ExtendSelectionWindowRequest, ExtendSelectionWindowResponse, GenerateSecondaryPeriodsResponse,
    GetTimePeriodWindowsResponse, GetUsageInfoResponse, ListFamilyGroupsResponse,
    ReconcileUsageRequest, ReconcileUsageResponse, RecordCheckInRequest, RecordCheckInResponse,
    RecordPaymentRequest, RecordPaymentResponse, SaveConfigResponse, SetRotationOrderRequest,
    SetRotationOrderResponse, UpdateOccupancyRequest, UpdateOccupancyResponse,
    ValidateBookingResponse,
};

/// Today's date in the organization's configured timezone.
///
/// # Errors
///
/// Returns an error if the organization has no rotation configuration or
/// its timezone is invalid.
pub fn organization_today(
    persistence: &mut Persistence,
    organization_id: i64,
) -> Result<Date, ApiError> {
    Ok(cabin_rotation::organization_today(
        persistence,
        organization_id,
    )?)
}

// ============================================================================
// Configuration
// ============================================================================

/// Saves an organization's rotation configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The configuration is invalid
/// - The database operation fails
pub fn upsert_rotation_config(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    organization_id: i64,
    config: &RotationConfig,
) -> Result<SaveConfigResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "upsert_rotation_config")?;
    config.validate()?;

    persistence
        .upsert_rotation_config(organization_id, config)
        .map_err(|e| persistence_error("save rotation configuration", &e))?;

    info!(
        organization_id,
        actor = %authenticated_actor.id,
        max_time_slots = config.max_time_slots,
        timezone = %config.timezone,
        "Saved rotation configuration"
    );

    Ok(SaveConfigResponse {
        organization_id,
        message: String::from("Rotation configuration saved"),
    })
}

/// Saves an organization's billing configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The configuration is invalid
/// - The database operation fails
pub fn upsert_billing_config(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    organization_id: i64,
    config: &BillingConfig,
) -> Result<SaveConfigResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "upsert_billing_config")?;
    config.validate()?;

    persistence
        .upsert_billing_config(organization_id, config)
        .map_err(|e| persistence_error("save billing configuration", &e))?;

    info!(
        organization_id,
        actor = %authenticated_actor.id,
        method = ?config.method,
        "Saved billing configuration"
    );

    Ok(SaveConfigResponse {
        organization_id,
        message: String::from("Billing configuration saved"),
    })
}

/// Saves an organization's season configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The configuration is invalid
/// - The database operation fails
pub fn upsert_season_config(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    organization_id: i64,
    config: &SeasonConfig,
) -> Result<SaveConfigResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "upsert_season_config")?;
    config.validate()?;

    persistence
        .upsert_season_config(organization_id, config)
        .map_err(|e| persistence_error("save season configuration", &e))?;

    info!(
        organization_id,
        actor = %authenticated_actor.id,
        "Saved season configuration"
    );

    Ok(SaveConfigResponse {
        organization_id,
        message: String::from("Season configuration saved"),
    })
}

// ============================================================================
// Family groups and rotation order
// ============================================================================

/// Creates a family group.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - A field is invalid
/// - The name is already taken in the organization
/// - The database operation fails
pub fn create_family_group(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    organization_id: i64,
    request: &CreateFamilyGroupRequest,
) -> Result<CreateFamilyGroupResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_family_group")?;

    let family_group: FamilyGroup = FamilyGroup {
        family_group_id: None,
        organization_id,
        name: request.name.trim().to_string(),
        lead: request.lead.clone(),
        host_members: request.host_members.clone(),
        color: request.color.clone(),
    };
    validate_family_group_fields(&family_group)?;

    let existing: Vec<FamilyGroup> = persistence
        .list_family_groups(organization_id)
        .map_err(|e| persistence_error("list family groups", &e))?;
    validate_family_group_unique(&family_group, &existing)?;

    let family_group_id: i64 = persistence
        .create_family_group(&family_group)
        .map_err(|e| persistence_error("create family group", &e))?;

    info!(
        organization_id,
        family_group_id,
        name = %family_group.name,
        actor = %authenticated_actor.id,
        "Created family group"
    );

    Ok(CreateFamilyGroupResponse {
        family_group_id,
        message: format!("Created family group '{}'", family_group.name),
        name: family_group.name,
    })
}

/// Lists an organization's family groups.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn list_family_groups(
    persistence: &mut Persistence,
    organization_id: i64,
) -> Result<ListFamilyGroupsResponse, ApiError> {
    let family_groups: Vec<FamilyGroup> = persistence
        .list_family_groups(organization_id)
        .map_err(|e| persistence_error("list family groups", &e))?;

    Ok(ListFamilyGroupsResponse {
        organization_id,
        family_groups,
    })
}

/// Sets the rotation order for a year and opens the first family's turn.
///
/// Replacing an existing order resets the turn pointers.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The order is empty, repeats a family, or names an unknown family
/// - The database operation fails
pub fn set_rotation_order(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    request: &SetRotationOrderRequest,
) -> Result<SetRotationOrderResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "set_rotation_order")?;

    if request.family_order.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("family_order"),
            message: String::from("Rotation order must name at least one family group"),
        });
    }

    let family_groups: Vec<FamilyGroup> = persistence
        .list_family_groups(scope.organization_id)
        .map_err(|e| persistence_error("list family groups", &e))?;
    validate_rotation_order(scope.organization_id, &request.family_order, &family_groups)?;

    let state: RotationOrderState = persistence
        .set_rotation_order(scope, &request.family_order)
        .map_err(|e| persistence_error("set rotation order", &e))?;

    info!(
        %scope,
        families = state.family_order.len(),
        version = state.version,
        actor = %authenticated_actor.id,
        "Set rotation order"
    );

    Ok(SetRotationOrderResponse {
        rotation_year: scope.rotation_year,
        family_order: state.family_order,
        current_primary_turn_family: state.current_primary_turn_family,
        version: state.version,
        message: format!("Rotation order for {} saved", scope.rotation_year),
    })
}

// ============================================================================
// Windows and bookings
// ============================================================================

/// Calculates the time period windows starting in a month.
///
/// # Errors
///
/// Returns an error if:
/// - The month is not 1-12
/// - The rotation configuration or order is missing
/// - The database operation fails
pub fn get_time_period_windows(
    persistence: &mut Persistence,
    scope: RotationScope,
    month: u8,
    today: Date,
) -> Result<GetTimePeriodWindowsResponse, ApiError> {
    let calendar_month: Month = Month::try_from(month).map_err(|_| ApiError::InvalidInput {
        field: String::from("month"),
        message: format!("Month must be between 1 and 12, got {month}"),
    })?;

    let windows: Vec<TimePeriodWindow> =
        cabin_rotation::time_period_windows(persistence, scope, calendar_month, today)?;

    Ok(GetTimePeriodWindowsResponse {
        rotation_year: scope.rotation_year,
        month,
        windows,
    })
}

fn booking_request(request: &BookingRequestBody) -> BookingRequest {
    BookingRequest {
        start: request.start,
        end: request.end,
        family_group: request.family_group.clone(),
    }
}

/// Validates a proposed booking without recording it.
///
/// Rule violations are returned in the response, not as errors.
///
/// # Errors
///
/// Returns an error if:
/// - A non-admin requests an admin override
/// - The rotation configuration or order is missing
/// - The database operation fails
pub fn validate_booking(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    request: &BookingRequestBody,
    today: Date,
) -> Result<ValidateBookingResponse, ApiError> {
    AuthorizationService::authorize_booking(authenticated_actor, request.admin_override)?;

    let validation: BookingValidation = cabin_rotation::validate_booking_request(
        persistence,
        scope,
        &booking_request(request),
        request.admin_override,
        today,
    )?;

    Ok(ValidateBookingResponse {
        family_group: request.family_group.clone(),
        validation,
    })
}

/// Rejects guest counts of zero or above `MAX_GUESTS`.
fn validate_guest_count(guest_count: u32, what: &str) -> Result<(), ApiError> {
    if guest_count == 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("guest_count"),
            message: format!("A {what} needs at least one guest"),
        });
    }
    if guest_count > MAX_GUESTS {
        return Err(ApiError::InvalidInput {
            field: String::from("guest_count"),
            message: format!("A {what} may have at most {MAX_GUESTS} guests"),
        });
    }
    Ok(())
}

/// Validates a booking and records it if it passes.
///
/// # Errors
///
/// Returns an error if:
/// - A non-admin requests an admin override
/// - The guest count is zero or above `MAX_GUESTS`
/// - The rotation configuration or order is missing
/// - The database operation fails
pub fn create_reservation(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    request: &BookingRequestBody,
    today: Date,
) -> Result<CreateReservationResponse, ApiError> {
    AuthorizationService::authorize_booking(authenticated_actor, request.admin_override)?;

    validate_guest_count(request.guest_count, "reservation")?;

    let outcome: BookingOutcome = cabin_rotation::book_reservation(
        persistence,
        scope,
        &booking_request(request),
        request.guest_count,
        request.admin_override,
        today,
    )?;

    let response: CreateReservationResponse = match outcome {
        BookingOutcome::Booked {
            reservation_id,
            round,
            validation,
        } => CreateReservationResponse {
            reservation_id: Some(reservation_id),
            round: Some(round),
            message: format!(
                "Booked {} nights for '{}'",
                validation.nights, request.family_group
            ),
            validation,
        },
        BookingOutcome::Rejected { validation } => CreateReservationResponse {
            reservation_id: None,
            round: None,
            message: String::from("Booking rejected"),
            validation,
        },
    };

    Ok(response)
}

// ============================================================================
// Selection
// ============================================================================

/// Loads the selection phase and every family's status.
///
/// # Errors
///
/// Returns an error if the rotation configuration or order is missing, or
/// the database operation fails.
pub fn get_selection_state(
    persistence: &mut Persistence,
    scope: RotationScope,
    today: Date,
) -> Result<SelectionState, ApiError> {
    Ok(cabin_rotation::selection_state(persistence, scope, today)?)
}

/// Ends the current turn and opens the next one.
///
/// # Errors
///
/// Returns an error if:
/// - `expected_version` no longer matches the stored state
/// - No family holds a turn, or the rotation is over
/// - Another caller advanced the turn first
/// - The database operation fails
pub fn advance_selection<N: TurnNotifier + ?Sized>(
    persistence: &mut Persistence,
    notifier: &N,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    request: &AdvanceSelectionRequest,
    today: Date,
) -> Result<AdvanceSelectionResponse, ApiError> {
    if let Some(expected_version) = request.expected_version {
        let state: RotationOrderState = cabin_rotation::require_rotation_order(persistence, scope)?;
        if state.version != expected_version {
            return Err(ApiError::Conflict {
                message: format!(
                    "Selection state changed (expected version {expected_version}, found {}); reload and retry",
                    state.version
                ),
            });
        }
    }

    let outcome: AdvanceOutcome =
        cabin_rotation::advance_selection(persistence, notifier, scope, request.completed, today)?;

    info!(
        %scope,
        actor = %authenticated_actor.id,
        completed_family = %outcome.completed_family,
        next_family = outcome.next_family.as_deref().unwrap_or("<none>"),
        "Selection advanced"
    );

    let message: String = outcome.next_family.as_ref().map_or_else(
        || format!("Turn of '{}' ended; no further turns", outcome.completed_family),
        |next| format!("Turn passed from '{}' to '{next}'", outcome.completed_family),
    );

    Ok(AdvanceSelectionResponse { outcome, message })
}

/// Generates secondary periods and opens the first secondary turn.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - Secondary selection is disabled
/// - The rotation configuration or order is missing
/// - The database operation fails
pub fn generate_secondary_periods<N: TurnNotifier + ?Sized>(
    persistence: &mut Persistence,
    notifier: &N,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    today: Date,
) -> Result<GenerateSecondaryPeriodsResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "generate_secondary_periods")?;

    let generation: SecondaryGeneration =
        cabin_rotation::generate_secondary_periods(persistence, notifier, scope, today)?;

    let message: String = if generation.generated {
        String::from("Secondary periods generated")
    } else {
        String::from("Secondary periods were already generated")
    };

    Ok(GenerateSecondaryPeriodsResponse {
        generation,
        message,
    })
}

/// Extends a family's selection window.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The family has no selection window for the year
/// - The database operation fails
pub fn extend_selection_window(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    family_group: &str,
    request: &ExtendSelectionWindowRequest,
) -> Result<ExtendSelectionWindowResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "extend_selection_window")?;

    let extended: bool = persistence
        .extend_selection_window(scope, family_group, request.until)
        .map_err(|e| persistence_error("extend selection window", &e))?;
    if !extended {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Selection window"),
            message: format!(
                "No selection window for '{family_group}' in {}",
                scope.rotation_year
            ),
        });
    }

    info!(
        %scope,
        family = %family_group,
        until = %request.until,
        actor = %authenticated_actor.id,
        "Extended selection window"
    );

    Ok(ExtendSelectionWindowResponse {
        family_group: family_group.to_string(),
        extended_until: request.until,
        message: format!("Selection window for '{family_group}' extended"),
    })
}

// ============================================================================
// Usage
// ============================================================================

/// Returns a family's used, allowed and remaining periods in the current phase.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn get_usage_info(
    persistence: &mut Persistence,
    scope: RotationScope,
    family_group: &str,
) -> Result<GetUsageInfoResponse, ApiError> {
    let usage: Option<UsageInfo> =
        cabin_rotation::user_usage_info(persistence, scope, family_group)?;

    Ok(GetUsageInfoResponse {
        rotation_year: scope.rotation_year,
        family_group: family_group.to_string(),
        usage,
    })
}

/// Recomputes usage counters from recorded reservations.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The rotation configuration or order is missing
/// - The database operation fails
pub fn reconcile_usage(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    scope: RotationScope,
    request: &ReconcileUsageRequest,
) -> Result<ReconcileUsageResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "reconcile_usage")?;

    let outcome: ReconciliationOutcome =
        cabin_rotation::reconcile_usage(persistence, scope, request.force)?;

    let message: String = if outcome.skipped {
        String::from("Usage already reconciled")
    } else {
        format!("Applied {} usage corrections", outcome.corrections.len())
    };

    Ok(ReconcileUsageResponse {
        rotation_year: scope.rotation_year,
        skipped: outcome.skipped,
        corrections: outcome.corrections,
        message,
    })
}

// ============================================================================
// Season and billing
// ============================================================================

/// Builds a family's season summary.
///
/// # Errors
///
/// Returns an error if the billing or season configuration is missing, or
/// the database operation fails.
pub fn get_season_summary(
    persistence: &mut Persistence,
    organization_id: i64,
    family_group: &str,
    season_year: i32,
    today: Date,
) -> Result<SeasonSummary, ApiError> {
    Ok(cabin_rotation::season_summary(
        persistence,
        organization_id,
        family_group,
        season_year,
        today,
    )?)
}

/// Replaces a payment's recorded occupancy and recomputes its charge.
///
/// # Errors
///
/// Returns an error if:
/// - The payment or its reservation does not exist
/// - An entry lies outside the stay or has no guests
/// - The billing configuration is missing
/// - The database operation fails
pub fn update_occupancy(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    payment_id: i64,
    request: &UpdateOccupancyRequest,
) -> Result<UpdateOccupancyResponse, ApiError> {
    let update: OccupancyUpdate =
        cabin_rotation::update_occupancy(persistence, payment_id, &request.daily_occupancy)?;

    info!(
        payment_id,
        actor = %authenticated_actor.id,
        amount_cents = update.amount_cents,
        "Occupancy updated"
    );

    Ok(UpdateOccupancyResponse {
        payment_id,
        daily_occupancy: update.daily_occupancy,
        amount_cents: update.amount_cents,
        billing: update.billing,
    })
}

fn require_reservation(
    persistence: &mut Persistence,
    reservation_id: i64,
) -> Result<Reservation, ApiError> {
    persistence
        .get_reservation(reservation_id)
        .map_err(|e| persistence_error("load reservation", &e))?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Reservation"),
            message: format!("Reservation {reservation_id} does not exist"),
        })
}

/// Creates or updates the payment for a reservation.
///
/// Stored occupancy and the charged amount are left unchanged.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an admin
/// - The paid amount is negative
/// - The reservation does not exist
/// - The database operation fails
pub fn record_payment(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    reservation_id: i64,
    request: &RecordPaymentRequest,
) -> Result<RecordPaymentResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "record_payment")?;

    if request.amount_paid_cents < 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("amount_paid_cents"),
            message: String::from("Paid amount cannot be negative"),
        });
    }

    require_reservation(persistence, reservation_id)?;

    let payment_id: i64 = persistence
        .upsert_payment(
            reservation_id,
            PaymentUpdate {
                amount_paid_cents: request.amount_paid_cents,
                billing_locked: request.billing_locked,
                manual_adjustment_cents: request.manual_adjustment_cents,
            },
        )
        .map_err(|e| persistence_error("record payment", &e))?;

    info!(
        payment_id,
        reservation_id,
        amount_paid_cents = request.amount_paid_cents,
        actor = %authenticated_actor.id,
        "Recorded payment"
    );

    Ok(RecordPaymentResponse {
        payment_id,
        reservation_id,
        message: format!("Payment recorded for reservation {reservation_id}"),
    })
}

/// Records a check-in for one night of a stay.
///
/// # Errors
///
/// Returns an error if:
/// - The guest count is zero or above `MAX_GUESTS`
/// - The reservation does not exist
/// - The date is not a night of the stay
/// - The database operation fails
pub fn record_check_in(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
    reservation_id: i64,
    request: &RecordCheckInRequest,
) -> Result<RecordCheckInResponse, ApiError> {
    validate_guest_count(request.guest_count, "check-in")?;

    let reservation: Reservation = require_reservation(persistence, reservation_id)?;
    if request.check_date < reservation.start_date || request.check_date >= reservation.end_date {
        return Err(ApiError::InvalidInput {
            field: String::from("check_date"),
            message: format!(
                "{} is not a night of the stay {} to {}",
                request.check_date, reservation.start_date, reservation.end_date
            ),
        });
    }

    let session_id: i64 = persistence
        .create_check_in_session(&CheckInSession {
            session_id: None,
            reservation_id,
            check_date: request.check_date,
            guest_count: request.guest_count,
        })
        .map_err(|e| persistence_error("record check-in", &e))?;

    info!(
        session_id,
        reservation_id,
        check_date = %request.check_date,
        guests = request.guest_count,
        actor = %authenticated_actor.id,
        "Recorded check-in"
    );

    Ok(RecordCheckInResponse {
        session_id,
        reservation_id,
        check_date: request.check_date,
        guest_count: request.guest_count,
    })
}
