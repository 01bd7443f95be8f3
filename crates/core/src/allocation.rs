// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time period windows, booking validation and usage lookups backed by the store.

use crate::error::CoreError;
use crate::state::RotationOrderState;
use crate::store::{NewBooking, RotationStore};
use crate::{load_rotation_order, require_rotation_config, require_rotation_order};
use cabin_rotation_domain::{
    BookingContext, BookingRequest, BookingValidation, Reservation, RotationConfig,
    RotationScope, SelectionPhase, SelectionRound, TimePeriodUsage, TimePeriodWindow, UsageInfo,
    calculate_time_period_windows, usage_info, validate_booking,
};
use serde::{Deserialize, Serialize};
use time::{Date, Month};
use tracing::{debug, info};

/// Calculates the windows starting in `month` of the scope's rotation year.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, or the store fails.
pub fn time_period_windows<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    month: Month,
    today: Date,
) -> Result<Vec<TimePeriodWindow>, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    Ok(calculate_time_period_windows(
        &config,
        &order.family_order,
        today.year(),
        scope.rotation_year,
        month,
    )?)
}

/// Windows that can contain a booking starting on `start`.
///
/// The last window of a month runs into the next one, so the previous
/// month's windows are included.
fn candidate_windows(
    config: &RotationConfig,
    order: &RotationOrderState,
    current_year: i32,
    start: Date,
) -> Result<Vec<TimePeriodWindow>, CoreError> {
    let previous_month: Month = start.month().previous();
    let previous_year: i32 = if start.month() == Month::January {
        start.year() - 1
    } else {
        start.year()
    };

    let mut windows: Vec<TimePeriodWindow> = calculate_time_period_windows(
        config,
        &order.family_order,
        current_year,
        previous_year,
        previous_month,
    )?;
    windows.extend(calculate_time_period_windows(
        config,
        &order.family_order,
        current_year,
        start.year(),
        start.month(),
    )?);
    Ok(windows)
}

struct ValidationRun {
    config: RotationConfig,
    phase: SelectionPhase,
    validation: BookingValidation,
}

fn run_validation<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    request: &BookingRequest,
    admin_override: bool,
    today: Date,
) -> Result<ValidationRun, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    let usage: Vec<TimePeriodUsage> = store.list_usage(scope)?;
    let phase: SelectionPhase = order.phase(&config, &usage);
    let windows: Vec<TimePeriodWindow> =
        candidate_windows(&config, &order, today.year(), request.start.date())?;
    let nights_already_booked: u32 = store.primary_nights_booked(scope, &request.family_group)?;

    let row: Option<&TimePeriodUsage> = usage
        .iter()
        .find(|row| row.family_group == request.family_group);

    let validation: BookingValidation = validate_booking(
        request,
        &windows,
        &BookingContext {
            config: &config,
            phase,
            usage: row,
            nights_already_booked,
            admin_override,
        },
    );

    debug!(
        %scope,
        family = %request.family_group,
        %phase,
        admin_override,
        is_valid = validation.is_valid,
        "Validated booking"
    );

    Ok(ValidationRun {
        config,
        phase,
        validation,
    })
}

/// Validates a proposed booking against the rotation rules.
///
/// Rule violations are reported in the returned value, not as errors.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, or the store fails.
pub fn validate_booking_request<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    request: &BookingRequest,
    admin_override: bool,
    today: Date,
) -> Result<BookingValidation, CoreError> {
    Ok(run_validation(store, scope, request, admin_override, today)?.validation)
}

/// Result of a booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingOutcome {
    /// The reservation was recorded.
    Booked {
        reservation_id: i64,
        round: SelectionRound,
        validation: BookingValidation,
    },
    /// The booking broke a rotation rule; nothing was written.
    Rejected { validation: BookingValidation },
}

/// Validates a booking and, if it passes, records it and consumes a period.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, or the store fails.
pub fn book_reservation<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    request: &BookingRequest,
    guest_count: u32,
    admin_override: bool,
    today: Date,
) -> Result<BookingOutcome, CoreError> {
    let run: ValidationRun = run_validation(store, scope, request, admin_override, today)?;
    if !run.validation.is_valid {
        return Ok(BookingOutcome::Rejected {
            validation: run.validation,
        });
    }

    let round: SelectionRound = match run.phase {
        SelectionPhase::Secondary => SelectionRound::Secondary,
        SelectionPhase::Primary | SelectionPhase::PostRotation => SelectionRound::Primary,
    };

    let reservation: Reservation = Reservation {
        reservation_id: None,
        organization_id: scope.organization_id,
        rotation_year: scope.rotation_year,
        family_group: request.family_group.clone(),
        start_date: request.start.date(),
        end_date: request.end.date(),
        guest_count,
        selection_round: round,
    };

    let reservation_id: i64 = store.record_booking(
        scope,
        &NewBooking {
            reservation: &reservation,
            round,
            default_primary_allowed: run.config.max_time_slots,
        },
    )?;

    info!(
        %scope,
        reservation_id,
        family = %request.family_group,
        %round,
        nights = run.validation.nights,
        "Recorded booking"
    );

    Ok(BookingOutcome::Booked {
        reservation_id,
        round,
        validation: run.validation,
    })
}

/// Used, allowed and remaining periods for a family in the current phase.
///
/// Returns `None` if the organization has no rotation configuration. A
/// scope without a rotation order is treated as being in the primary phase.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn user_usage_info<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    family_group: &str,
) -> Result<Option<UsageInfo>, CoreError> {
    let Some(config) = store.load_rotation_config(scope.organization_id)? else {
        return Ok(None);
    };
    let usage: Vec<TimePeriodUsage> = store.list_usage(scope)?;
    let phase: SelectionPhase = load_rotation_order(store, scope)?
        .map_or(SelectionPhase::Primary, |order| order.phase(&config, &usage));
    let row: Option<&TimePeriodUsage> = usage.iter().find(|row| row.family_group == family_group);
    Ok(usage_info(Some(&config), phase, row))
}
