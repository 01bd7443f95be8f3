// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod actor;
mod notifier;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use cabin_rotation::SelectionState;
use cabin_rotation_api::{
    AdvanceSelectionRequest, AdvanceSelectionResponse, ApiError, BookingRequestBody,
    CreateFamilyGroupRequest, CreateFamilyGroupResponse, CreateReservationResponse,
    ExtendSelectionWindowRequest, ExtendSelectionWindowResponse, GenerateSecondaryPeriodsResponse,
    GetTimePeriodWindowsResponse, GetUsageInfoResponse, ListFamilyGroupsResponse,
    ReconcileUsageRequest, ReconcileUsageResponse, RecordCheckInRequest, RecordCheckInResponse,
    RecordPaymentRequest, RecordPaymentResponse, SaveConfigResponse, SetRotationOrderRequest,
    SetRotationOrderResponse, UpdateOccupancyRequest, UpdateOccupancyResponse,
    ValidateBookingResponse, advance_selection, create_family_group, create_reservation,
    extend_selection_window, generate_secondary_periods, get_season_summary, get_selection_state,
    get_time_period_windows, get_usage_info, list_family_groups, organization_today,
    reconcile_usage, record_check_in, record_payment, set_rotation_order, update_occupancy,
    upsert_billing_config, upsert_rotation_config, upsert_season_config, validate_booking,
};
use cabin_rotation_domain::{
    BillingConfig, RotationConfig, RotationScope, SeasonConfig, SeasonSummary,
};
use cabin_rotation_persistence::Persistence;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Date;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::actor::RequestActor;
use crate::notifier::LoggingNotifier;

/// Cabin Rotation Server - HTTP server for the Cabin Rotation system
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

/// Application state shared across handlers.
///
/// The persistence layer is wrapped in a Mutex; every request runs its
/// reads and writes under the lock.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    notifier: LoggingNotifier,
}

/// Query parameters for the windows endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
struct WindowsQuery {
    /// Calendar month, 1-12.
    month: u8,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// Whether the client should reload and retry.
    retryable: bool,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    retryable: bool,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            retryable: self.retryable,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Handler for PUT `/organizations/{org}/rotation-config`.
async fn handle_upsert_rotation_config(
    AxumState(app_state): AxumState<AppState>,
    Path(organization_id): Path<i64>,
    RequestActor(actor): RequestActor,
    Json(config): Json<RotationConfig>,
) -> Result<Json<SaveConfigResponse>, HttpError> {
    info!(organization_id, actor = %actor.id, "Handling upsert_rotation_config request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SaveConfigResponse =
        upsert_rotation_config(&mut persistence, &actor, organization_id, &config)?;
    Ok(Json(response))
}

/// Handler for PUT `/organizations/{org}/billing-config`.
async fn handle_upsert_billing_config(
    AxumState(app_state): AxumState<AppState>,
    Path(organization_id): Path<i64>,
    RequestActor(actor): RequestActor,
    Json(config): Json<BillingConfig>,
) -> Result<Json<SaveConfigResponse>, HttpError> {
    info!(organization_id, actor = %actor.id, "Handling upsert_billing_config request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SaveConfigResponse =
        upsert_billing_config(&mut persistence, &actor, organization_id, &config)?;
    Ok(Json(response))
}

/// Handler for PUT `/organizations/{org}/season-config`.
async fn handle_upsert_season_config(
    AxumState(app_state): AxumState<AppState>,
    Path(organization_id): Path<i64>,
    RequestActor(actor): RequestActor,
    Json(config): Json<SeasonConfig>,
) -> Result<Json<SaveConfigResponse>, HttpError> {
    info!(organization_id, actor = %actor.id, "Handling upsert_season_config request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SaveConfigResponse =
        upsert_season_config(&mut persistence, &actor, organization_id, &config)?;
    Ok(Json(response))
}

// ============================================================================
// Family groups and rotation order
// ============================================================================

/// Handler for POST `/organizations/{org}/family-groups`.
async fn handle_create_family_group(
    AxumState(app_state): AxumState<AppState>,
    Path(organization_id): Path<i64>,
    RequestActor(actor): RequestActor,
    Json(req): Json<CreateFamilyGroupRequest>,
) -> Result<Json<CreateFamilyGroupResponse>, HttpError> {
    info!(
        organization_id,
        actor = %actor.id,
        name = %req.name,
        "Handling create_family_group request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateFamilyGroupResponse =
        create_family_group(&mut persistence, &actor, organization_id, &req)?;
    Ok(Json(response))
}

/// Handler for GET `/organizations/{org}/family-groups`.
async fn handle_list_family_groups(
    AxumState(app_state): AxumState<AppState>,
    Path(organization_id): Path<i64>,
    RequestActor(_actor): RequestActor,
) -> Result<Json<ListFamilyGroupsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListFamilyGroupsResponse = list_family_groups(&mut persistence, organization_id)?;
    Ok(Json(response))
}

/// Handler for PUT `/organizations/{org}/rotation-years/{year}/order`.
async fn handle_set_rotation_order(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<SetRotationOrderRequest>,
) -> Result<Json<SetRotationOrderResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);
    info!(%scope, actor = %actor.id, "Handling set_rotation_order request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SetRotationOrderResponse =
        set_rotation_order(&mut persistence, &actor, scope, &req)?;
    Ok(Json(response))
}

// ============================================================================
// Windows and bookings
// ============================================================================

/// Handler for GET `/organizations/{org}/rotation-years/{year}/windows?month=`.
async fn handle_get_windows(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    Query(query): Query<WindowsQuery>,
    RequestActor(_actor): RequestActor,
) -> Result<Json<GetTimePeriodWindowsResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);

    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let response: GetTimePeriodWindowsResponse =
        get_time_period_windows(&mut persistence, scope, query.month, today)?;
    Ok(Json(response))
}

/// Handler for POST `/organizations/{org}/rotation-years/{year}/bookings/validate`.
async fn handle_validate_booking(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<BookingRequestBody>,
) -> Result<Json<ValidateBookingResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);

    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let response: ValidateBookingResponse =
        validate_booking(&mut persistence, &actor, scope, &req, today)?;
    Ok(Json(response))
}

/// Handler for POST `/organizations/{org}/rotation-years/{year}/reservations`.
///
/// A booking that breaks a rotation rule is answered with 200 and the
/// reasons in `validation.errors`.
async fn handle_create_reservation(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<BookingRequestBody>,
) -> Result<Json<CreateReservationResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);
    info!(
        %scope,
        actor = %actor.id,
        family = %req.family_group,
        admin_override = req.admin_override,
        "Handling create_reservation request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let response: CreateReservationResponse =
        create_reservation(&mut persistence, &actor, scope, &req, today)?;
    if response.reservation_id.is_none() {
        warn!(
            %scope,
            family = %req.family_group,
            errors = ?response.validation.errors,
            "Booking rejected"
        );
    }
    Ok(Json(response))
}

// ============================================================================
// Selection
// ============================================================================

/// Handler for GET `/organizations/{org}/rotation-years/{year}/selection`.
async fn handle_get_selection_state(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(_actor): RequestActor,
) -> Result<Json<SelectionState>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);

    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let state: SelectionState = get_selection_state(&mut persistence, scope, today)?;
    Ok(Json(state))
}

/// Handler for POST `/organizations/{org}/rotation-years/{year}/selection/advance`.
async fn handle_advance_selection(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<AdvanceSelectionRequest>,
) -> Result<Json<AdvanceSelectionResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);
    info!(
        %scope,
        actor = %actor.id,
        completed = req.completed,
        "Handling advance_selection request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let response: AdvanceSelectionResponse = advance_selection(
        &mut persistence,
        &app_state.notifier,
        &actor,
        scope,
        &req,
        today,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/organizations/{org}/rotation-years/{year}/selection/secondary`.
async fn handle_generate_secondary_periods(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(actor): RequestActor,
) -> Result<Json<GenerateSecondaryPeriodsResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);
    info!(%scope, actor = %actor.id, "Handling generate_secondary_periods request");

    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let response: GenerateSecondaryPeriodsResponse =
        generate_secondary_periods(&mut persistence, &app_state.notifier, &actor, scope, today)?;
    Ok(Json(response))
}

/// Handler for PUT `/organizations/{org}/rotation-years/{year}/selection/extensions/{family}`.
async fn handle_extend_selection_window(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year, family_group)): Path<(i64, i32, String)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<ExtendSelectionWindowRequest>,
) -> Result<Json<ExtendSelectionWindowResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);

    let mut persistence = app_state.persistence.lock().await;
    let response: ExtendSelectionWindowResponse =
        extend_selection_window(&mut persistence, &actor, scope, &family_group, &req)?;
    Ok(Json(response))
}

// ============================================================================
// Usage
// ============================================================================

/// Handler for GET `/organizations/{org}/rotation-years/{year}/usage/{family}`.
async fn handle_get_usage_info(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year, family_group)): Path<(i64, i32, String)>,
    RequestActor(_actor): RequestActor,
) -> Result<Json<GetUsageInfoResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);

    let mut persistence = app_state.persistence.lock().await;
    let response: GetUsageInfoResponse = get_usage_info(&mut persistence, scope, &family_group)?;
    Ok(Json(response))
}

/// Handler for POST `/organizations/{org}/rotation-years/{year}/usage/reconcile`.
async fn handle_reconcile_usage(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, rotation_year)): Path<(i64, i32)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<ReconcileUsageRequest>,
) -> Result<Json<ReconcileUsageResponse>, HttpError> {
    let scope: RotationScope = RotationScope::new(organization_id, rotation_year);
    info!(%scope, actor = %actor.id, force = req.force, "Handling reconcile_usage request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ReconcileUsageResponse = reconcile_usage(&mut persistence, &actor, scope, &req)?;
    Ok(Json(response))
}

// ============================================================================
// Season and billing
// ============================================================================

/// Handler for GET `/organizations/{org}/seasons/{year}/families/{family}/summary`.
async fn handle_get_season_summary(
    AxumState(app_state): AxumState<AppState>,
    Path((organization_id, season_year, family_group)): Path<(i64, i32, String)>,
    RequestActor(_actor): RequestActor,
) -> Result<Json<SeasonSummary>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let today: Date = organization_today(&mut persistence, organization_id)?;
    let summary: SeasonSummary = get_season_summary(
        &mut persistence,
        organization_id,
        &family_group,
        season_year,
        today,
    )?;
    Ok(Json(summary))
}

/// Handler for PUT `/organizations/{org}/payments/{id}/occupancy`.
async fn handle_update_occupancy(
    AxumState(app_state): AxumState<AppState>,
    Path((_organization_id, payment_id)): Path<(i64, i64)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<UpdateOccupancyRequest>,
) -> Result<Json<UpdateOccupancyResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: UpdateOccupancyResponse =
        update_occupancy(&mut persistence, &actor, payment_id, &req)?;
    Ok(Json(response))
}

/// Handler for PUT `/organizations/{org}/reservations/{id}/payment`.
async fn handle_record_payment(
    AxumState(app_state): AxumState<AppState>,
    Path((_organization_id, reservation_id)): Path<(i64, i64)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<RecordPaymentRequest>,
) -> Result<Json<RecordPaymentResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordPaymentResponse =
        record_payment(&mut persistence, &actor, reservation_id, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/organizations/{org}/reservations/{id}/check-ins`.
async fn handle_record_check_in(
    AxumState(app_state): AxumState<AppState>,
    Path((_organization_id, reservation_id)): Path<(i64, i64)>,
    RequestActor(actor): RequestActor,
    Json(req): Json<RecordCheckInRequest>,
) -> Result<Json<RecordCheckInResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordCheckInResponse =
        record_check_in(&mut persistence, &actor, reservation_id, &req)?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    let rotation_year: Router<AppState> = Router::new()
        .route("/order", put(handle_set_rotation_order))
        .route("/windows", get(handle_get_windows))
        .route("/bookings/validate", post(handle_validate_booking))
        .route("/reservations", post(handle_create_reservation))
        .route("/selection", get(handle_get_selection_state))
        .route("/selection/advance", post(handle_advance_selection))
        .route("/selection/secondary", post(handle_generate_secondary_periods))
        .route(
            "/selection/extensions/{family}",
            put(handle_extend_selection_window),
        )
        .route("/usage/reconcile", post(handle_reconcile_usage))
        .route("/usage/{family}", get(handle_get_usage_info));

    let organization: Router<AppState> = Router::new()
        .route("/rotation-config", put(handle_upsert_rotation_config))
        .route("/billing-config", put(handle_upsert_billing_config))
        .route("/season-config", put(handle_upsert_season_config))
        .route(
            "/family-groups",
            post(handle_create_family_group).get(handle_list_family_groups),
        )
        .nest("/rotation-years/{year}", rotation_year)
        .route(
            "/seasons/{year}/families/{family}/summary",
            get(handle_get_season_summary),
        )
        .route("/payments/{id}/occupancy", put(handle_update_occupancy))
        .route("/reservations/{id}/payment", put(handle_record_payment))
        .route("/reservations/{id}/check-ins", post(handle_record_check_in));

    Router::new()
        .nest("/organizations/{org}", organization)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Cabin Rotation Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {db_path}");
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        notifier: LoggingNotifier,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {addr}");

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
