// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use crate::actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use cabin_rotation_api::CreateFamilyGroupRequest;
use cabin_rotation_domain::{Contact, HostMember, TimePeriodWindow};
use serde_json::Value;
use tower::ServiceExt;

const ORG: i64 = 3;

/// Helper to create a router over a fresh in-memory database.
fn create_test_app() -> Router {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    build_router(AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        notifier: LoggingNotifier,
    })
}

/// Next calendar year, so windows always lie in the future.
fn rotation_year() -> i32 {
    time::OffsetDateTime::now_utc().year() + 1
}

/// Sends a request and returns the status with the JSON body (`Null` if
/// the body is not JSON).
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    role: Option<&str>,
    body: Option<Value>,
) -> (HttpStatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder
            .header(ACTOR_ID_HEADER, format!("{role}-1"))
            .header(ACTOR_ROLE_HEADER, role);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn family_request(name: &str) -> Value {
    serde_json::to_value(CreateFamilyGroupRequest {
        name: name.to_string(),
        lead: None,
        host_members: vec![HostMember {
            contact: Contact {
                name: format!("{name} Host"),
                email: Some(format!("{}@example.com", name.to_lowercase())),
                phone: None,
            },
            can_host: true,
        }],
        color: None,
    })
    .unwrap()
}

/// Configures the organization and sets Adams, Baker, Clark as the order.
async fn setup_rotation(app: &Router) {
    let config = RotationConfig {
        max_time_slots: 1,
        min_nights_per_booking: 2,
        enable_secondary_selection: true,
        ..RotationConfig::default()
    };
    let (status, _) = send(
        app,
        "PUT",
        &format!("/organizations/{ORG}/rotation-config"),
        Some("admin"),
        Some(serde_json::to_value(&config).unwrap()),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);

    for name in ["Adams", "Baker", "Clark"] {
        let (status, body) = send(
            app,
            "POST",
            &format!("/organizations/{ORG}/family-groups"),
            Some("admin"),
            Some(family_request(name)),
        )
        .await;
        assert_eq!(status, HttpStatusCode::OK, "{body}");
    }

    let (status, body) = send(
        app,
        "PUT",
        &format!("/organizations/{ORG}/rotation-years/{}/order", rotation_year()),
        Some("admin"),
        Some(serde_json::json!({ "family_order": ["Adams", "Baker", "Clark"] })),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
    assert_eq!(body["current_primary_turn_family"], "Adams");
}

/// The first July window and a three-night booking inside it.
async fn first_july_booking(app: &Router, family_group: &str) -> Value {
    let (status, body) = send(
        app,
        "GET",
        &format!(
            "/organizations/{ORG}/rotation-years/{}/windows?month=7",
            rotation_year()
        ),
        Some("member"),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");

    let windows: Vec<TimePeriodWindow> =
        serde_json::from_value(body["windows"].clone()).unwrap();
    let first: &TimePeriodWindow = windows.first().unwrap();
    assert_eq!(first.family_group, "Adams");

    serde_json::to_value(BookingRequestBody {
        family_group: family_group.to_string(),
        start: first.start,
        end: first.start + time::Duration::days(3),
        guest_count: 2,
        admin_override: false,
    })
    .unwrap()
}

#[tokio::test]
async fn test_missing_actor_headers_is_unauthorized() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/organizations/{ORG}/rotation-config"),
        None,
        Some(serde_json::to_value(RotationConfig::default()).unwrap()),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "GET",
        &format!("/organizations/{ORG}/family-groups"),
        Some("superuser"),
        None,
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_cannot_configure() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/organizations/{ORG}/rotation-config"),
        Some("member"),
        Some(serde_json::to_value(RotationConfig::default()).unwrap()),
    )
    .await;

    assert_eq!(status, HttpStatusCode::FORBIDDEN);
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_selection_without_configuration_is_not_found() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "GET",
        &format!(
            "/organizations/{ORG}/rotation-years/{}/selection",
            rotation_year()
        ),
        Some("member"),
        None,
    )
    .await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_month_is_bad_request() {
    let app = create_test_app();
    setup_rotation(&app).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!(
            "/organizations/{ORG}/rotation-years/{}/windows?month=13",
            rotation_year()
        ),
        Some("member"),
        None,
    )
    .await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_and_turn_advance() {
    let app = create_test_app();
    setup_rotation(&app).await;
    let year = rotation_year();

    let booking = first_july_booking(&app, "Adams").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/organizations/{ORG}/rotation-years/{year}/reservations"),
        Some("member"),
        Some(booking),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
    assert!(body["reservation_id"].is_i64(), "{body}");
    assert_eq!(body["validation"]["nights"], 3);

    let (_, usage) = send(
        &app,
        "GET",
        &format!("/organizations/{ORG}/rotation-years/{year}/usage/Adams"),
        Some("member"),
        None,
    )
    .await;
    assert_eq!(usage["usage"]["used"], 1);
    assert_eq!(usage["usage"]["remaining"], 0);

    let (status, state) = send(
        &app,
        "GET",
        &format!("/organizations/{ORG}/rotation-years/{year}/selection"),
        Some("member"),
        None,
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(state["current_primary_turn_family"], "Adams");
    let version = state["version"].clone();

    let advance = serde_json::json!({ "completed": true, "expected_version": version });
    let (status, body) = send(
        &app,
        "POST",
        &format!("/organizations/{ORG}/rotation-years/{year}/selection/advance"),
        Some("member"),
        Some(advance.clone()),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{body}");
    assert_eq!(body["outcome"]["next_family"], "Baker");
    assert_eq!(body["outcome"]["notified"], true);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/organizations/{ORG}/rotation-years/{year}/selection/advance"),
        Some("member"),
        Some(advance),
    )
    .await;
    assert_eq!(status, HttpStatusCode::CONFLICT);
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_rejected_booking_is_ok_with_errors() {
    let app = create_test_app();
    setup_rotation(&app).await;

    let booking = first_july_booking(&app, "Baker").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!(
            "/organizations/{ORG}/rotation-years/{}/reservations",
            rotation_year()
        ),
        Some("member"),
        Some(booking),
    )
    .await;

    assert_eq!(status, HttpStatusCode::OK);
    assert!(body["reservation_id"].is_null());
    assert_eq!(body["validation"]["is_valid"], false);
    assert!(!body["validation"]["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_payment_is_not_found() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/organizations/{ORG}/payments/77/occupancy"),
        Some("member"),
        Some(serde_json::json!({ "daily_occupancy": [] })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::NOT_FOUND);
}
