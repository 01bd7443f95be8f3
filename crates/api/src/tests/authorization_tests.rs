// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin-only handlers reject members.

use cabin_rotation_domain::{BillingConfig, RotationConfig, SeasonConfig};
use time::macros::{date, datetime};

use crate::{
    ApiError, ExtendSelectionWindowRequest, ReconcileUsageRequest, RecordPaymentRequest,
    SetRotationOrderRequest, create_family_group, create_reservation, extend_selection_window,
    generate_secondary_periods, list_family_groups, reconcile_usage, record_payment,
    set_rotation_order, upsert_billing_config, upsert_rotation_config, upsert_season_config,
    validate_booking,
};

use super::helpers::{
    ORG, RecordingNotifier, TODAY, booking, create_family_request, create_test_member,
    setup_test_persistence, test_scope,
};

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>, expected_action: &str) {
    match result {
        Err(ApiError::Unauthorized {
            action,
            required_role,
        }) => {
            assert_eq!(action, expected_action);
            assert_eq!(required_role, "Admin");
        }
        other => panic!("expected Unauthorized for {expected_action}, got {other:?}"),
    }
}

#[test]
fn test_config_upserts_reject_member() {
    let mut persistence = setup_test_persistence();
    let member = create_test_member();

    assert_unauthorized(
        upsert_rotation_config(&mut persistence, &member, ORG, &RotationConfig::default()),
        "upsert_rotation_config",
    );
    assert_unauthorized(
        upsert_billing_config(&mut persistence, &member, ORG, &BillingConfig::default()),
        "upsert_billing_config",
    );
    assert_unauthorized(
        upsert_season_config(&mut persistence, &member, ORG, &SeasonConfig::default()),
        "upsert_season_config",
    );
}

#[test]
fn test_create_family_group_rejects_member() {
    let mut persistence = setup_test_persistence();

    assert_unauthorized(
        create_family_group(
            &mut persistence,
            &create_test_member(),
            ORG,
            &create_family_request("Davis"),
        ),
        "create_family_group",
    );

    let listed = list_family_groups(&mut persistence, ORG).unwrap();
    assert_eq!(listed.family_groups.len(), 3);
}

#[test]
fn test_set_rotation_order_rejects_member() {
    let mut persistence = setup_test_persistence();

    assert_unauthorized(
        set_rotation_order(
            &mut persistence,
            &create_test_member(),
            test_scope(),
            &SetRotationOrderRequest {
                family_order: vec![String::from("Clark")],
            },
        ),
        "set_rotation_order",
    );
}

#[test]
fn test_selection_admin_calls_reject_member() {
    let mut persistence = setup_test_persistence();
    let member = create_test_member();
    let notifier = RecordingNotifier::default();

    assert_unauthorized(
        generate_secondary_periods(&mut persistence, &notifier, &member, test_scope(), TODAY),
        "generate_secondary_periods",
    );
    assert_unauthorized(
        extend_selection_window(
            &mut persistence,
            &member,
            test_scope(),
            "Adams",
            &ExtendSelectionWindowRequest {
                until: date!(2026 - 06 - 30),
            },
        ),
        "extend_selection_window",
    );
    assert_unauthorized(
        reconcile_usage(
            &mut persistence,
            &member,
            test_scope(),
            &ReconcileUsageRequest::default(),
        ),
        "reconcile_usage",
    );
    assert!(notifier.sent.borrow().is_empty());
}

#[test]
fn test_record_payment_rejects_member() {
    let mut persistence = setup_test_persistence();

    assert_unauthorized(
        record_payment(
            &mut persistence,
            &create_test_member(),
            1,
            &RecordPaymentRequest {
                amount_paid_cents: 500,
                billing_locked: false,
                manual_adjustment_cents: 0,
            },
        ),
        "record_payment",
    );
}

#[test]
fn test_member_cannot_request_admin_override() {
    let mut persistence = setup_test_persistence();
    let member = create_test_member();
    let mut request = booking(
        "Baker",
        datetime!(2026-07-04 15:00),
        datetime!(2026-07-08 10:00),
    );
    request.admin_override = true;

    assert_unauthorized(
        validate_booking(&mut persistence, &member, test_scope(), &request, TODAY),
        "admin_override",
    );
    assert_unauthorized(
        create_reservation(&mut persistence, &member, test_scope(), &request, TODAY),
        "admin_override",
    );
}

#[test]
fn test_member_may_book_own_window() {
    let mut persistence = setup_test_persistence();
    let request = booking(
        "Adams",
        datetime!(2026-07-04 15:00),
        datetime!(2026-07-08 10:00),
    );

    let response = create_reservation(
        &mut persistence,
        &create_test_member(),
        test_scope(),
        &request,
        TODAY,
    )
    .unwrap();

    assert!(response.validation.is_valid);
    assert!(response.reservation_id.is_some());
}
