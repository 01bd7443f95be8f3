// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment, check-in, occupancy and season summary handlers.

use cabin_rotation_domain::{
    BillingConfig, BillingMethod, BillingSource, OccupancyEntry, SeasonConfig,
};
use cabin_rotation_persistence::Persistence;
use time::macros::{date, datetime};

use crate::{
    ApiError, RecordCheckInRequest, RecordPaymentRequest, UpdateOccupancyRequest,
    create_reservation, get_season_summary, record_check_in, record_payment, update_occupancy,
    upsert_billing_config, upsert_season_config,
};

use super::helpers::{
    ORG, TODAY, booking, create_test_admin, create_test_member, setup_test_persistence,
    test_scope,
};

/// A configured season with one Adams stay, July 4 to 8.
fn setup_with_stay() -> (Persistence, i64) {
    let mut persistence = setup_test_persistence();
    let admin = create_test_admin();
    upsert_billing_config(
        &mut persistence,
        &admin,
        ORG,
        &BillingConfig {
            method: BillingMethod::PerPersonPerNight,
            rate_cents: 2_000,
            cleaning_fee_cents: 0,
            tax_rate_basis_points: 0,
        },
    )
    .unwrap();
    upsert_season_config(&mut persistence, &admin, ORG, &SeasonConfig::default()).unwrap();

    let response = create_reservation(
        &mut persistence,
        &create_test_member(),
        test_scope(),
        &booking(
            "Adams",
            datetime!(2026-07-04 15:00),
            datetime!(2026-07-08 10:00),
        ),
        TODAY,
    )
    .unwrap();
    let reservation_id = response.reservation_id.unwrap();
    (persistence, reservation_id)
}

fn payment(amount_paid_cents: i64) -> RecordPaymentRequest {
    RecordPaymentRequest {
        amount_paid_cents,
        billing_locked: false,
        manual_adjustment_cents: 0,
    }
}

#[test]
fn test_record_payment_updates_in_place() {
    let (mut persistence, reservation_id) = setup_with_stay();
    let admin = create_test_admin();

    let first = record_payment(&mut persistence, &admin, reservation_id, &payment(1_000)).unwrap();
    let second = record_payment(&mut persistence, &admin, reservation_id, &payment(2_500)).unwrap();

    assert_eq!(first.payment_id, second.payment_id);
    let stored = persistence
        .get_payment_for_reservation(reservation_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.amount_paid_cents, 2_500);
}

#[test]
fn test_record_payment_validates_input() {
    let (mut persistence, reservation_id) = setup_with_stay();
    let admin = create_test_admin();

    let negative = record_payment(&mut persistence, &admin, reservation_id, &payment(-1));
    assert!(matches!(
        negative,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "amount_paid_cents"
    ));

    let missing = record_payment(&mut persistence, &admin, 9_999, &payment(100));
    assert!(matches!(
        missing,
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Reservation"
    ));
}

#[test]
fn test_check_in_must_fall_on_a_night_of_the_stay() {
    let (mut persistence, reservation_id) = setup_with_stay();
    let member = create_test_member();

    let recorded = record_check_in(
        &mut persistence,
        &member,
        reservation_id,
        &RecordCheckInRequest {
            check_date: date!(2026 - 07 - 05),
            guest_count: 3,
        },
    )
    .unwrap();
    assert_eq!(recorded.reservation_id, reservation_id);

    let checkout_day = record_check_in(
        &mut persistence,
        &member,
        reservation_id,
        &RecordCheckInRequest {
            check_date: date!(2026 - 07 - 08),
            guest_count: 3,
        },
    );
    assert!(matches!(
        checkout_day,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "check_date"
    ));

    let nobody = record_check_in(
        &mut persistence,
        &member,
        reservation_id,
        &RecordCheckInRequest {
            check_date: date!(2026 - 07 - 06),
            guest_count: 0,
        },
    );
    assert!(matches!(
        nobody,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "guest_count"
    ));

    let sessions = persistence.list_check_in_sessions(&[reservation_id]).unwrap();
    assert_eq!(sessions.len(), 1);
}

#[test]
fn test_occupancy_edit_drives_season_summary() {
    let (mut persistence, reservation_id) = setup_with_stay();
    let admin = create_test_admin();
    let payment_id = record_payment(&mut persistence, &admin, reservation_id, &payment(1_000))
        .unwrap()
        .payment_id;

    let update = update_occupancy(
        &mut persistence,
        &create_test_member(),
        payment_id,
        &UpdateOccupancyRequest {
            daily_occupancy: vec![
                OccupancyEntry {
                    date: date!(2026 - 07 - 04),
                    guests: 3,
                },
                OccupancyEntry {
                    date: date!(2026 - 07 - 05),
                    guests: 2,
                },
            ],
        },
    )
    .unwrap();
    assert_eq!(update.amount_cents, 10_000);

    let summary =
        get_season_summary(&mut persistence, ORG, "Adams", 2026, date!(2026 - 08 - 15)).unwrap();
    assert_eq!(summary.stays.len(), 1);
    assert_eq!(summary.stays[0].billing_source, BillingSource::DailyOccupancy);
    assert_eq!(summary.totals.total_charged_cents, 10_000);
    assert_eq!(summary.totals.total_paid_cents, 1_000);
    assert_eq!(summary.totals.total_outstanding_cents, 9_000);
}

#[test]
fn test_occupancy_outside_stay_is_rejected() {
    let (mut persistence, reservation_id) = setup_with_stay();
    let payment_id = record_payment(
        &mut persistence,
        &create_test_admin(),
        reservation_id,
        &payment(0),
    )
    .unwrap()
    .payment_id;

    let result = update_occupancy(
        &mut persistence,
        &create_test_member(),
        payment_id,
        &UpdateOccupancyRequest {
            daily_occupancy: vec![OccupancyEntry {
                date: date!(2026 - 07 - 08),
                guests: 2,
            }],
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "daily_occupancy"
    ));
}

#[test]
fn test_occupancy_guest_count_is_capped() {
    let (mut persistence, reservation_id) = setup_with_stay();
    let payment_id = record_payment(
        &mut persistence,
        &create_test_admin(),
        reservation_id,
        &payment(0),
    )
    .unwrap()
    .payment_id;

    let result = update_occupancy(
        &mut persistence,
        &create_test_member(),
        payment_id,
        &UpdateOccupancyRequest {
            daily_occupancy: vec![
                OccupancyEntry {
                    date: date!(2026 - 07 - 04),
                    guests: u32::MAX,
                },
                OccupancyEntry {
                    date: date!(2026 - 07 - 05),
                    guests: u32::MAX,
                },
            ],
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "daily_occupancy"
    ));
    let stored = persistence.get_payment(payment_id).unwrap().unwrap();
    assert!(stored.daily_occupancy.is_empty());
}

#[test]
fn test_occupancy_for_unknown_payment_is_not_found() {
    let (mut persistence, _) = setup_with_stay();

    let result = update_occupancy(
        &mut persistence,
        &create_test_member(),
        404,
        &UpdateOccupancyRequest {
            daily_occupancy: Vec::new(),
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Payment"
    ));
}

#[test]
fn test_season_summary_requires_billing_config() {
    let mut persistence = setup_test_persistence();

    let result = get_season_summary(&mut persistence, ORG, "Adams", 2026, TODAY);

    assert!(matches!(
        result,
        Err(ApiError::ResourceNotFound { ref resource_type, .. })
            if resource_type == "Billing configuration"
    ));
}
