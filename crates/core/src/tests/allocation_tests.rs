// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{FakeStore, TODAY, reservation, scope, seeded_store};
use crate::{
    BookingOutcome, book_reservation, time_period_windows, user_usage_info,
    validate_booking_request,
};
use cabin_rotation_domain::{BookingRequest, RotationConfig, SelectionRound, UsageInfo};
use time::Month;
use time::PrimitiveDateTime;
use time::macros::{date, datetime};

fn config() -> RotationConfig {
    RotationConfig {
        max_time_slots: 2,
        max_nights: 7,
        min_nights_per_booking: 2,
        max_consecutive_nights_primary: 7,
        ..RotationConfig::default()
    }
}

fn request(family: &str, start: PrimitiveDateTime, end: PrimitiveDateTime) -> BookingRequest {
    BookingRequest {
        start,
        end,
        family_group: family.to_string(),
    }
}

#[test]
fn test_july_windows_rotate_through_families() {
    let mut store: FakeStore = seeded_store(config());
    let windows = time_period_windows(&mut store, scope(), Month::July, TODAY).unwrap();

    let owners: Vec<&str> = windows.iter().map(|w| w.family_group.as_str()).collect();
    assert_eq!(owners, vec!["A", "B", "C", "A", "B"]);
    assert_eq!(windows[0].start, datetime!(2026-07-03 12:00));
    assert_eq!(windows[0].end, datetime!(2026-07-10 12:00));
}

#[test]
fn test_booking_in_own_window_is_recorded() {
    let mut store: FakeStore = seeded_store(config());
    let outcome = book_reservation(
        &mut store,
        scope(),
        &request("A", datetime!(2026-07-04 15:00), datetime!(2026-07-08 10:00)),
        4,
        false,
        TODAY,
    )
    .unwrap();

    let BookingOutcome::Booked {
        reservation_id,
        round,
        validation,
    } = outcome
    else {
        panic!("expected a booking, got {outcome:?}");
    };
    assert_eq!(round, SelectionRound::Primary);
    assert_eq!(validation.nights, 4);
    assert_eq!(validation.matched_period, Some(1));

    let stored = store
        .reservations
        .iter()
        .find(|r| r.reservation_id == Some(reservation_id))
        .unwrap();
    assert_eq!(stored.start_date, date!(2026 - 07 - 04));
    assert_eq!(stored.end_date, date!(2026 - 07 - 08));
    assert_eq!(stored.guest_count, 4);
    assert_eq!(store.usage_for("A").unwrap().time_periods_used, 1);
}

#[test]
fn test_booking_in_another_familys_window_is_rejected() {
    let mut store: FakeStore = seeded_store(config());
    let outcome = book_reservation(
        &mut store,
        scope(),
        &request("A", datetime!(2026-07-11 12:00), datetime!(2026-07-14 12:00)),
        2,
        false,
        TODAY,
    )
    .unwrap();

    let BookingOutcome::Rejected { validation } = outcome else {
        panic!("expected a rejection");
    };
    assert_eq!(
        validation.errors,
        vec![String::from(
            "Selected dates do not fall within a time period assigned to A"
        )]
    );
    assert!(store.reservations.is_empty());
    assert!(store.usage.is_empty());
}

#[test]
fn test_window_from_previous_month_is_considered() {
    let mut store: FakeStore = seeded_store(config());
    // June's fourth window (A) runs from June 26 to July 3.
    let validation = validate_booking_request(
        &mut store,
        scope(),
        &request("A", datetime!(2026-07-01 12:00), datetime!(2026-07-03 12:00)),
        false,
        TODAY,
    )
    .unwrap();

    assert!(validation.is_valid, "{:?}", validation.errors);
    assert_eq!(validation.matched_period, Some(4));
}

#[test]
fn test_exhausted_allowance_is_rejected() {
    let mut store: FakeStore = seeded_store(RotationConfig {
        max_time_slots: 1,
        ..config()
    });
    let first = book_reservation(
        &mut store,
        scope(),
        &request("A", datetime!(2026-07-03 12:00), datetime!(2026-07-06 12:00)),
        2,
        false,
        TODAY,
    )
    .unwrap();
    assert!(matches!(first, BookingOutcome::Booked { .. }));

    let validation = validate_booking_request(
        &mut store,
        scope(),
        &request("A", datetime!(2026-07-24 12:00), datetime!(2026-07-27 12:00)),
        false,
        TODAY,
    )
    .unwrap();
    assert!(!validation.is_valid);
    assert_eq!(
        validation.errors,
        vec![String::from(
            "You have already used all allocated time periods (1/1)"
        )]
    );
}

#[test]
fn test_primary_nights_budget_is_cumulative() {
    let mut store: FakeStore = seeded_store(RotationConfig {
        total_nights_allowed_primary: Some(5),
        ..config()
    });
    store.add_reservation(reservation(
        "A",
        date!(2026 - 07 - 03),
        date!(2026 - 07 - 07),
        2,
    ));

    let validation = validate_booking_request(
        &mut store,
        scope(),
        &request("A", datetime!(2026-07-24 12:00), datetime!(2026-07-26 12:00)),
        false,
        TODAY,
    )
    .unwrap();

    assert!(!validation.is_valid);
    assert!(validation.errors[0].contains("total primary nights to 6"));
}

#[test]
fn test_admin_override_allows_any_window() {
    let mut store: FakeStore = seeded_store(config());
    let outcome = book_reservation(
        &mut store,
        scope(),
        &request("B", datetime!(2026-07-03 12:00), datetime!(2026-07-04 12:00)),
        2,
        true,
        TODAY,
    )
    .unwrap();

    assert!(matches!(outcome, BookingOutcome::Booked { .. }));
    assert_eq!(store.usage_for("B").unwrap().time_periods_used, 1);
}

#[test]
fn test_inverted_stay_is_rejected_with_and_without_override() {
    for admin_override in [false, true] {
        let mut store: FakeStore = seeded_store(config());
        let outcome = book_reservation(
            &mut store,
            scope(),
            &request("A", datetime!(2026-07-08 12:00), datetime!(2026-07-05 12:00)),
            2,
            admin_override,
            TODAY,
        )
        .unwrap();

        let BookingOutcome::Rejected { validation } = outcome else {
            panic!("expected a rejection with admin_override = {admin_override}");
        };
        assert_eq!(validation.nights, 0);
        assert!(store.reservations.is_empty());
        assert!(store.usage_for("A").is_none());
    }
}

#[test]
fn test_usage_info() {
    let mut store: FakeStore = seeded_store(config());
    assert_eq!(
        user_usage_info(&mut store, scope(), "C").unwrap(),
        Some(UsageInfo {
            used: 0,
            allowed: 2,
            remaining: 2,
        })
    );

    store.rotation_configs.clear();
    assert_eq!(user_usage_info(&mut store, scope(), "C").unwrap(), None);
}
