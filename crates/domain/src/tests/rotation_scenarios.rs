// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end rotation walks over the pure rules.

use crate::{
    BookingContext, BookingRequest, FamilyStatus, RotationConfig, RotationProgress,
    RotationScope, SecondaryTurnState, SelectionPhase, StatusInputs, TimePeriodUsage,
    calculate_time_period_windows, generate_family_statuses, next_incomplete_family,
    next_secondary_family, validate_booking,
};
use std::collections::HashSet;
use time::Month;

fn abc() -> Vec<String> {
    vec![String::from("A"), String::from("B"), String::from("C")]
}

#[test]
fn test_primary_pointer_walks_a_b_c_then_clears() {
    let order: Vec<String> = abc();
    let mut completed: HashSet<String> = HashSet::new();
    let mut pointer: Option<String> = Some(String::from("A"));
    let mut observed: Vec<Option<String>> = Vec::new();

    while let Some(current) = pointer.clone() {
        completed.insert(current.clone());
        pointer = next_incomplete_family(&order, Some(current.as_str()), &completed);
        observed.push(pointer.clone());
    }

    assert_eq!(
        observed,
        vec![Some(String::from("B")), Some(String::from("C")), None]
    );
}

#[test]
fn test_phase_moves_to_secondary_after_generation() {
    let config: RotationConfig = RotationConfig {
        enable_secondary_selection: true,
        ..RotationConfig::default()
    };
    let mut progress: RotationProgress = RotationProgress {
        all_primary_complete: true,
        ..RotationProgress::default()
    };
    assert_eq!(
        SelectionPhase::determine(&config, &progress),
        SelectionPhase::Primary
    );

    progress.secondary_periods_generated = true;
    progress.secondary_round_active = true;
    assert_eq!(
        SelectionPhase::determine(&config, &progress),
        SelectionPhase::Secondary
    );
}

#[test]
fn test_secondary_round_walks_reversed_order() {
    let order: Vec<String> = abc();
    let scope: RotationScope = RotationScope::new(1, 2026);
    let mut usage: Vec<TimePeriodUsage> = order
        .iter()
        .map(|family| {
            let mut row = TimePeriodUsage::new(scope, family, 1);
            row.time_periods_used = 1;
            row.turn_completed = true;
            row.secondary_periods_allowed = 1;
            row
        })
        .collect();

    let first: Option<String> = next_secondary_family(&order, None, &usage);
    assert_eq!(first.as_deref(), Some("C"));

    // C books its secondary period.
    usage[2].secondary_periods_used = 1;
    let secondary: SecondaryTurnState = SecondaryTurnState {
        current_family: Some(String::from("B")),
        round_active: true,
    };
    let extended: HashSet<String> = HashSet::new();
    let statuses = generate_family_statuses(
        SelectionPhase::Secondary,
        &StatusInputs {
            rotation_order: &order,
            usage: &usage,
            current_primary_turn_family: None,
            secondary: &secondary,
            extended_families: &extended,
        },
    );
    let derived: Vec<FamilyStatus> = statuses.iter().map(|s| s.status).collect();
    assert_eq!(
        derived,
        vec![
            FamilyStatus::Completed,
            FamilyStatus::Active,
            FamilyStatus::Waiting
        ]
    );

    assert_eq!(
        next_secondary_family(&order, Some("B"), &usage).as_deref(),
        Some("A")
    );
}

#[test]
fn test_windows_feed_validation() {
    let config: RotationConfig = RotationConfig {
        max_nights: 7,
        min_nights_per_booking: 2,
        ..RotationConfig::default()
    };
    let windows =
        calculate_time_period_windows(&config, &abc(), 2026, 2026, Month::July).unwrap();
    let second = &windows[1];
    assert_eq!(second.family_group, "B");

    let request: BookingRequest = BookingRequest {
        start: second.start,
        end: second.end,
        family_group: String::from("B"),
    };
    let context: BookingContext<'_> = BookingContext {
        config: &config,
        phase: SelectionPhase::Primary,
        usage: None,
        nights_already_booked: 0,
        admin_override: false,
    };
    let result = validate_booking(&request, &windows, &context);
    assert!(result.is_valid, "{:?}", result.errors);
    assert_eq!(result.matched_period, Some(2));
}
