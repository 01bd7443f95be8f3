// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sequential selection coordination.
//!
//! Exactly one family holds the primary turn at a time. Advancing the turn
//! is a single conditional store write keyed by the order state's version,
//! so two callers that read the same turn cannot both advance it: the
//! second one gets `CoreError::TurnConflict` and must reload.
//!
//! Everything that follows the pointer move (cleanup of reminders, opening
//! the next family's selection window, notification) is best effort and
//! logged on failure.

use crate::error::CoreError;
use crate::notification::{TurnNotifier, notify_turn_ready};
use crate::secondary::{
    SecondaryGeneration, advance_secondary_selection, generate_secondary_periods,
};
use crate::state::RotationOrderState;
use crate::store::{RotationStore, SELECTION_ENDING_TOMORROW};
use crate::{require_rotation_config, require_rotation_order};
use cabin_rotation_domain::{
    FamilySelectionStatus, RotationConfig, RotationScope, SelectionPhase, StatusInputs,
    TimePeriodUsage, add_days, generate_family_statuses, next_incomplete_family,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::Date;
use tracing::{debug, error, info, warn};

/// Phase, pointers and per-family statuses for a rotation year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub scope: RotationScope,
    pub phase: SelectionPhase,
    pub current_primary_turn_family: Option<String>,
    pub current_secondary_turn_family: Option<String>,
    pub secondary_round_active: bool,
    /// Pass back to detect concurrent changes.
    pub version: i64,
    pub families: Vec<FamilySelectionStatus>,
}

/// A family's selection window as opened by a turn change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionWindow {
    pub start: Date,
    pub end: Date,
}

/// What an advance did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceOutcome {
    /// The phase the advance ran in.
    pub phase: SelectionPhase,
    /// The family whose turn ended.
    pub completed_family: String,
    /// The family whose turn opened, if any.
    pub next_family: Option<String>,
    /// The next family's selection window, if it could be opened.
    pub selection_window: Option<SelectionWindow>,
    /// Whether the next family was notified.
    pub notified: bool,
    /// Set when the advance exhausted the primary round and secondary
    /// generation was attempted.
    pub secondary_generation: Option<SecondaryGeneration>,
}

/// Loads the current selection phase.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, or the store fails.
pub fn selection_phase<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
) -> Result<SelectionPhase, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    let usage: Vec<TimePeriodUsage> = store.list_usage(scope)?;
    Ok(order.phase(&config, &usage))
}

/// Loads the phase and every family's status.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, or the store fails.
pub fn selection_state<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    today: Date,
) -> Result<SelectionState, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    let usage: Vec<TimePeriodUsage> = store.list_usage(scope)?;
    let extended: HashSet<String> = store.active_extensions(scope, today)?;
    let phase: SelectionPhase = order.phase(&config, &usage);

    let secondary = order.secondary_turn();
    let families: Vec<FamilySelectionStatus> = generate_family_statuses(
        phase,
        &StatusInputs {
            rotation_order: &order.family_order,
            usage: &usage,
            current_primary_turn_family: order.current_primary_turn_family.as_deref(),
            secondary: &secondary,
            extended_families: &extended,
        },
    );

    Ok(SelectionState {
        scope,
        phase,
        current_primary_turn_family: order.current_primary_turn_family,
        current_secondary_turn_family: order.current_secondary_turn_family,
        secondary_round_active: order.secondary_round_active,
        version: order.version,
        families,
    })
}

/// Ends the current turn and opens the next one.
///
/// In the secondary phase `completed` selects between moving to the next
/// family (`true`) and ending the round (`false`). In the primary phase the
/// current family's turn is always marked complete.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration or order is missing
/// - No family holds a turn
/// - The rotation is in the post-rotation phase
/// - Another caller advanced the turn first (`CoreError::TurnConflict`)
/// - The store fails
pub fn advance_selection<S: RotationStore, N: TurnNotifier + ?Sized>(
    store: &mut S,
    notifier: &N,
    scope: RotationScope,
    completed: bool,
    today: Date,
) -> Result<AdvanceOutcome, CoreError> {
    let phase: SelectionPhase = selection_phase(store, scope)?;
    debug!(%scope, %phase, completed, "Advancing selection");

    match phase {
        SelectionPhase::Primary => advance_primary_selection(store, notifier, scope, today),
        SelectionPhase::Secondary => {
            advance_secondary_selection(store, notifier, scope, completed, today)
        }
        SelectionPhase::PostRotation => Err(CoreError::InvalidPhaseForAdvance(phase)),
    }
}

/// Completes the current primary turn and hands it to the next family.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, no family
/// holds the turn, the turn changed concurrently, or the store fails.
pub fn advance_primary_selection<S: RotationStore, N: TurnNotifier + ?Sized>(
    store: &mut S,
    notifier: &N,
    scope: RotationScope,
    today: Date,
) -> Result<AdvanceOutcome, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    let current: String = order
        .current_primary_turn_family
        .clone()
        .ok_or(CoreError::NoActiveTurn(scope))?;
    let usage: Vec<TimePeriodUsage> = store.list_usage(scope)?;

    let mut completed: HashSet<String> = usage
        .iter()
        .filter(|row| row.turn_completed)
        .map(|row| row.family_group.clone())
        .collect();
    completed.insert(current.clone());

    let next: Option<String> =
        next_incomplete_family(&order.family_order, Some(current.as_str()), &completed);

    if !store.advance_primary_turn(scope, order.version, &current, next.as_deref())? {
        warn!(%scope, family = %current, "Primary turn changed concurrently");
        return Err(CoreError::TurnConflict(scope));
    }

    info!(
        %scope,
        completed_family = %current,
        next_family = next.as_deref().unwrap_or("<none>"),
        "Advanced primary selection"
    );

    clear_ending_reminders(store, scope, &current);

    let mut outcome: AdvanceOutcome = AdvanceOutcome {
        phase: SelectionPhase::Primary,
        completed_family: current,
        next_family: next.clone(),
        selection_window: None,
        notified: false,
        secondary_generation: None,
    };

    match next {
        Some(next_family) => {
            outcome.selection_window = open_turn_window(
                store,
                scope,
                &next_family,
                today,
                config.primary_selection_days,
            );
            let available: u32 = usage
                .iter()
                .find(|row| row.family_group == next_family)
                .map_or(config.max_time_slots, |row| {
                    row.time_periods_allowed.saturating_sub(row.time_periods_used)
                });
            outcome.notified = notify_turn_ready(store, notifier, scope, &next_family, available);
        }
        None if config.enable_secondary_selection => {
            info!(%scope, "Primary rotation exhausted; generating secondary periods");
            match generate_secondary_periods(store, notifier, scope, today) {
                Ok(generation) => outcome.secondary_generation = Some(generation),
                Err(err) => {
                    error!(%scope, error = %err, "Secondary period generation failed");
                }
            }
        }
        None => {
            info!(%scope, "Primary rotation complete");
        }
    }

    Ok(outcome)
}

/// Deletes pending "ending tomorrow" reminders for a family whose turn ended.
pub(crate) fn clear_ending_reminders<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    family_group: &str,
) {
    match store.delete_pending_notifications(scope, family_group, SELECTION_ENDING_TOMORROW) {
        Ok(0) => {}
        Ok(deleted) => debug!(%scope, family = %family_group, deleted, "Cleared pending reminders"),
        Err(err) => warn!(
            %scope,
            family = %family_group,
            error = %err,
            "Failed to clear pending reminders"
        ),
    }
}

/// Opens `[today, today + days - 1]` as the family's selection window.
pub(crate) fn open_turn_window<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    family_group: &str,
    today: Date,
    days: u32,
) -> Option<SelectionWindow> {
    let end: Date = match add_days(today, i64::from(days.max(1) - 1)) {
        Ok(end) => end,
        Err(err) => {
            warn!(%scope, family = %family_group, error = %err, "Invalid selection window");
            return None;
        }
    };

    match store.open_selection_window(scope, family_group, today, end) {
        Ok(()) => Some(SelectionWindow { start: today, end }),
        Err(err) => {
            warn!(
                %scope,
                family = %family_group,
                error = %err,
                "Failed to open selection window"
            );
            None
        }
    }
}
