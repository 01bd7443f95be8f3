// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The secondary selection round.
//!
//! Once every family has finished its primary turn, each family receives
//! `secondary_max_periods` additional periods and the families pick again
//! in reversed rotation order. The round visits each family at most once.

use crate::coordinator::{AdvanceOutcome, clear_ending_reminders, open_turn_window};
use crate::error::CoreError;
use crate::notification::{TurnNotifier, notify_turn_ready};
use crate::state::RotationOrderState;
use crate::store::{RotationStore, SecondaryRoundStart};
use crate::{require_rotation_config, require_rotation_order};
use cabin_rotation_domain::{
    RotationConfig, RotationScope, SelectionPhase, TimePeriodUsage, next_secondary_family,
    secondary_order,
};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{info, warn};

/// Result of a secondary generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryGeneration {
    /// False when periods had already been generated and nothing changed.
    pub generated: bool,
    /// The family whose secondary turn opened.
    pub first_family: Option<String>,
    /// Whether that family was notified.
    pub notified: bool,
}

/// Generates secondary allowances and opens the first secondary turn.
///
/// Calling this again after periods have been generated is a no-op.
///
/// # Errors
///
/// Returns an error if secondary selection is disabled, the configuration
/// or order is missing, the order changed concurrently, or the store fails.
pub fn generate_secondary_periods<S: RotationStore, N: TurnNotifier + ?Sized>(
    store: &mut S,
    notifier: &N,
    scope: RotationScope,
    today: Date,
) -> Result<SecondaryGeneration, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    if !config.enable_secondary_selection {
        return Err(CoreError::SecondarySelectionDisabled(scope.organization_id));
    }

    let order: RotationOrderState = require_rotation_order(store, scope)?;
    if order.secondary_periods_generated {
        info!(%scope, "Secondary periods already generated");
        return Ok(SecondaryGeneration {
            generated: false,
            first_family: order.current_secondary_turn_family,
            notified: false,
        });
    }

    let first_family: Option<String> = if config.secondary_max_periods > 0 {
        secondary_order(&order.family_order).into_iter().next()
    } else {
        None
    };

    let started: bool = store.start_secondary_round(
        scope,
        order.version,
        SecondaryRoundStart {
            secondary_periods_allowed: config.secondary_max_periods,
            default_primary_allowed: config.max_time_slots,
            first_family: first_family.as_deref(),
        },
    )?;
    if !started {
        warn!(%scope, "Rotation order changed while starting the secondary round");
        return Err(CoreError::TurnConflict(scope));
    }

    info!(
        %scope,
        first_family = first_family.as_deref().unwrap_or("<none>"),
        secondary_max_periods = config.secondary_max_periods,
        "Generated secondary periods"
    );

    let mut notified: bool = false;
    if let Some(family) = &first_family {
        open_turn_window(store, scope, family, today, config.secondary_selection_days);
        notified = notify_turn_ready(store, notifier, scope, family, config.secondary_max_periods);
    }

    Ok(SecondaryGeneration {
        generated: true,
        first_family,
        notified,
    })
}

/// Moves the secondary turn forward, or ends the round.
///
/// With `completed = true` the turn passes to the next family in reversed
/// order that still has secondary periods left; the round ends when none
/// remain. With `completed = false` the round ends immediately.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, no
/// secondary turn is active, the turn changed concurrently, or the store fails.
pub fn advance_secondary_selection<S: RotationStore, N: TurnNotifier + ?Sized>(
    store: &mut S,
    notifier: &N,
    scope: RotationScope,
    completed: bool,
    today: Date,
) -> Result<AdvanceOutcome, CoreError> {
    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    let current: String = match (&order.current_secondary_turn_family, order.secondary_round_active)
    {
        (Some(family), true) => family.clone(),
        _ => return Err(CoreError::NoActiveTurn(scope)),
    };
    let usage: Vec<TimePeriodUsage> = store.list_usage(scope)?;

    let next: Option<String> = if completed {
        next_secondary_family(&order.family_order, Some(current.as_str()), &usage)
    } else {
        None
    };

    if !store.set_secondary_turn(scope, order.version, next.as_deref())? {
        warn!(%scope, family = %current, "Secondary turn changed concurrently");
        return Err(CoreError::TurnConflict(scope));
    }

    clear_ending_reminders(store, scope, &current);

    let mut outcome: AdvanceOutcome = AdvanceOutcome {
        phase: SelectionPhase::Secondary,
        completed_family: current,
        next_family: next.clone(),
        selection_window: None,
        notified: false,
        secondary_generation: None,
    };

    if let Some(next_family) = next {
        info!(
            %scope,
            completed_family = %outcome.completed_family,
            next_family = %next_family,
            "Advanced secondary selection"
        );
        outcome.selection_window = open_turn_window(
            store,
            scope,
            &next_family,
            today,
            config.secondary_selection_days,
        );
        let available: u32 = usage
            .iter()
            .find(|row| row.family_group == next_family)
            .map_or(0, |row| {
                row.secondary_periods_allowed
                    .saturating_sub(row.secondary_periods_used)
            });
        outcome.notified = notify_turn_ready(store, notifier, scope, &next_family, available);
    } else {
        info!(
            %scope,
            completed_family = %outcome.completed_family,
            forfeited = !completed,
            "Secondary round ended"
        );
    }

    Ok(outcome)
}
