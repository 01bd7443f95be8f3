// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Usage reconciliation.
//!
//! Usage counters are bumped on every booking and can drift from the
//! reservations actually on the books. Reconciliation recounts primary
//! reservations per family and corrects the counters. It runs at most once
//! per rotation year unless forced, and never moves a turn.

use crate::error::CoreError;
use crate::state::RotationOrderState;
use crate::store::RotationStore;
use crate::{require_rotation_config, require_rotation_order};
use cabin_rotation_domain::{
    RotationConfig, RotationScope, TimePeriodUsage, UsageCorrection, plan_usage_reconciliation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// What a reconciliation run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// True when the scope had already been reconciled and `force` was not set.
    pub skipped: bool,
    /// Corrections applied.
    pub corrections: Vec<UsageCorrection>,
}

/// Recomputes `time_periods_used` from reservations.
///
/// # Errors
///
/// Returns an error if the configuration or order is missing, or the store
/// fails. Stored usage is left unchanged on error.
pub fn reconcile_usage<S: RotationStore>(
    store: &mut S,
    scope: RotationScope,
    force: bool,
) -> Result<ReconciliationOutcome, CoreError> {
    if !force && store.reconciliation_recorded(scope)? {
        info!(%scope, "Usage already reconciled; skipping");
        return Ok(ReconciliationOutcome {
            skipped: true,
            corrections: Vec::new(),
        });
    }

    let config: RotationConfig = require_rotation_config(store, scope.organization_id)?;
    let order: RotationOrderState = require_rotation_order(store, scope)?;
    let existing: Vec<TimePeriodUsage> = store.list_usage(scope)?;
    let counts: HashMap<String, u32> = store.primary_reservation_counts(scope)?;

    let corrections: Vec<UsageCorrection> =
        plan_usage_reconciliation(scope, &config, &order.family_order, &existing, &counts);

    for correction in &corrections {
        match correction {
            UsageCorrection::Create(row) => info!(
                %scope,
                family = %row.family_group,
                used = row.time_periods_used,
                "Creating missing usage row"
            ),
            UsageCorrection::UpdateUsed {
                family_group,
                previous,
                actual,
                ..
            } => warn!(
                %scope,
                family = %family_group,
                previous,
                actual,
                "Correcting drifted usage"
            ),
        }
    }

    store.apply_usage_reconciliation(scope, &corrections)?;

    info!(%scope, corrections = corrections.len(), force, "Reconciled usage");

    Ok(ReconciliationOutcome {
        skipped: false,
        corrections,
    })
}
