// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Turn-ready notifications.
//!
//! Dispatch is fire-and-forget: a failed send is logged and recorded in the
//! notification log, and never undoes the turn change that triggered it.

use crate::store::{NotificationStatus, RotationStore, SELECTION_TURN_READY};
use cabin_rotation_domain::{Contact, FamilyGroup, RotationScope};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Details of the turn that opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionData {
    pub family_group_name: String,
    pub guest_email: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub selection_year: i32,
    pub available_periods: u32,
}

/// Payload handed to the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnNotification {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub organization_id: i64,
    pub selection_data: SelectionData,
}

/// A failed notification dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationError {
    pub message: String,
}

impl std::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Notification dispatch failed: {}", self.message)
    }
}

impl std::error::Error for NotificationError {}

/// Delivers turn notifications.
pub trait TurnNotifier {
    /// Sends a turn-ready notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be handed off.
    fn notify_turn_ready(&self, notification: &TurnNotification) -> Result<(), NotificationError>;
}

/// Builds the turn-ready payload for a family.
#[must_use]
pub fn turn_ready_notification(
    scope: RotationScope,
    family: &FamilyGroup,
    available_periods: u32,
) -> TurnNotification {
    let contact: Option<&Contact> = family.notification_contact();
    TurnNotification {
        notification_type: String::from(SELECTION_TURN_READY),
        organization_id: scope.organization_id,
        selection_data: SelectionData {
            family_group_name: family.name.clone(),
            guest_email: contact.and_then(|c| c.email.clone()),
            guest_name: contact.map(|c| c.name.clone()),
            guest_phone: contact.and_then(|c| c.phone.clone()),
            selection_year: scope.rotation_year,
            available_periods,
        },
    }
}

/// Looks up the family's contact and sends a turn-ready notification.
///
/// Returns whether the notification was handed off. Every failure on the
/// way is logged and swallowed.
pub fn notify_turn_ready<S: RotationStore, N: TurnNotifier + ?Sized>(
    store: &mut S,
    notifier: &N,
    scope: RotationScope,
    family_group: &str,
    available_periods: u32,
) -> bool {
    let family: FamilyGroup = match store.load_family_group(scope.organization_id, family_group) {
        Ok(Some(family)) => family,
        Ok(None) => {
            warn!(
                organization_id = scope.organization_id,
                family = %family_group,
                "Family group not found; skipping turn notification"
            );
            return false;
        }
        Err(err) => {
            warn!(
                organization_id = scope.organization_id,
                family = %family_group,
                error = %err,
                "Failed to load family group for turn notification"
            );
            return false;
        }
    };

    let notification: TurnNotification =
        turn_ready_notification(scope, &family, available_periods);

    let status: NotificationStatus = match notifier.notify_turn_ready(&notification) {
        Ok(()) => {
            info!(
                organization_id = scope.organization_id,
                rotation_year = scope.rotation_year,
                family = %family_group,
                "Sent turn-ready notification"
            );
            NotificationStatus::Sent
        }
        Err(err) => {
            warn!(
                organization_id = scope.organization_id,
                rotation_year = scope.rotation_year,
                family = %family_group,
                error = %err,
                "Turn-ready notification failed"
            );
            NotificationStatus::Failed
        }
    };

    if let Err(err) =
        store.record_notification(scope, family_group, SELECTION_TURN_READY, status)
    {
        warn!(
            organization_id = scope.organization_id,
            family = %family_group,
            error = %err,
            "Failed to record notification"
        );
    }

    status == NotificationStatus::Sent
}
