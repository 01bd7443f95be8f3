// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Turn notifier that writes notifications to the log.
//!
//! Delivery (email, SMS) is left to an external service tailing the log.

use cabin_rotation::{NotificationError, TurnNotification, TurnNotifier};
use tracing::info;

/// Logs each turn-ready notification as structured JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl TurnNotifier for LoggingNotifier {
    fn notify_turn_ready(&self, notification: &TurnNotification) -> Result<(), NotificationError> {
        let payload: String =
            serde_json::to_string(notification).map_err(|e| NotificationError {
                message: format!("Failed to encode notification: {e}"),
            })?;

        info!(
            organization_id = notification.organization_id,
            family = %notification.selection_data.family_group_name,
            notification_type = %notification.notification_type,
            %payload,
            "Turn notification"
        );
        Ok(())
    }
}
