// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use cabin_rotation::{NotificationError, TurnNotification, TurnNotifier};
use cabin_rotation_domain::{Contact, HostMember, RotationConfig, RotationScope};
use cabin_rotation_persistence::Persistence;
use std::cell::RefCell;
use time::macros::date;
use time::{Date, PrimitiveDateTime};

use crate::{
    AuthenticatedActor, BookingRequestBody, CreateFamilyGroupRequest, Role,
    SetRotationOrderRequest, create_family_group, set_rotation_order, upsert_rotation_config,
};

pub const ORG: i64 = 7;
pub const TODAY: Date = date!(2026 - 06 - 15);

pub const fn test_scope() -> RotationScope {
    RotationScope::new(ORG, 2026)
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_member() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("member-456"), Role::Member)
}

/// One primary period per family, secondary round enabled.
pub fn create_test_rotation_config() -> RotationConfig {
    RotationConfig {
        max_time_slots: 1,
        min_nights_per_booking: 2,
        enable_secondary_selection: true,
        secondary_max_periods: 1,
        ..RotationConfig::default()
    }
}

pub fn create_family_request(name: &str) -> CreateFamilyGroupRequest {
    CreateFamilyGroupRequest {
        name: name.to_string(),
        lead: Some(Contact {
            name: format!("{name} Lead"),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
        }),
        host_members: vec![HostMember {
            contact: Contact {
                name: format!("{name} Host"),
                email: Some(format!("{}.host@example.com", name.to_lowercase())),
                phone: None,
            },
            can_host: true,
        }],
        color: Some(String::from("#2266AA")),
    }
}

pub fn booking(
    family_group: &str,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
) -> BookingRequestBody {
    BookingRequestBody {
        family_group: family_group.to_string(),
        start,
        end,
        guest_count: 2,
        admin_override: false,
    }
}

/// Configured organization with Adams, Baker and Clark in rotation order.
pub fn setup_test_persistence() -> Persistence {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let admin = create_test_admin();

    upsert_rotation_config(&mut persistence, &admin, ORG, &create_test_rotation_config())
        .expect("Failed to save rotation config");
    for name in ["Adams", "Baker", "Clark"] {
        create_family_group(&mut persistence, &admin, ORG, &create_family_request(name))
            .expect("Failed to create family group");
    }
    set_rotation_order(
        &mut persistence,
        &admin,
        test_scope(),
        &SetRotationOrderRequest {
            family_order: vec![
                String::from("Adams"),
                String::from("Baker"),
                String::from("Clark"),
            ],
        },
    )
    .expect("Failed to set rotation order");

    persistence
}

/// Records every turn-ready notification, optionally failing them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<String>>,
    pub fail: bool,
}

impl TurnNotifier for RecordingNotifier {
    fn notify_turn_ready(&self, notification: &TurnNotification) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError {
                message: String::from("mail relay unavailable"),
            });
        }
        self.sent
            .borrow_mut()
            .push(notification.selection_data.family_group_name.clone());
        Ok(())
    }
}
