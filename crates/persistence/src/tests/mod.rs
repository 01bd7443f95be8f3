// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use crate::Persistence;
use cabin_rotation_domain::{
    Contact, FamilyGroup, HostMember, Reservation, RotationConfig, RotationScope, SelectionRound,
};
use time::Date;

pub const ORG: i64 = 1;

pub const fn scope() -> RotationScope {
    RotationScope::new(ORG, 2026)
}

pub fn family(name: &str) -> FamilyGroup {
    let mut family = FamilyGroup::new(ORG, name);
    family.lead = Some(Contact {
        name: format!("{name} Lead"),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
    });
    family.host_members = vec![HostMember {
        contact: Contact {
            name: format!("{name} Host"),
            email: Some(format!("{}.host@example.com", name.to_lowercase())),
            phone: Some(String::from("555-0100")),
        },
        can_host: true,
    }];
    family.color = Some(String::from("#336699"));
    family
}

/// An in-memory database with families A, B and C in rotation order.
pub fn seeded_persistence(config: &RotationConfig) -> Persistence {
    let mut persistence = Persistence::new_in_memory().expect("in-memory database");
    persistence
        .upsert_rotation_config(ORG, config)
        .expect("rotation config");
    for name in ["A", "B", "C"] {
        persistence
            .create_family_group(&family(name))
            .expect("family group");
    }
    persistence
        .set_rotation_order(
            scope(),
            &[String::from("A"), String::from("B"), String::from("C")],
        )
        .expect("rotation order");
    persistence
}

pub fn reservation(family_group: &str, start: Date, end: Date, guests: u32) -> Reservation {
    Reservation {
        reservation_id: None,
        organization_id: ORG,
        rotation_year: 2026,
        family_group: family_group.to_string(),
        start_date: start,
        end_date: end,
        guest_count: guests,
        selection_round: SelectionRound::Primary,
    }
}
