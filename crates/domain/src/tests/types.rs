// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BillingMethod, Contact, FamilyGroup, HostMember, RotationConfig, RotationScope,
    SelectionRound,
};

fn contact(name: &str, email: Option<&str>) -> Contact {
    Contact {
        name: name.to_string(),
        email: email.map(str::to_string),
        phone: None,
    }
}

#[test]
fn test_family_group_creation_trims_name() {
    let family: FamilyGroup = FamilyGroup::new(3, "  Adams  ");
    assert_eq!(family.name, "Adams");
    assert_eq!(family.organization_id, 3);
    assert!(family.family_group_id.is_none());
    assert!(family.host_members.is_empty());
}

#[test]
fn test_notification_contact_prefers_lead() {
    let mut family: FamilyGroup = FamilyGroup::new(1, "Adams");
    family.host_members = vec![
        HostMember {
            contact: contact("Guest Only", Some("guest@example.com")),
            can_host: false,
        },
        HostMember {
            contact: contact("Host", Some("host@example.com")),
            can_host: true,
        },
    ];
    assert_eq!(
        family.notification_contact().map(|c| c.name.as_str()),
        Some("Host")
    );

    family.lead = Some(contact("Lead", Some("lead@example.com")));
    assert_eq!(
        family.notification_contact().map(|c| c.name.as_str()),
        Some("Lead")
    );
}

#[test]
fn test_notification_contact_absent() {
    let family: FamilyGroup = FamilyGroup::new(1, "Adams");
    assert!(family.notification_contact().is_none());
}

#[test]
fn test_rotation_scope_display() {
    let scope: RotationScope = RotationScope::new(5, 2027);
    assert_eq!(scope.to_string(), "organization=5,rotation_year=2027");
}

#[test]
fn test_selection_round_parsing() {
    assert_eq!("secondary".parse::<SelectionRound>(), Ok(SelectionRound::Secondary));
    assert_eq!(SelectionRound::default(), SelectionRound::Primary);
    assert!("tertiary".parse::<SelectionRound>().is_err());
}

#[test]
fn test_rotation_config_serde_round_trip() {
    let config: RotationConfig = RotationConfig {
        total_nights_allowed_primary: Some(14),
        ..RotationConfig::default()
    };
    let json: String = serde_json::to_string(&config).unwrap();
    let parsed: RotationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_billing_method_serializes_snake_case() {
    let json: String = serde_json::to_string(&BillingMethod::PerPersonPerNight).unwrap();
    assert_eq!(json, "\"per_person_per_night\"");
}
