// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory store and notifier used by the service tests.

use crate::{
    CoreError, NewBooking, NotificationError, NotificationStatus, RotationOrderState,
    RotationStore, SeasonStore, SecondaryRoundStart, TurnNotification, TurnNotifier,
};
use cabin_rotation_domain::{
    BillingConfig, CheckInSession, Contact, DailyOccupancy, FamilyGroup, HostMember, Payment,
    Reservation, RotationConfig, RotationScope, SeasonConfig, SelectionRound, TimePeriodUsage,
    UsageCorrection,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use time::Date;
use time::macros::date;

pub const ORG: i64 = 1;
pub const TODAY: Date = date!(2026 - 06 - 15);

pub fn scope() -> RotationScope {
    RotationScope::new(ORG, 2026)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationLogEntry {
    pub family_group: String,
    pub notification_type: String,
    pub status: NotificationStatus,
}

#[derive(Debug, Default)]
pub struct FakeStore {
    pub rotation_configs: HashMap<i64, RotationConfig>,
    pub billing_configs: HashMap<i64, BillingConfig>,
    pub season_configs: HashMap<i64, SeasonConfig>,
    pub orders: HashMap<RotationScope, RotationOrderState>,
    pub usage: Vec<TimePeriodUsage>,
    pub family_groups: Vec<FamilyGroup>,
    pub selection_windows: HashMap<String, (Date, Date)>,
    pub extensions: HashMap<String, Date>,
    pub notification_log: Vec<NotificationLogEntry>,
    pub reservations: Vec<Reservation>,
    pub payments: Vec<Payment>,
    pub sessions: Vec<CheckInSession>,
    pub reconciled: HashSet<RotationScope>,
    pub secondary_round_starts: u32,
    /// Simulates another caller moving the turn just before the next write.
    pub interleave_concurrent_advance: bool,
    pub fail_window_updates: bool,
    next_id: i64,
}

impl FakeStore {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn usage_row_mut(
        &mut self,
        scope: RotationScope,
        family_group: &str,
        default_allowed: u32,
    ) -> &mut TimePeriodUsage {
        let position: Option<usize> = self
            .usage
            .iter()
            .position(|row| row.scope == scope && row.family_group == family_group);
        let index: usize = if let Some(index) = position {
            index
        } else {
            let mut row = TimePeriodUsage::new(scope, family_group, default_allowed);
            row.usage_id = Some(self.next_id());
            self.usage.push(row);
            self.usage.len() - 1
        };
        &mut self.usage[index]
    }

    /// Returns true (and bumps the version) when a concurrent change is simulated.
    fn concurrent_change(&mut self, scope: RotationScope) -> bool {
        if self.interleave_concurrent_advance {
            self.interleave_concurrent_advance = false;
            if let Some(order) = self.orders.get_mut(&scope) {
                order.version += 1;
            }
            return true;
        }
        false
    }

    pub fn usage_for(&self, family_group: &str) -> Option<&TimePeriodUsage> {
        self.usage.iter().find(|row| row.family_group == family_group)
    }

    pub fn order(&self) -> &RotationOrderState {
        self.orders.get(&scope()).expect("order seeded")
    }

    pub fn add_reservation(&mut self, mut reservation: Reservation) -> i64 {
        let id = self.next_id();
        reservation.reservation_id = Some(id);
        self.reservations.push(reservation);
        id
    }

    pub fn add_payment(&mut self, mut payment: Payment) -> i64 {
        let id = self.next_id();
        payment.payment_id = Some(id);
        self.payments.push(payment);
        id
    }
}

impl RotationStore for FakeStore {
    fn load_rotation_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<RotationConfig>, CoreError> {
        Ok(self.rotation_configs.get(&organization_id).cloned())
    }

    fn load_rotation_order(
        &mut self,
        scope: RotationScope,
    ) -> Result<Option<RotationOrderState>, CoreError> {
        Ok(self.orders.get(&scope).cloned())
    }

    fn list_usage(&mut self, scope: RotationScope) -> Result<Vec<TimePeriodUsage>, CoreError> {
        Ok(self
            .usage
            .iter()
            .filter(|row| row.scope == scope)
            .cloned()
            .collect())
    }

    fn load_family_group(
        &mut self,
        organization_id: i64,
        name: &str,
    ) -> Result<Option<FamilyGroup>, CoreError> {
        Ok(self
            .family_groups
            .iter()
            .find(|fg| fg.organization_id == organization_id && fg.name == name)
            .cloned())
    }

    fn advance_primary_turn(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        completed_family: &str,
        next_family: Option<&str>,
    ) -> Result<bool, CoreError> {
        if self.concurrent_change(scope) {
            return Ok(false);
        }
        let allowed: u32 = self
            .rotation_configs
            .get(&scope.organization_id)
            .map_or(0, |c| c.max_time_slots);
        let Some(order) = self.orders.get_mut(&scope) else {
            return Ok(false);
        };
        if order.version != expected_version {
            return Ok(false);
        }
        order.current_primary_turn_family = next_family.map(str::to_string);
        order.version += 1;
        self.usage_row_mut(scope, completed_family, allowed)
            .turn_completed = true;
        Ok(true)
    }

    fn start_secondary_round(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        start: SecondaryRoundStart<'_>,
    ) -> Result<bool, CoreError> {
        if self.concurrent_change(scope) {
            return Ok(false);
        }
        let Some(order) = self.orders.get(&scope).cloned() else {
            return Ok(false);
        };
        if order.version != expected_version {
            return Ok(false);
        }
        for family in &order.family_order {
            let row = self.usage_row_mut(scope, family, start.default_primary_allowed);
            row.secondary_periods_allowed = start.secondary_periods_allowed;
            row.selection_round = SelectionRound::Secondary;
        }
        let order = self.orders.get_mut(&scope).expect("order exists");
        order.secondary_periods_generated = true;
        order.secondary_round_active = start.first_family.is_some();
        order.current_secondary_turn_family = start.first_family.map(str::to_string);
        order.version += 1;
        self.secondary_round_starts += 1;
        Ok(true)
    }

    fn set_secondary_turn(
        &mut self,
        scope: RotationScope,
        expected_version: i64,
        next_family: Option<&str>,
    ) -> Result<bool, CoreError> {
        if self.concurrent_change(scope) {
            return Ok(false);
        }
        let Some(order) = self.orders.get_mut(&scope) else {
            return Ok(false);
        };
        if order.version != expected_version {
            return Ok(false);
        }
        order.current_secondary_turn_family = next_family.map(str::to_string);
        order.secondary_round_active = next_family.is_some();
        order.version += 1;
        Ok(true)
    }

    fn open_selection_window(
        &mut self,
        _scope: RotationScope,
        family_group: &str,
        start: Date,
        end: Date,
    ) -> Result<(), CoreError> {
        if self.fail_window_updates {
            return Err(CoreError::Store {
                message: String::from("window update failed"),
            });
        }
        self.selection_windows
            .insert(family_group.to_string(), (start, end));
        Ok(())
    }

    fn active_extensions(
        &mut self,
        _scope: RotationScope,
        today: Date,
    ) -> Result<HashSet<String>, CoreError> {
        Ok(self
            .extensions
            .iter()
            .filter(|(_, until)| **until >= today)
            .map(|(family, _)| family.clone())
            .collect())
    }

    fn delete_pending_notifications(
        &mut self,
        _scope: RotationScope,
        family_group: &str,
        notification_type: &str,
    ) -> Result<usize, CoreError> {
        let before: usize = self.notification_log.len();
        self.notification_log.retain(|entry| {
            !(entry.family_group == family_group
                && entry.notification_type == notification_type
                && entry.status == NotificationStatus::Pending)
        });
        Ok(before - self.notification_log.len())
    }

    fn record_notification(
        &mut self,
        _scope: RotationScope,
        family_group: &str,
        notification_type: &str,
        status: NotificationStatus,
    ) -> Result<(), CoreError> {
        self.notification_log.push(NotificationLogEntry {
            family_group: family_group.to_string(),
            notification_type: notification_type.to_string(),
            status,
        });
        Ok(())
    }

    fn primary_nights_booked(
        &mut self,
        scope: RotationScope,
        family_group: &str,
    ) -> Result<u32, CoreError> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| {
                r.organization_id == scope.organization_id
                    && r.rotation_year == scope.rotation_year
                    && r.family_group == family_group
                    && r.selection_round == SelectionRound::Primary
            })
            .map(Reservation::nights)
            .sum())
    }

    fn primary_reservation_counts(
        &mut self,
        scope: RotationScope,
    ) -> Result<HashMap<String, u32>, CoreError> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for r in &self.reservations {
            if r.organization_id == scope.organization_id
                && r.rotation_year == scope.rotation_year
                && r.selection_round == SelectionRound::Primary
            {
                *counts.entry(r.family_group.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn record_booking(
        &mut self,
        scope: RotationScope,
        booking: &NewBooking<'_>,
    ) -> Result<i64, CoreError> {
        let id = self.add_reservation(booking.reservation.clone());
        let row = self.usage_row_mut(
            scope,
            &booking.reservation.family_group,
            booking.default_primary_allowed,
        );
        match booking.round {
            SelectionRound::Primary => row.time_periods_used += 1,
            SelectionRound::Secondary => row.secondary_periods_used += 1,
        }
        Ok(id)
    }

    fn reconciliation_recorded(&mut self, scope: RotationScope) -> Result<bool, CoreError> {
        Ok(self.reconciled.contains(&scope))
    }

    fn apply_usage_reconciliation(
        &mut self,
        scope: RotationScope,
        corrections: &[UsageCorrection],
    ) -> Result<(), CoreError> {
        for correction in corrections {
            match correction {
                UsageCorrection::Create(row) => {
                    let mut row = row.clone();
                    row.usage_id = Some(self.next_id());
                    self.usage.push(row);
                }
                UsageCorrection::UpdateUsed {
                    usage_id, actual, ..
                } => {
                    if let Some(row) = self
                        .usage
                        .iter_mut()
                        .find(|row| row.usage_id == Some(*usage_id))
                    {
                        row.time_periods_used = *actual;
                    }
                }
            }
        }
        self.reconciled.insert(scope);
        Ok(())
    }
}

impl SeasonStore for FakeStore {
    fn load_billing_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<BillingConfig>, CoreError> {
        Ok(self.billing_configs.get(&organization_id).cloned())
    }

    fn load_season_config(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<SeasonConfig>, CoreError> {
        Ok(self.season_configs.get(&organization_id).cloned())
    }

    fn list_family_reservations(
        &mut self,
        organization_id: i64,
        family_group: &str,
        first: Date,
        last: Date,
    ) -> Result<Vec<Reservation>, CoreError> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| {
                r.organization_id == organization_id
                    && r.family_group == family_group
                    && r.overlaps(first, last)
            })
            .cloned()
            .collect())
    }

    fn list_payments(&mut self, reservation_ids: &[i64]) -> Result<Vec<Payment>, CoreError> {
        Ok(self
            .payments
            .iter()
            .filter(|p| reservation_ids.contains(&p.reservation_id))
            .cloned()
            .collect())
    }

    fn list_check_in_sessions(
        &mut self,
        reservation_ids: &[i64],
    ) -> Result<Vec<CheckInSession>, CoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| reservation_ids.contains(&s.reservation_id))
            .cloned()
            .collect())
    }

    fn load_reservation(
        &mut self,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, CoreError> {
        Ok(self
            .reservations
            .iter()
            .find(|r| r.reservation_id == Some(reservation_id))
            .cloned())
    }

    fn load_payment(&mut self, payment_id: i64) -> Result<Option<Payment>, CoreError> {
        Ok(self
            .payments
            .iter()
            .find(|p| p.payment_id == Some(payment_id))
            .cloned())
    }

    fn save_occupancy(
        &mut self,
        payment_id: i64,
        daily_occupancy: &[DailyOccupancy],
        amount_cents: i64,
    ) -> Result<(), CoreError> {
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.payment_id == Some(payment_id))
            .ok_or(CoreError::PaymentNotFound(payment_id))?;
        payment.daily_occupancy = daily_occupancy.to_vec();
        payment.amount_cents = Some(amount_cents);
        Ok(())
    }
}

/// Records every notification; optionally fails all of them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<TurnNotification>>,
    pub fail: bool,
}

impl TurnNotifier for RecordingNotifier {
    fn notify_turn_ready(&self, notification: &TurnNotification) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError {
                message: String::from("mail relay unavailable"),
            });
        }
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }
}

impl RecordingNotifier {
    pub fn families(&self) -> Vec<String> {
        self.sent
            .borrow()
            .iter()
            .map(|n| n.selection_data.family_group_name.clone())
            .collect()
    }
}

pub fn family(name: &str) -> FamilyGroup {
    let mut family = FamilyGroup::new(ORG, name);
    family.family_group_id = Some(i64::from(name.as_bytes()[0]));
    family.lead = Some(Contact {
        name: format!("{name} Lead"),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
    });
    family.host_members = vec![HostMember {
        contact: Contact {
            name: format!("{name} Host"),
            email: None,
            phone: None,
        },
        can_host: true,
    }];
    family
}

/// A store with families A, B and C in that order and the turn at A.
pub fn seeded_store(config: RotationConfig) -> FakeStore {
    let mut store = FakeStore::default();
    let names: Vec<String> = vec![String::from("A"), String::from("B"), String::from("C")];
    store.family_groups = names.iter().map(|n| family(n)).collect();
    store
        .orders
        .insert(scope(), RotationOrderState::new(scope(), names));
    store.rotation_configs.insert(ORG, config);
    store
}

pub fn one_slot_config(secondary: bool) -> RotationConfig {
    RotationConfig {
        max_time_slots: 1,
        enable_secondary_selection: secondary,
        ..RotationConfig::default()
    }
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
