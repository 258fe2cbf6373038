//! The external resolver contract.
//!
//! The engine queues opaque combat/mana events; whatever interprets them
//! implements [`EventSink`]. The engine side never calls back into combat
//! math - events flow one way, after each action completes.

use dice_core::{BonusPool, CombatEvent, ManaEvent, StatusKind};

/// Receiver for events drained from a combat session.
pub trait EventSink {
    /// Combat-facing events produced by the last action.
    fn on_combat_events(&mut self, events: &[CombatEvent]);

    /// Mana-facing events produced by the last action.
    fn on_mana_events(&mut self, events: &[ManaEvent]);
}

/// Sink that discards everything. Useful for tests and simulations that
/// only care about die state.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_combat_events(&mut self, _events: &[CombatEvent]) {}
    fn on_mana_events(&mut self, _events: &[ManaEvent]) {}
}

/// Reference resolver: folds events into per-category aggregation pools the
/// way the item-level stat system consumes them - flat bonuses summed first,
/// then multipliers.
#[derive(Debug, Default)]
pub struct AggregatingSink {
    /// Flat on-hit damage accumulated from bonus-damage events.
    bonus_damage: BonusPool,

    /// Net mana change from refunds and gains.
    pub mana_delta: i32,

    /// Status applications, in emission order.
    pub statuses: Vec<(usize, StatusKind, i32)>,

    /// Total events seen, for diagnostics.
    pub events_seen: usize,
}

impl AggregatingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the aggregated on-hit damage for a base hit value.
    pub fn damage_for(&self, base: i32) -> i32 {
        self.bonus_damage.resolve(base)
    }
}

impl EventSink for AggregatingSink {
    fn on_combat_events(&mut self, events: &[CombatEvent]) {
        self.events_seen += events.len();
        for event in events {
            match event {
                CombatEvent::BonusDamage { amount, .. } => {
                    self.bonus_damage.add_flat(*amount);
                }
                CombatEvent::StatusApplied {
                    slot,
                    status,
                    potency,
                } => {
                    self.statuses.push((*slot, *status, *potency));
                }
                // Splash/chain/aoe carry their own magnitudes and resolve
                // against enemy layout, which this reference sink does not
                // model.
                _ => {}
            }
        }
    }

    fn on_mana_events(&mut self, events: &[ManaEvent]) {
        self.events_seen += events.len();
        for event in events {
            match event {
                ManaEvent::Refund { amount, .. } | ManaEvent::Gain { amount, .. } => {
                    self.mana_delta += amount;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_damage_aggregates_flat_then_multiplies() {
        let mut sink = AggregatingSink::new();
        sink.on_combat_events(&[
            CombatEvent::BonusDamage { slot: 0, amount: 2 },
            CombatEvent::BonusDamage { slot: 1, amount: 3 },
        ]);
        assert_eq!(sink.damage_for(10), 15);
    }

    #[test]
    fn mana_events_net_out() {
        let mut sink = AggregatingSink::new();
        sink.on_mana_events(&[
            ManaEvent::Refund { slot: 0, amount: 1 },
            ManaEvent::Gain { slot: 1, amount: 2 },
        ]);
        assert_eq!(sink.mana_delta, 3);
    }
}
