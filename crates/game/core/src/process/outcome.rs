//! The result of one trigger pass.
//!
//! Value and tag mutations are applied to the dice in place during dispatch;
//! the outcome records them as an ordered journal so presentation layers can
//! replay what happened without subscribing to in-band callbacks. Structural
//! requests (duplication, destruction, modifier creation) are never applied
//! by the engine - the owning collection drains them at phase boundaries.

use bitflags::bitflags;

use crate::modifier::PersistentModifier;

use super::events::{CombatEvent, ManaEvent};

bitflags! {
    /// Which aspects of a die one journal entry touched.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DieFields: u8 {
        const VALUE   = 1 << 0;
        const BOUNDS  = 1 << 1;
        const SIZE    = 1 << 2;
        const ELEMENT = 1 << 3;
        const LOCKED  = 1 << 4;
        const ROLLED  = 1 << 5;
    }
}

/// One journal entry: something about the die at `slot` changed.
///
/// `before`/`after` are the die's total value around the change; for entries
/// that only touch non-value fields they are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieChange {
    pub slot: usize,
    pub fields: DieFields,
    pub before: i32,
    pub after: i32,
}

/// Tags added to / removed from the die at `slot` during the pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagChange {
    pub slot: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// A structural request the engine cannot apply mid-pass.
///
/// Sequence length must stay stable during a pass (stable indices are what
/// neighbor targeting is built on), so anything that would change membership
/// is queued here and applied by the collection between passes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecialRequest {
    /// Duplicate the die's pool template at end of turn.
    DuplicateDie { slot: usize },

    /// The die was locked against rerolls.
    LockDie { slot: usize },

    /// Permanently remove the die's pool template at end of turn.
    DestroyDie { slot: usize },

    /// Store a new persistent modifier on the collection.
    CreateModifier(PersistentModifier),

    /// The die gained a player-usable reroll charge.
    GrantReroll { slot: usize },

    /// The die's rolled value was forced.
    ForcedRoll { slot: usize, value: i32 },
}

/// Everything one `Processor::process` invocation produced.
///
/// Created fresh per invocation and never retained by the engine.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessOutcome {
    /// Ordered journal of die mutations applied during the pass.
    pub changes: Vec<DieChange>,

    /// Tag additions/removals, one entry per mutation.
    pub tag_changes: Vec<TagChange>,

    /// Structural requests for the collection, in activation order.
    pub specials: Vec<SpecialRequest>,

    /// Combat-facing events for the external resolver.
    pub combat_events: Vec<CombatEvent>,

    /// Mana-facing events for the external resolver.
    pub mana_events: Vec<ManaEvent>,
}

impl ProcessOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the pass did nothing observable.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
            && self.tag_changes.is_empty()
            && self.specials.is_empty()
            && self.combat_events.is_empty()
            && self.mana_events.is_empty()
    }

    /// Records a die mutation. Pure value entries that did not actually move
    /// the value are dropped.
    pub(crate) fn record(&mut self, slot: usize, fields: DieFields, before: i32, after: i32) {
        if fields == DieFields::VALUE && before == after {
            return;
        }
        self.changes.push(DieChange {
            slot,
            fields,
            before,
            after,
        });
    }

    /// Records an added tag.
    pub(crate) fn record_tag_added(&mut self, slot: usize, tag: &str) {
        self.tag_changes.push(TagChange {
            slot,
            added: vec![tag.to_owned()],
            removed: Vec::new(),
        });
    }

    /// Records removed tags.
    pub(crate) fn record_tags_removed(&mut self, slot: usize, tags: Vec<String>) {
        if tags.is_empty() {
            return;
        }
        self.tag_changes.push(TagChange {
            slot,
            added: Vec::new(),
            removed: tags,
        });
    }

    /// Appends another outcome produced in the same lifecycle step.
    pub(crate) fn absorb(&mut self, other: ProcessOutcome) {
        self.changes.extend(other.changes);
        self.tag_changes.extend(other.tag_changes);
        self.specials.extend(other.specials);
        self.combat_events.extend(other.combat_events);
        self.mana_events.extend(other.mana_events);
    }
}
