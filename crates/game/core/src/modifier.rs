//! Persistent modifiers: rules that outlive a single roll.
//!
//! Affix rules are re-evaluated from scratch every time the hand is rolled;
//! anything that should keep affecting dice across rolls is carried by a
//! [`PersistentModifier`] instead. Modifiers are created by effects (most
//! commonly `ModifyValueFlat`/`ModifyValuePercent` under `OnCombatStart`, or
//! an explicit `CreateCombatModifier`), stored on the collection, reapplied
//! to every freshly rolled hand, ticked at end of turn, and dropped once
//! expired. A modifier never expires mid-turn.

use crate::die::Die;

/// What a persistent modifier does to each die it applies to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierKind {
    /// Flat value bonus.
    Flat(i32),

    /// Percent value multiplier (100 = ×1).
    Percent(i32),

    /// Minimum-value override.
    Minimum(i32),

    /// Maximum-value override.
    Maximum(i32),

    /// One reroll charge per roll.
    GrantReroll,

    /// Adds a tag on every roll.
    AddTag(String),
}

/// How long a modifier lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierDuration {
    /// Until combat ends.
    Combat,

    /// A fixed number of turns, decremented at each end of turn.
    Turns(u32),
}

/// Which hand slots a modifier lands on.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierFilter {
    /// Every die.
    AllDice,

    /// Every die except the originating slot.
    AllExceptSource,

    /// Dice left of the originating slot.
    LeftOfSource,

    /// Dice right of the originating slot.
    RightOfSource,

    /// One specific slot.
    SpecificSlot(usize),

    /// Dice carrying the tag.
    WithTag(String),

    /// Dice not carrying the tag.
    WithoutTag(String),
}

/// A rule that survives across turns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistentModifier {
    pub kind: ModifierKind,
    pub duration: ModifierDuration,
    pub filter: ModifierFilter,

    /// Hand slot of the die whose rule created this modifier.
    pub origin_slot: usize,

    /// Name of the originating rule, for logs and the presentation layer.
    pub source: String,
}

impl PersistentModifier {
    pub fn new(
        kind: ModifierKind,
        duration: ModifierDuration,
        filter: ModifierFilter,
        origin_slot: usize,
        source: &str,
    ) -> Self {
        Self {
            kind,
            duration,
            filter,
            origin_slot,
            source: source.to_owned(),
        }
    }

    /// Whether this modifier lands on the die at `slot`.
    pub fn applies_to(&self, slot: usize, die: &Die) -> bool {
        match &self.filter {
            ModifierFilter::AllDice => true,
            ModifierFilter::AllExceptSource => slot != self.origin_slot,
            ModifierFilter::LeftOfSource => slot < self.origin_slot,
            ModifierFilter::RightOfSource => slot > self.origin_slot,
            ModifierFilter::SpecificSlot(target) => slot == *target,
            ModifierFilter::WithTag(tag) => die.tags.has(tag),
            ModifierFilter::WithoutTag(tag) => !die.tags.has(tag),
        }
    }

    /// Applies the modification to one die.
    pub fn apply_to(&self, die: &mut Die) {
        match &self.kind {
            ModifierKind::Flat(delta) => die.apply_flat(*delta),
            ModifierKind::Percent(percent) => die.apply_percent(*percent),
            ModifierKind::Minimum(min) => die.set_minimum(*min),
            ModifierKind::Maximum(max) => die.set_maximum(*max),
            ModifierKind::GrantReroll => {
                die.reroll_charges = die.reroll_charges.saturating_add(1);
            }
            ModifierKind::AddTag(tag) => {
                die.tags.add(tag);
            }
        }
    }

    /// Decrements a turn-limited duration. Called once per end of turn.
    pub fn tick_turn(&mut self) {
        if let ModifierDuration::Turns(turns) = &mut self.duration {
            *turns = turns.saturating_sub(1);
        }
    }

    /// True once the modifier should be removed.
    pub fn is_expired(&self) -> bool {
        matches!(self.duration, ModifierDuration::Turns(0))
    }

    /// Rough display magnitude for logs.
    pub fn magnitude(&self) -> i32 {
        match &self.kind {
            ModifierKind::Flat(v)
            | ModifierKind::Percent(v)
            | ModifierKind::Minimum(v)
            | ModifierKind::Maximum(v) => *v,
            ModifierKind::GrantReroll | ModifierKind::AddTag(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::{Die, DieId, DieSize, Element};

    fn die_at(slot: usize) -> Die {
        let mut die = Die::new(DieId(slot as u32), DieSize::D6, Element::Neutral);
        die.slot_index = slot;
        die
    }

    #[test]
    fn directional_filters_split_around_origin() {
        let modifier = PersistentModifier::new(
            ModifierKind::Flat(1),
            ModifierDuration::Combat,
            ModifierFilter::LeftOfSource,
            2,
            "test",
        );
        assert!(modifier.applies_to(0, &die_at(0)));
        assert!(modifier.applies_to(1, &die_at(1)));
        assert!(!modifier.applies_to(2, &die_at(2)));
        assert!(!modifier.applies_to(3, &die_at(3)));
    }

    #[test]
    fn tag_filters_read_the_die() {
        let modifier = PersistentModifier::new(
            ModifierKind::Flat(1),
            ModifierDuration::Combat,
            ModifierFilter::WithTag("ember".into()),
            0,
            "test",
        );
        let plain = die_at(1);
        let tagged = die_at(1).with_tag("ember");
        assert!(!modifier.applies_to(1, &plain));
        assert!(modifier.applies_to(1, &tagged));
    }

    #[test]
    fn turn_duration_expires_only_at_zero() {
        let mut modifier = PersistentModifier::new(
            ModifierKind::Flat(1),
            ModifierDuration::Turns(2),
            ModifierFilter::AllDice,
            0,
            "test",
        );
        assert!(!modifier.is_expired());
        modifier.tick_turn();
        assert!(!modifier.is_expired());
        modifier.tick_turn();
        assert!(modifier.is_expired());
    }

    #[test]
    fn combat_duration_never_expires_from_ticks() {
        let mut modifier = PersistentModifier::new(
            ModifierKind::Flat(1),
            ModifierDuration::Combat,
            ModifierFilter::AllDice,
            0,
            "test",
        );
        for _ in 0..10 {
            modifier.tick_turn();
        }
        assert!(!modifier.is_expired());
    }
}
