//! Die state and the roll/modifier contract.
//!
//! A [`Die`] is the mutable unit everything else operates on: affix rules are
//! authored onto it, trigger passes mutate it in place, and persistent
//! modifiers re-shape every fresh copy of it. The die itself knows nothing
//! about rules; it only exposes the value/tag/flag bookkeeping primitives the
//! processor dispatches into.

mod element;
mod size;
mod tags;

pub use element::{Element, StatusKind};
pub use size::DieSize;
pub use tags::TagSet;

use crate::rng::RngOracle;
use crate::rules::AffixRule;

/// Unique identifier of a die.
///
/// Pool templates get stable ids at creation; hand copies inherit the template
/// id as their `source` and receive their own instance id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieId(pub u32);

impl core::fmt::Display for DieId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "die#{}", self.0)
    }
}

/// A single die.
///
/// # Value Model
///
/// `base_value` is the rolled face. `value` is the modified total, adjusted
/// by flat/percent effects and clamped into the min/max overrides when those
/// are set. Bonuses may push the total past the face count (a d6 showing 6
/// with +2 totals 8); clamping only applies once an override exists.
///
/// # Position Invariant
///
/// `slot_index` always equals the die's current offset in whichever sequence
/// (pool or hand) contains it. Every membership or order change reassigns it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Die {
    /// Instance identity.
    pub id: DieId,

    /// Pool template this die was copied from (equals `id` for templates).
    pub source: DieId,

    /// Face-count type.
    pub size: DieSize,

    /// Elemental alignment.
    pub element: Element,

    /// Free-form tags.
    pub tags: TagSet,

    /// Current offset in the owning sequence.
    pub slot_index: usize,

    /// Spent this turn (ghost hand: the die stays in place).
    pub consumed: bool,

    /// Locked against rerolls.
    pub locked: bool,

    /// Forced to zero by an external shatter.
    pub shattered: bool,

    /// Created by a duplicate effect; such dice never duplicate again.
    pub from_duplicate: bool,

    /// Player-usable reroll charges granted this turn.
    pub reroll_charges: u8,

    /// Authored affix rules, evaluated in this order.
    pub rules: Vec<AffixRule>,

    base_value: i32,
    value: i32,
    min_value: Option<i32>,
    max_value: Option<i32>,
}

impl Die {
    /// Creates an unrolled die template.
    pub fn new(id: DieId, size: DieSize, element: Element) -> Self {
        Self {
            id,
            source: id,
            size,
            element,
            tags: TagSet::new(),
            slot_index: 0,
            consumed: false,
            locked: false,
            shattered: false,
            from_duplicate: false,
            reroll_charges: 0,
            rules: Vec::new(),
            base_value: 0,
            value: 0,
            min_value: None,
            max_value: None,
        }
    }

    /// Builder: attach an affix rule.
    #[must_use]
    pub fn with_rule(mut self, rule: AffixRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Builder: attach a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.add(tag);
        self
    }

    // ========================================================================
    // Value contract
    // ========================================================================

    /// The rolled face value, before modifiers.
    pub fn base_value(&self) -> i32 {
        self.base_value
    }

    /// The modified total value.
    pub fn total_value(&self) -> i32 {
        self.value
    }

    /// Rolls the die, resetting the modified value to the fresh face.
    pub fn roll(&mut self, rng: &dyn RngOracle, seed: u64) {
        self.base_value = rng.roll_die(seed, self.size.faces()) as i32;
        self.value = self.clamped(self.base_value);
        self.shattered = false;
    }

    /// Rolls `extra` more times and keeps the best face.
    ///
    /// Flat bonuses already applied this pass are preserved: only the delta
    /// between the old and the new best face moves the total.
    pub fn roll_keep_highest(&mut self, rng: &dyn RngOracle, seed: u64, extra: u32) {
        let mut best = self.base_value;
        for stream in 0..extra {
            let face = rng.roll_die(seed.wrapping_add(stream as u64), self.size.faces()) as i32;
            best = best.max(face);
        }
        let delta = best - self.base_value;
        self.base_value = best;
        self.value = self.clamped(self.value + delta);
    }

    /// Forces the roll to a specific face value.
    pub fn force_value(&mut self, forced: i32) {
        self.base_value = forced;
        self.value = self.clamped(forced);
    }

    /// Applies a flat modifier to the total.
    pub fn apply_flat(&mut self, delta: i32) {
        self.value = self.clamped(self.value + delta);
    }

    /// Applies a percent modifier (100 = ×1) to the total.
    ///
    /// Rounds half away from zero. When the multiplier is not ×1 and the
    /// pre-value is positive, truncation is never allowed to erase the
    /// change: the result moves by at least ±1 toward the multiplier.
    pub fn apply_percent(&mut self, percent: i32) {
        let before = self.value;
        let product = before as i64 * percent as i64;
        let mut after = ((product + if product >= 0 { 50 } else { -50 }) / 100) as i32;
        if percent != 100 && before > 0 && after == before {
            after += if percent > 100 { 1 } else { -1 };
        }
        self.value = self.clamped(after);
    }

    /// Sets a minimum-value override, raising the current total if needed.
    pub fn set_minimum(&mut self, min: i32) {
        self.min_value = Some(min);
        self.value = self.clamped(self.value);
    }

    /// Sets a maximum-value override, lowering the current total if needed.
    pub fn set_maximum(&mut self, max: i32) {
        self.max_value = Some(max);
        self.value = self.clamped(self.value);
    }

    /// Minimum-value override, if set.
    pub fn minimum(&self) -> Option<i32> {
        self.min_value
    }

    /// Maximum-value override, if set.
    pub fn maximum(&self) -> Option<i32> {
        self.max_value
    }

    fn clamped(&self, v: i32) -> i32 {
        // The default floor keeps totals non-negative; an explicit minimum
        // override replaces it (and may lower it).
        let min = self
            .min_value
            .unwrap_or(crate::config::EngineConfig::DEFAULT_MIN_VALUE);
        let mut out = v.max(min);
        if let Some(max) = self.max_value {
            out = out.min(max);
        }
        out
    }

    // ========================================================================
    // Flags and identity
    // ========================================================================

    /// True when the rolled face is the die's maximum.
    pub fn rolled_maximum(&self) -> bool {
        self.base_value == self.size.faces() as i32
    }

    /// The element combat events are keyed by.
    pub fn effective_element(&self) -> Element {
        self.element
    }

    /// Forces the die to zero and marks it consumed.
    pub fn shatter(&mut self) {
        self.base_value = 0;
        self.value = self.clamped(0);
        self.shattered = true;
        self.consumed = true;
    }

    /// Creates the hand-side copy of a pool template.
    ///
    /// The copy gets its own instance id, remembers the template as `source`,
    /// and starts with clean per-turn flags.
    #[must_use]
    pub fn instantiate(&self, instance_id: DieId, slot_index: usize) -> Self {
        let mut copy = self.clone();
        copy.id = instance_id;
        copy.source = self.id;
        copy.slot_index = slot_index;
        copy.consumed = false;
        copy.locked = false;
        copy.shattered = false;
        copy.reroll_charges = 0;
        copy
    }
}
