//! Per-category bonus pools consumed by stat/damage aggregation.
//!
//! This is the read-only contract the item-level affix system feeds:
//! flat bonuses are summed first, then multipliers apply in insertion order.
//! The dice engine itself never aggregates - the combat resolver folds the
//! engine's emitted events through pools like these.

/// A single aggregation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusEntry {
    /// Additive bonus, summed before any multiplier.
    Flat(i32),

    /// Percent multiplier (100 = ×1), applied sequentially after flats.
    Multiplier(i32),
}

/// Accumulates bonuses for one stat or damage category.
///
/// # Formula
///
/// ```text
/// result = (base + flat_sum) × mult_1/100 × mult_2/100 × ...
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusPool {
    entries: Vec<BonusEntry>,
}

impl BonusPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flat bonus.
    pub fn add_flat(&mut self, value: i32) {
        self.entries.push(BonusEntry::Flat(value));
    }

    /// Adds a percent multiplier (100 = ×1).
    pub fn add_multiplier(&mut self, percent: i32) {
        self.entries.push(BonusEntry::Multiplier(percent));
    }

    /// Applies the pool to a base value.
    pub fn resolve(&self, base: i32) -> i32 {
        let flat_sum: i32 = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                BonusEntry::Flat(value) => Some(*value),
                _ => None,
            })
            .sum();

        self.entries
            .iter()
            .filter_map(|entry| match entry {
                BonusEntry::Multiplier(percent) => Some(*percent),
                _ => None,
            })
            .fold(base + flat_sum, |acc, percent| {
                ((acc as i64 * percent as i64) / 100) as i32
            })
    }

    /// True when nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
