//! Position requirements for affix rules.

/// Predicate over (slot index, sequence length) gating a rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionRequirement {
    /// Fires from any slot.
    #[default]
    Any,

    /// Fires only from the first slot.
    First,

    /// Fires only from the last slot.
    Last,

    /// Fires from any slot except the first.
    NotFirst,

    /// Fires from any slot except the last.
    NotLast,

    /// Fires only from one specific slot.
    Slot(u8),
}

impl PositionRequirement {
    /// Evaluates the requirement against a slot in a sequence of `len` dice.
    pub fn matches(&self, index: usize, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        match self {
            Self::Any => true,
            Self::First => index == 0,
            Self::Last => index == len - 1,
            Self::NotFirst => index != 0,
            Self::NotLast => index != len - 1,
            Self::Slot(slot) => index == *slot as usize,
        }
    }
}
