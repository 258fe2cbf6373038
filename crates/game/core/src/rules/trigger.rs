//! Lifecycle triggers that activate affix rules.

/// The lifecycle event a rule listens for.
///
/// The collection drives each trigger at a defined point (see
/// `collection::DicePool`); a rule fires only when its trigger matches the
/// pass being processed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RuleTrigger {
    /// The hand was freshly rolled.
    OnRoll,

    /// One specific die was spent; only that die's rules fire.
    OnUse,

    /// The pool order changed.
    OnReorder,

    /// Combat started. Value modifications under this trigger materialize
    /// persistent modifiers instead of mutating (the hand is recreated every
    /// roll, so a one-time mutation would be lost).
    OnCombatStart,

    /// Combat ended.
    OnCombatEnd,

    /// Pool-level pass run before each hand is copied out.
    Passive,
}
