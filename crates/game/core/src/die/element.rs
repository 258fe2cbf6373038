//! Elements and status effect kinds carried by dice.

/// Elemental alignment of a die.
///
/// The element flows into every combat event the die emits and is what
/// per-turn usage counters are keyed by.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Element {
    /// No elemental alignment.
    #[default]
    Neutral,
    /// Fire - burn-oriented.
    Fire,
    /// Frost - chill/slow-oriented.
    Frost,
    /// Storm - chain/shock-oriented.
    Storm,
    /// Venom - poison-oriented.
    Venom,
    /// Radiant - healing/holy-oriented.
    Radiant,
    /// Umbral - drain/shadow-oriented.
    Umbral,
}

impl Element {
    /// The attack-capable elements, in declaration order.
    ///
    /// `Neutral` is excluded: "least used element" selection and element
    /// randomization only pick from alignments that carry combat meaning.
    pub const ATTACK: [Element; 6] = [
        Element::Fire,
        Element::Frost,
        Element::Storm,
        Element::Venom,
        Element::Radiant,
        Element::Umbral,
    ];

    /// Index into per-element counter arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Status effects a die can inflict on hit.
///
/// These are opaque to the engine: a `GrantStatusEffect` affix only queues a
/// `StatusApplied` combat event; ticking and stacking live in the combat
/// resolver downstream.
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
pub enum StatusKind {
    /// Fire damage over time.
    Burn,
    /// Reduced action speed.
    Chill,
    /// Interrupts channels, bonus vs wet targets.
    Shock,
    /// Stacking damage over time.
    Poison,
    /// Outgoing damage reduced.
    Weaken,
    /// Cannot act.
    Stun,
    /// Incoming damage increased.
    Expose,
}
