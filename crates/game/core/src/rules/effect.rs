//! The closed set of affix effects.
//!
//! Every variant carries a typed payload; there are no string-keyed auxiliary
//! parameter maps. Dispatch lives in `process::apply`; this module is pure
//! data so rules can be authored in content files and inspected by tools.

use crate::die::{DieSize, Element, StatusKind};
use crate::modifier::{ModifierDuration, ModifierFilter, ModifierKind};

/// Absolute or relative die-type change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeChange {
    /// Become exactly this size.
    To(DieSize),

    /// Step up the size ladder, clamped at D20.
    Upgrade(u8),

    /// Step down the size ladder, clamped at D4.
    Downgrade(u8),
}

/// How a forced element is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementChoice {
    /// Become exactly this element.
    To(Element),

    /// Become the attack element with the lowest per-turn usage count;
    /// ties break in declaration order.
    LeastUsed,
}

/// How a forced roll value is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollValue {
    /// Force to a literal face value.
    To(i32),

    /// Force to the die's own maximum face.
    Maximum,

    /// Force to the rule's resolved magnitude. This is how compound rules
    /// express value transfers: pair it with a snapshot-backed value source
    /// and a `value_target` override.
    FromSource,
}

/// Blueprint for a persistent modifier created by `CreateCombatModifier`.
///
/// The origin slot and source label are filled in at application time from
/// the rule that fired.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierSpec {
    pub kind: ModifierKind,
    pub duration: ModifierDuration,
    pub filter: ModifierFilter,
}

/// The effect an affix applies when it fires.
///
/// Grouped the way dispatch handles them: value mutations, tag operations,
/// rerolls, identity changes, combat tagging, and event emission. The
/// magnitude fed into value-carrying variants comes from the rule's
/// [`super::ValueSource`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    // ========================================================================
    // Value
    // ========================================================================
    /// Add the magnitude to the target's total value.
    ///
    /// Under `OnCombatStart` this materializes a persistent flat modifier
    /// instead of mutating: the hand is recreated every roll, so a one-time
    /// mutation would be lost.
    ModifyValueFlat,

    /// Multiply the target's total by the magnitude as a percent (100 = ×1).
    /// Same `OnCombatStart` materialization rule as `ModifyValueFlat`.
    ModifyValuePercent,

    /// Set a minimum-value override to the magnitude.
    SetMinimum,

    /// Set a maximum-value override to the magnitude.
    SetMaximum,

    // ========================================================================
    // Tag
    // ========================================================================
    /// Add a tag to the target.
    AddTag(String),

    /// Remove a tag from the target.
    RemoveTag(String),

    /// Copy every tag from the owning die onto the target.
    CopyTags,

    /// Strip every tag from the target.
    RemoveAllTags,

    // ========================================================================
    // Reroll
    // ========================================================================
    /// Grant the target a player-usable reroll charge.
    GrantReroll,

    /// Immediately reroll the target if its total is at or below the
    /// threshold. Locked dice are not rerolled.
    AutoRerollLow { threshold: i32 },

    // ========================================================================
    // Identity
    // ========================================================================
    /// Queue a pool duplicate of the target if it rolled its maximum.
    /// Dice created this way never duplicate again.
    DuplicateOnMax,

    /// Lock the target against rerolls.
    LockDie,

    /// Change the target's face-count type.
    ChangeDieType(TypeChange),

    /// Transfer a percentage of the directional neighbor's total onto the
    /// owning die. The rule's target spec picks the neighbor; the owner is
    /// what gains value.
    CopyNeighborValue { percent: i32 },

    // ========================================================================
    // Combat tagging
    // ========================================================================
    /// Queue an extra damage type for the target's hits.
    AddDamageType(Element),

    /// Queue a status effect application; the magnitude is the potency.
    GrantStatusEffect { status: StatusKind },

    /// Re-randomize the target's element among the attack elements.
    RandomizeElement,

    /// Force the target's element.
    SetElement(ElementChoice),

    /// Queue life leech; the magnitude is the percent of damage healed.
    LeechHeal,

    /// Queue the owning die's permanent removal from the pool at end of turn.
    DestroySelf,

    /// Create a persistent modifier from the blueprint.
    CreateCombatModifier(ModifierSpec),

    /// Force the target's rolled value.
    SetRollValue(RollValue),

    // ========================================================================
    // Event emission
    // ========================================================================
    /// Emit splash damage: the magnitude percent of the target's total.
    EmitSplash { percent: i32 },

    /// Emit chain damage jumping between enemies.
    EmitChain { percent: i32, jumps: u8 },

    /// Emit an area burst around the struck enemy.
    EmitAoe { percent: i32 },

    /// Emit flat bonus damage equal to the magnitude.
    EmitBonusDamage,

    /// Refund mana equal to the magnitude.
    ManaRefund,

    /// Gain mana equal to the magnitude.
    ManaGain,

    /// Reroll `extra_rolls` times keeping the best face, and emit the kept
    /// result for the resolver.
    RollKeepHighest { extra_rolls: u32 },

    /// Reroll once keeping the best face, and emit the kept result.
    GrantExtraRoll,

    /// Emit a resistance-ignore marker for the target's hits.
    IgnoreResistance,
}

impl EffectKind {
    /// True when the effect reads value from a neighbor regardless of the
    /// rule's target spec.
    pub fn is_neighbor_dependent(&self) -> bool {
        matches!(self, Self::CopyNeighborValue { .. })
    }
}
