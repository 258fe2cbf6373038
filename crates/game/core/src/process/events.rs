//! Downstream events queued by trigger passes.
//!
//! The engine resolves no combat math. Effects in the combat-tagging and
//! event-emission groups append structured events here; the external combat
//! resolver drains them after the action that produced them completes and
//! interprets the numbers however its damage pipeline sees fit.

use crate::die::{Element, StatusKind};

/// Combat-facing event emitted by a trigger pass.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    /// Splash damage next to the struck enemy.
    Splash {
        slot: usize,
        amount: i32,
        element: Element,
    },

    /// Damage chaining between enemies.
    Chain {
        slot: usize,
        amount: i32,
        element: Element,
        jumps: u8,
    },

    /// Area burst centered on the struck enemy.
    AreaBurst {
        slot: usize,
        amount: i32,
        element: Element,
    },

    /// Flat bonus damage added to the hit.
    BonusDamage { slot: usize, amount: i32 },

    /// The hit carries an extra damage type.
    AddedDamageType { slot: usize, element: Element },

    /// The hit applies a status effect at the given potency.
    StatusApplied {
        slot: usize,
        status: StatusKind,
        potency: i32,
    },

    /// A percentage of the hit's damage heals the attacker.
    LeechHeal { slot: usize, percent: i32 },

    /// The hit ignores elemental resistance.
    ResistanceIgnored { slot: usize },

    /// A keep-highest reroll resolved; `kept` is the face that won.
    ExtraRollKept { slot: usize, kept: i32 },
}

/// Mana/resource-facing event emitted by a trigger pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ManaEvent {
    /// Refund part of the cost that was just paid.
    Refund { slot: usize, amount: i32 },

    /// Gain mana outright.
    Gain { slot: usize, amount: i32 },
}
