//! Read-only turn/combat context consumed by conditions and value sources.

use arrayvec::ArrayVec;
use strum::EnumCount;

use crate::config::EngineConfig;
use crate::die::{Element, StatusKind};

/// Immutable snapshot of turn state for one processor invocation.
///
/// The collection rebuilds this before every pass; the processor never
/// mutates it. Usage counters describe the turn *so far* - a pass triggered
/// by using the third die sees `used_count == 3`, including that die.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessingContext {
    /// The die whose use triggered this pass, with its hand index.
    /// Set only for `OnUse` passes.
    pub trigger_slot: Option<usize>,

    /// Dice consumed so far this turn.
    pub used_count: u32,

    /// Hand slots consumed so far this turn, in consumption order.
    pub used_slots: ArrayVec<usize, { EngineConfig::MAX_DICE }>,

    /// Size of the hand as originally rolled this turn.
    pub original_hand_size: u32,

    /// Current turn number (1-based once combat starts).
    pub turn: u32,

    /// Per-element usage counters for the turn, indexed by `Element::index`.
    pub element_used: [u32; Element::COUNT],

    /// Number of persistent modifiers currently active.
    pub modifier_count: u32,

    /// Player mana, mirrored in from the external resource system for
    /// mana-gated conditions.
    pub player_mana: u32,

    /// Statuses currently on the player, mirrored in from the external
    /// combat system for status-gated conditions.
    pub active_statuses: ArrayVec<StatusKind, { EngineConfig::MAX_STATUS_EFFECTS }>,

    /// Lifecycle step counter, used to derive deterministic reroll seeds.
    pub nonce: u64,
}

impl ProcessingContext {
    /// Context for a pass outside any turn bookkeeping (tests, pool passes
    /// before the first roll).
    pub fn empty() -> Self {
        Self::default()
    }
}
