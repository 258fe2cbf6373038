//! The dice collection: persistent pool, per-turn hand, and the lifecycle
//! that drives trigger passes.
//!
//! # Pool and Hand
//!
//! The *pool* holds die templates that persist across turns and combats. At
//! each turn start the pool is copied into a fresh *hand*; the hand is what
//! gets rolled, processed, and spent. Using a die marks it consumed in place
//! rather than removing it - the "ghost hand" - so slot indices stay stable
//! for neighbor targeting all turn.
//!
//! # Deferred Mutation
//!
//! Nothing changes sequence membership mid-turn. Destruction and duplication
//! requests queue up and are applied once, at end of turn, with removals
//! sorted descending by index so earlier removals cannot shift pending ones.

use arrayvec::ArrayVec;
use strum::EnumCount;

use crate::config::EngineConfig;
use crate::die::{Die, DieId, Element, StatusKind};
use crate::error::{EngineError, ErrorSeverity};
use crate::modifier::{ModifierKind, PersistentModifier};
use crate::process::{
    CombatEvent, ManaEvent, ProcessOutcome, ProcessingContext, Processor, SpecialRequest,
};
use crate::rng::{RngOracle, compute_seed};
use crate::rules::RuleTrigger;

/// Errors from pool lifecycle operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolError {
    /// Slot index past the end of the hand or pool.
    #[error("slot {slot} out of range (len {len})")]
    SlotOutOfRange { slot: usize, len: usize },

    /// The die was already consumed this turn.
    #[error("die at slot {slot} is already consumed")]
    AlreadyConsumed { slot: usize },

    /// The die is locked against rerolls.
    #[error("die at slot {slot} is locked")]
    DieLocked { slot: usize },

    /// No reroll charges left on the die.
    #[error("die at slot {slot} has no reroll charges")]
    NoRerollCharges { slot: usize },

    /// The pool or hand is at capacity.
    #[error("pool is full")]
    PoolFull,

    /// The reorder sequence is not a permutation of the pool.
    #[error("reorder is not a permutation of the pool")]
    InvalidReorder,
}

impl EngineError for PoolError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SlotOutOfRange { .. } | Self::InvalidReorder => ErrorSeverity::Validation,
            Self::AlreadyConsumed { .. }
            | Self::DieLocked { .. }
            | Self::NoRerollCharges { .. }
            | Self::PoolFull => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SlotOutOfRange { .. } => "POOL_SLOT_OUT_OF_RANGE",
            Self::AlreadyConsumed { .. } => "POOL_ALREADY_CONSUMED",
            Self::DieLocked { .. } => "POOL_DIE_LOCKED",
            Self::NoRerollCharges { .. } => "POOL_NO_REROLL_CHARGES",
            Self::PoolFull => "POOL_FULL",
            Self::InvalidReorder => "POOL_INVALID_REORDER",
        }
    }
}

/// Which sequence a pass ran over, for routing slot-addressed requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PassScope {
    Pool,
    Hand,
}

/// Owns the persistent pool, the per-turn hand, active persistent modifiers,
/// the deferred mutation queues, and the downstream event queues.
#[derive(Clone, Debug, Default)]
pub struct DicePool {
    pool: ArrayVec<Die, { EngineConfig::MAX_DICE }>,
    hand: ArrayVec<Die, { EngineConfig::MAX_DICE }>,
    modifiers: Vec<PersistentModifier>,

    /// Pool indices queued for permanent removal at end of turn.
    destroy_queue: Vec<usize>,

    /// Pool indices queued for duplication at end of turn.
    duplicate_queue: Vec<usize>,

    combat_events: Vec<CombatEvent>,
    mana_events: Vec<ManaEvent>,

    used_slots: ArrayVec<usize, { EngineConfig::MAX_DICE }>,
    element_used: [u32; Element::COUNT],
    original_hand_size: u32,
    turn: u32,

    /// External state mirrored in for mana/status-gated conditions.
    player_mana: u32,
    active_statuses: ArrayVec<StatusKind, { EngineConfig::MAX_STATUS_EFFECTS }>,

    game_seed: u64,
    nonce: u64,
    next_id: u32,
    in_combat: bool,
}

impl DicePool {
    /// Creates an empty pool rolling from `game_seed`.
    pub fn new(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::default()
        }
    }

    // ========================================================================
    // Pool building
    // ========================================================================

    /// Adds a die template to the pool, assigning its identity.
    pub fn add_template(&mut self, mut die: Die) -> Result<DieId, PoolError> {
        if self.pool.is_full() {
            return Err(PoolError::PoolFull);
        }
        let id = self.fresh_id();
        die.id = id;
        die.source = id;
        die.slot_index = self.pool.len();
        self.pool.push(die);
        Ok(id)
    }

    fn fresh_id(&mut self) -> DieId {
        let id = DieId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts a combat: clears per-combat state and runs the OnCombatStart
    /// pass over the pool. Modifiers materialized by combat-start rules are
    /// stored and will shape every hand rolled this combat.
    pub fn start_combat(&mut self, rng: &dyn RngOracle) -> ProcessOutcome {
        self.in_combat = true;
        self.turn = 0;
        self.modifiers.clear();
        self.destroy_queue.clear();
        self.duplicate_queue.clear();
        self.combat_events.clear();
        self.mana_events.clear();
        self.hand.clear();

        self.run_pass(rng, RuleTrigger::OnCombatStart, PassScope::Pool, None)
    }

    /// Rolls a fresh hand for a new turn.
    ///
    /// Order of operations: the pool-level Passive pass runs first, then the
    /// pool is copied into a hand and rolled, then active persistent
    /// modifiers apply, then the OnRoll pass fires.
    pub fn roll_hand(&mut self, rng: &dyn RngOracle) -> ProcessOutcome {
        self.turn += 1;
        self.used_slots.clear();
        self.element_used = [0; Element::COUNT];

        let mut outcome = self.run_pass(rng, RuleTrigger::Passive, PassScope::Pool, None);

        // Copy pool -> hand and roll each die.
        self.nonce += 1;
        self.hand.clear();
        for slot in 0..self.pool.len() {
            let instance_id = self.fresh_id();
            let mut die = self.pool[slot].instantiate(instance_id, slot);
            let seed = compute_seed(self.game_seed, self.nonce, die.id.0, 0);
            die.roll(rng, seed);
            self.hand.push(die);
        }
        self.original_hand_size = self.hand.len() as u32;

        // Persistent modifiers shape the fresh hand before any OnRoll rule
        // reads it.
        for modifier in &self.modifiers {
            for (slot, die) in self.hand.iter_mut().enumerate() {
                if modifier.applies_to(slot, die) {
                    modifier.apply_to(die);
                }
            }
        }

        outcome.absorb(self.run_pass(rng, RuleTrigger::OnRoll, PassScope::Hand, None));
        outcome
    }

    /// Spends the die at `slot` and runs its OnUse rules against the hand.
    ///
    /// The die is marked consumed in place - the hand never shrinks
    /// mid-turn, keeping positions stable for neighbor targeting.
    pub fn use_die(&mut self, slot: usize, rng: &dyn RngOracle) -> Result<ProcessOutcome, PoolError> {
        let len = self.hand.len();
        let die = self
            .hand
            .get_mut(slot)
            .ok_or(PoolError::SlotOutOfRange { slot, len })?;
        if die.consumed {
            return Err(PoolError::AlreadyConsumed { slot });
        }

        die.consumed = true;
        let element = die.effective_element();
        self.used_slots.push(slot);
        self.element_used[element.index()] += 1;

        Ok(self.run_pass(rng, RuleTrigger::OnUse, PassScope::Hand, Some(slot)))
    }

    /// Spends a player reroll charge on the die at `slot`.
    pub fn reroll_die(&mut self, slot: usize, rng: &dyn RngOracle) -> Result<(), PoolError> {
        let len = self.hand.len();
        self.nonce += 1;
        let nonce = self.nonce;
        let game_seed = self.game_seed;

        let die = self
            .hand
            .get_mut(slot)
            .ok_or(PoolError::SlotOutOfRange { slot, len })?;
        if die.consumed {
            return Err(PoolError::AlreadyConsumed { slot });
        }
        if die.locked {
            return Err(PoolError::DieLocked { slot });
        }
        if die.reroll_charges == 0 {
            return Err(PoolError::NoRerollCharges { slot });
        }

        die.reroll_charges -= 1;
        let seed = compute_seed(game_seed, nonce, die.id.0, 0);
        die.roll(rng, seed);

        // Re-shape the rerolled die; reroll grants are deliberately not
        // reapplied, or a single grant would fund unlimited rerolls.
        for modifier in &self.modifiers {
            if matches!(modifier.kind, ModifierKind::GrantReroll) {
                continue;
            }
            let die = &mut self.hand[slot];
            if modifier.applies_to(slot, die) {
                modifier.apply_to(die);
            }
        }
        Ok(())
    }

    /// Shatters the die at `slot`: forced to zero and marked consumed, but
    /// not counted as *used* for turn counters.
    pub fn shatter_die(&mut self, slot: usize) -> Result<(), PoolError> {
        let len = self.hand.len();
        let die = self
            .hand
            .get_mut(slot)
            .ok_or(PoolError::SlotOutOfRange { slot, len })?;
        die.shatter();
        Ok(())
    }

    /// Inserts an already-rolled die into the hand mid-combat.
    ///
    /// Only the affected rules are reprocessed: the new die's own OnRoll
    /// rules, plus neighbor-dependent OnRoll rules of the dice adjacent to
    /// it. The rest of the hand has already fired this turn.
    pub fn insert_rolled_die(
        &mut self,
        mut die: Die,
        rng: &dyn RngOracle,
    ) -> Result<usize, PoolError> {
        if self.hand.is_full() {
            return Err(PoolError::PoolFull);
        }
        let slot = self.hand.len();
        die.id = self.fresh_id();
        die.slot_index = slot;

        for modifier in &self.modifiers {
            if modifier.applies_to(slot, &die) {
                modifier.apply_to(&mut die);
            }
        }
        self.hand.push(die);

        self.nonce += 1;
        let ctx = self.context(None);
        let processor = Processor::new(rng, self.game_seed);
        let outcome = processor.process_insertion(&mut self.hand, slot, &ctx);
        self.consume_outcome(&outcome, PassScope::Hand);
        Ok(slot)
    }

    /// Reorders the pool and runs the OnReorder pass over it.
    pub fn reorder_pool(
        &mut self,
        order: &[usize],
        rng: &dyn RngOracle,
    ) -> Result<ProcessOutcome, PoolError> {
        let len = self.pool.len();
        if order.len() != len {
            return Err(PoolError::InvalidReorder);
        }
        let mut seen = [false; EngineConfig::MAX_DICE];
        for &index in order {
            if index >= len || seen[index] {
                return Err(PoolError::InvalidReorder);
            }
            seen[index] = true;
        }

        let old: Vec<Die> = self.pool.drain(..).collect();
        let mut reclaimed: Vec<Option<Die>> = old.into_iter().map(Some).collect();
        for &index in order {
            let die = reclaimed[index].take().expect("indices verified unique");
            self.pool.push(die);
        }
        reindex(&mut self.pool);

        Ok(self.run_pass(rng, RuleTrigger::OnReorder, PassScope::Pool, None))
    }

    /// Ends the turn: ticks modifier durations, then applies the deferred
    /// duplication and destruction queues to the pool.
    ///
    /// Removals are applied in descending index order so earlier removals
    /// cannot shift the indices of pending later ones. The spent hand stays
    /// in place until the next roll discards it.
    pub fn end_turn(&mut self) {
        self.nonce += 1;

        // Modifiers never expire mid-turn; this is the only tick point.
        for modifier in &mut self.modifiers {
            modifier.tick_turn();
        }
        self.modifiers.retain(|m| !m.is_expired());

        // Duplicates append, so existing indices stay valid for removal.
        let duplicates = core::mem::take(&mut self.duplicate_queue);
        for pool_index in duplicates {
            let Some(template) = self.pool.get(pool_index) else {
                continue;
            };
            if self.pool.is_full() {
                break;
            }
            let mut copy = template.clone();
            copy.from_duplicate = true;
            let id = self.fresh_id();
            copy.id = id;
            copy.source = id;
            self.pool.push(copy);
        }

        let mut removals = core::mem::take(&mut self.destroy_queue);
        removals.sort_unstable_by(|a, b| b.cmp(a));
        removals.dedup();
        for pool_index in removals {
            if pool_index < self.pool.len() {
                self.pool.remove(pool_index);
            }
        }
        reindex(&mut self.pool);
    }

    /// Ends the combat: runs the OnCombatEnd pass over the pool and drops
    /// all persistent modifiers and the spent hand.
    pub fn end_combat(&mut self, rng: &dyn RngOracle) -> ProcessOutcome {
        let outcome = self.run_pass(rng, RuleTrigger::OnCombatEnd, PassScope::Pool, None);
        self.modifiers.clear();
        self.hand.clear();
        self.in_combat = false;
        outcome
    }

    // ========================================================================
    // Processing plumbing
    // ========================================================================

    fn run_pass(
        &mut self,
        rng: &dyn RngOracle,
        trigger: RuleTrigger,
        scope: PassScope,
        trigger_slot: Option<usize>,
    ) -> ProcessOutcome {
        self.nonce += 1;
        let ctx = self.context(trigger_slot);
        let processor = Processor::new(rng, self.game_seed);
        let outcome = match scope {
            PassScope::Pool => processor.process(&mut self.pool, trigger, &ctx),
            PassScope::Hand => processor.process(&mut self.hand, trigger, &ctx),
        };
        self.consume_outcome(&outcome, scope);
        outcome
    }

    /// Mirrors external player state in for mana/status-gated conditions.
    ///
    /// Call whenever mana or statuses change; conditions read the values
    /// captured at the start of the next pass.
    pub fn set_combat_state(&mut self, mana: u32, statuses: &[StatusKind]) {
        self.player_mana = mana;
        self.active_statuses.clear();
        for &status in statuses.iter().take(EngineConfig::MAX_STATUS_EFFECTS) {
            self.active_statuses.push(status);
        }
    }

    /// Builds the read-only context snapshot for one pass.
    fn context(&self, trigger_slot: Option<usize>) -> ProcessingContext {
        ProcessingContext {
            trigger_slot,
            used_count: self.used_slots.len() as u32,
            used_slots: self.used_slots.clone(),
            original_hand_size: self.original_hand_size,
            turn: self.turn,
            element_used: self.element_used,
            modifier_count: self.modifiers.len() as u32,
            player_mana: self.player_mana,
            active_statuses: self.active_statuses.clone(),
            nonce: self.nonce,
        }
    }

    /// Routes an outcome's structural requests and accumulates its events.
    fn consume_outcome(&mut self, outcome: &ProcessOutcome, scope: PassScope) {
        for special in &outcome.specials {
            match special {
                SpecialRequest::CreateModifier(modifier) => {
                    if self.modifiers.len() < EngineConfig::MAX_MODIFIERS {
                        self.modifiers.push(modifier.clone());
                    }
                }
                SpecialRequest::DuplicateDie { slot } => {
                    if let Some(pool_index) = self.pool_index_for(*slot, scope) {
                        self.duplicate_queue.push(pool_index);
                    }
                }
                SpecialRequest::DestroyDie { slot } => {
                    if let Some(pool_index) = self.pool_index_for(*slot, scope) {
                        self.destroy_queue.push(pool_index);
                    }
                }
                // Already applied in place during dispatch; journal only.
                SpecialRequest::LockDie { .. }
                | SpecialRequest::GrantReroll { .. }
                | SpecialRequest::ForcedRoll { .. } => {}
            }
        }

        self.combat_events.extend(outcome.combat_events.iter().cloned());
        self.mana_events.extend(outcome.mana_events.iter().cloned());
    }

    /// Maps a pass-scoped slot to a pool index.
    fn pool_index_for(&self, slot: usize, scope: PassScope) -> Option<usize> {
        match scope {
            PassScope::Pool => (slot < self.pool.len()).then_some(slot),
            PassScope::Hand => {
                let source = self.hand.get(slot)?.source;
                self.pool.iter().position(|template| template.id == source)
            }
        }
    }

    // ========================================================================
    // Queries and draining
    // ========================================================================

    /// The rolled hand, in slot order.
    pub fn hand(&self) -> &[Die] {
        &self.hand
    }

    /// The persistent pool, in slot order.
    pub fn pool(&self) -> &[Die] {
        &self.pool
    }

    /// Active persistent modifiers.
    pub fn modifiers(&self) -> &[PersistentModifier] {
        &self.modifiers
    }

    /// Number of hand dice not yet consumed.
    pub fn unconsumed_count(&self) -> usize {
        self.hand.iter().filter(|die| !die.consumed).count()
    }

    /// Current turn number (1-based once rolled).
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// True between `start_combat` and `end_combat`.
    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    /// Takes all queued combat events for the external resolver.
    pub fn drain_combat_events(&mut self) -> Vec<CombatEvent> {
        core::mem::take(&mut self.combat_events)
    }

    /// Takes all queued mana events for the external resolver.
    pub fn drain_mana_events(&mut self) -> Vec<ManaEvent> {
        core::mem::take(&mut self.mana_events)
    }
}

/// Restores the position invariant after membership or order changes.
fn reindex(dice: &mut [Die]) {
    for (slot, die) in dice.iter_mut().enumerate() {
        die.slot_index = slot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::DieSize;
    use crate::rng::FixedRng;
    use crate::rules::{
        AffixRule, EffectKind, EffectSpec, PositionRequirement, RuleTrigger, TargetSpec,
    };

    fn template(size: DieSize, element: Element) -> Die {
        Die::new(DieId(0), size, element)
    }

    fn pool_of(n: usize) -> DicePool {
        let mut pool = DicePool::new(99);
        for _ in 0..n {
            pool.add_template(template(DieSize::D6, Element::Fire)).unwrap();
        }
        pool
    }

    #[test]
    fn ghost_hand_keeps_positions_stable() {
        let rng = FixedRng(3);
        let mut pool = pool_of(3);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);

        assert_eq!(pool.hand().len(), 3);
        pool.use_die(1, &rng).unwrap();

        assert_eq!(pool.hand().len(), 3);
        assert!(pool.hand()[1].consumed);
        assert!(!pool.hand()[0].consumed);
        assert!(!pool.hand()[2].consumed);
        assert_eq!(pool.unconsumed_count(), 2);
    }

    #[test]
    fn using_a_consumed_die_is_rejected() {
        let rng = FixedRng(3);
        let mut pool = pool_of(1);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);
        pool.use_die(0, &rng).unwrap();
        assert_eq!(
            pool.use_die(0, &rng),
            Err(PoolError::AlreadyConsumed { slot: 0 })
        );
    }

    #[test]
    fn slot_indices_match_offsets_after_every_pass() {
        let rng = FixedRng(3);
        let mut pool = pool_of(4);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);

        for (offset, die) in pool.hand().iter().enumerate() {
            assert_eq!(die.slot_index, offset);
        }
        for (offset, die) in pool.pool().iter().enumerate() {
            assert_eq!(die.slot_index, offset);
        }
    }

    #[test]
    fn deferred_destruction_applies_at_end_of_turn() {
        let rng = FixedRng(3);
        let mut pool = DicePool::new(99);
        for slot in 0..4 {
            let mut die = template(DieSize::D6, Element::Fire);
            if slot == 1 || slot == 3 {
                die = die.with_rule(AffixRule::single(
                    "burn_out",
                    RuleTrigger::OnUse,
                    EffectSpec::with_amount(EffectKind::DestroySelf, 0),
                ));
            }
            pool.add_template(die).unwrap();
        }

        pool.start_combat(&rng);
        pool.roll_hand(&rng);
        pool.use_die(1, &rng).unwrap();
        pool.use_die(3, &rng).unwrap();

        // Ghost hand: nothing shrinks mid-turn.
        assert_eq!(pool.pool().len(), 4);
        assert_eq!(pool.hand().len(), 4);

        pool.end_turn();

        assert_eq!(pool.pool().len(), 2);
        for (offset, die) in pool.pool().iter().enumerate() {
            assert_eq!(die.slot_index, offset);
        }
    }

    #[test]
    fn combat_start_modifier_survives_rerolls() {
        let rng = FixedRng(3); // every roll lands on (3 % 6) + 1 = 4
        let mut pool = pool_of(2);
        // Third template blesses itself at combat start.
        pool.add_template(
            template(DieSize::D6, Element::Fire).with_rule(
                AffixRule::single(
                    "opening_blessing",
                    RuleTrigger::OnCombatStart,
                    EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
                )
                .at(PositionRequirement::Slot(2)),
            ),
        )
        .unwrap();

        pool.start_combat(&rng);
        assert_eq!(pool.modifiers().len(), 1);

        pool.roll_hand(&rng);
        assert_eq!(pool.hand()[2].total_value(), 6); // 4 + 2
        assert_eq!(pool.hand()[0].total_value(), 4);

        pool.end_turn();
        pool.roll_hand(&rng);
        assert_eq!(pool.hand()[2].total_value(), 6); // still there next turn
    }

    #[test]
    fn duplicate_on_max_grows_the_pool_next_turn() {
        let rng = FixedRng(5); // (5 % 6) + 1 = 6: always max on a d6
        let mut pool = DicePool::new(99);
        pool.add_template(template(DieSize::D6, Element::Fire).with_rule(
            AffixRule::single(
                "split_on_max",
                RuleTrigger::OnRoll,
                EffectSpec::with_amount(EffectKind::DuplicateOnMax, 0),
            ),
        ))
        .unwrap();

        pool.start_combat(&rng);
        pool.roll_hand(&rng);
        assert_eq!(pool.pool().len(), 1);

        pool.end_turn();
        assert_eq!(pool.pool().len(), 2);
        assert!(pool.pool()[1].from_duplicate);

        // The duplicate rolls max too, but never duplicates again.
        pool.roll_hand(&rng);
        pool.end_turn();
        assert_eq!(pool.pool().len(), 3); // only the original split again
    }

    #[test]
    fn element_usage_counters_accumulate() {
        let rng = FixedRng(3);
        let mut pool = DicePool::new(99);
        pool.add_template(template(DieSize::D6, Element::Fire)).unwrap();
        pool.add_template(template(DieSize::D6, Element::Frost)).unwrap();
        pool.start_combat(&rng);
        pool.roll_hand(&rng);

        pool.use_die(0, &rng).unwrap();
        pool.use_die(1, &rng).unwrap();

        let ctx = pool.context(None);
        assert_eq!(ctx.used_count, 2);
        assert_eq!(ctx.element_used[Element::Fire.index()], 1);
        assert_eq!(ctx.element_used[Element::Frost.index()], 1);

        // Counters reset with the next hand.
        pool.end_turn();
        pool.roll_hand(&rng);
        let ctx = pool.context(None);
        assert_eq!(ctx.used_count, 0);
    }

    #[test]
    fn shatter_consumes_without_counting_as_used() {
        let rng = FixedRng(3);
        let mut pool = pool_of(2);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);

        pool.shatter_die(0).unwrap();

        assert_eq!(pool.hand()[0].total_value(), 0);
        assert!(pool.hand()[0].consumed);
        assert_eq!(pool.unconsumed_count(), 1);
        assert_eq!(pool.context(None).used_count, 0);
    }

    #[test]
    fn reroll_requires_a_charge_and_respects_locks() {
        let rng = FixedRng(3);
        let mut pool = pool_of(1);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);

        assert_eq!(
            pool.reroll_die(0, &rng),
            Err(PoolError::NoRerollCharges { slot: 0 })
        );

        pool.hand[0].reroll_charges = 1;
        pool.hand[0].locked = true;
        assert_eq!(pool.reroll_die(0, &rng), Err(PoolError::DieLocked { slot: 0 }));

        pool.hand[0].locked = false;
        pool.reroll_die(0, &rng).unwrap();
        assert_eq!(pool.hand()[0].reroll_charges, 0);
    }

    #[test]
    fn reorder_validates_permutations() {
        let rng = FixedRng(3);
        let mut pool = pool_of(3);

        assert_eq!(
            pool.reorder_pool(&[0, 0, 1], &rng),
            Err(PoolError::InvalidReorder)
        );
        assert_eq!(pool.reorder_pool(&[0, 1], &rng), Err(PoolError::InvalidReorder));

        let ids: Vec<DieId> = pool.pool().iter().map(|d| d.id).collect();
        pool.reorder_pool(&[2, 0, 1], &rng).unwrap();
        let reordered: Vec<DieId> = pool.pool().iter().map(|d| d.id).collect();
        assert_eq!(reordered, vec![ids[2], ids[0], ids[1]]);
        for (offset, die) in pool.pool().iter().enumerate() {
            assert_eq!(die.slot_index, offset);
        }
    }

    #[test]
    fn inserted_die_joins_at_the_end_with_modifiers_applied() {
        let rng = FixedRng(3);
        let mut pool = pool_of(2);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);

        let mut incoming = template(DieSize::D8, Element::Storm);
        incoming.force_value(7);
        let slot = pool.insert_rolled_die(incoming, &rng).unwrap();

        assert_eq!(slot, 2);
        assert_eq!(pool.hand().len(), 3);
        assert_eq!(pool.hand()[2].slot_index, 2);
        assert_eq!(pool.hand()[2].total_value(), 7);
    }

    #[test]
    fn events_drain_once() {
        let rng = FixedRng(3);
        let mut pool = DicePool::new(99);
        pool.add_template(template(DieSize::D6, Element::Fire).with_rule(
            AffixRule::single(
                "spark",
                RuleTrigger::OnUse,
                EffectSpec::with_amount(EffectKind::EmitBonusDamage, 3),
            )
            .targeting(TargetSpec::SelfSlot),
        ))
        .unwrap();

        pool.start_combat(&rng);
        pool.roll_hand(&rng);
        pool.use_die(0, &rng).unwrap();

        let events = pool.drain_combat_events();
        assert_eq!(events.len(), 1);
        assert!(pool.drain_combat_events().is_empty());
    }

    #[test]
    fn end_combat_clears_modifiers_and_hand() {
        let rng = FixedRng(3);
        let mut pool = pool_of(2);
        pool.start_combat(&rng);
        pool.roll_hand(&rng);
        pool.end_combat(&rng);

        assert!(pool.hand().is_empty());
        assert!(pool.modifiers().is_empty());
        assert!(!pool.in_combat());
    }
}
