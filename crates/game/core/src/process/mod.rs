//! Trigger processing: the two-phase, snapshot-then-apply engine.
//!
//! The [`Processor`] is the authoritative interpreter for affix rules. One
//! invocation runs a single trigger pass over an ordered sequence of dice:
//!
//! 1. *Collection phase* - walk the sequence once in slot order against
//!    pre-pass state, checking triggers, positions and conditions, resolving
//!    targets, and recording ordered activations. Nothing mutates.
//! 2. *Application phase* - replay the activations in collection order,
//!    resolving each magnitude against *live* state and dispatching to the
//!    effect handler. Effects applied earlier in the pass visibly influence
//!    later magnitudes; this ordering is a correctness contract.
//!
//! The sequence never changes length during a pass: duplication, destruction
//! and modifier creation are queued on the outcome and applied by the owning
//! collection between passes.

mod apply;
mod collect;
mod compound;
mod context;
mod events;
mod outcome;

pub use context::ProcessingContext;
pub use events::{CombatEvent, ManaEvent};
pub use outcome::{DieChange, DieFields, ProcessOutcome, SpecialRequest, TagChange};

use crate::die::Die;
use crate::rng::RngOracle;
use crate::rules::{RuleBody, RuleTrigger};

use apply::{EffectScope, PassState, apply_spec};
use collect::Activation;

/// Evaluates affix rules over an ordered sequence of dice.
///
/// Holds no die state: the sequence is an arena passed into every call, and
/// all internal bookkeeping is per-invocation. The RNG oracle plus the game
/// seed make reroll effects deterministic and replayable.
pub struct Processor<'a> {
    rng: &'a dyn RngOracle,
    game_seed: u64,
}

impl<'a> Processor<'a> {
    /// Creates a processor drawing reroll seeds from `game_seed`.
    pub fn new(rng: &'a dyn RngOracle, game_seed: u64) -> Self {
        Self { rng, game_seed }
    }

    /// Runs one trigger pass over the sequence.
    ///
    /// Mutates dice in place and returns the outcome journal plus every
    /// queued structural request and downstream event. Never fails: a
    /// malformed rule degrades to a no-op, it does not block others.
    pub fn process(
        &self,
        dice: &mut [Die],
        trigger: RuleTrigger,
        ctx: &ProcessingContext,
    ) -> ProcessOutcome {
        let activations = collect::collect_activations(dice, trigger, ctx);
        self.apply_activations(dice, trigger, ctx, &activations)
    }

    /// Reprocesses a mid-combat insertion at `new_index`.
    ///
    /// The rest of the hand was already processed this turn, so only the new
    /// die's own OnRoll rules fire, plus the neighbor-dependent OnRoll rules
    /// of the dice adjacent to it.
    pub fn process_insertion(
        &self,
        dice: &mut [Die],
        new_index: usize,
        ctx: &ProcessingContext,
    ) -> ProcessOutcome {
        let activations = collect::collect_insertion_activations(dice, new_index, ctx);
        self.apply_activations(dice, RuleTrigger::OnRoll, ctx, &activations)
    }

    fn apply_activations(
        &self,
        dice: &mut [Die],
        trigger: RuleTrigger,
        ctx: &ProcessingContext,
        activations: &[Activation],
    ) -> ProcessOutcome {
        let len_before = dice.len();
        let mut state = PassState::new(self.rng, self.game_seed, trigger, ctx);

        for activation in activations {
            // Rules are cloned out of the arena so the dispatcher can borrow
            // the dice mutably; rules are immutable data, only their position
            // in the arena matters.
            let Some(rule) = dice
                .get(activation.owner)
                .and_then(|die| die.rules.get(activation.rule_index))
                .cloned()
            else {
                continue;
            };

            match &rule.body {
                RuleBody::Single(spec) => {
                    let scope = EffectScope {
                        owner: activation.owner,
                        targets: &activation.targets,
                        multiplier_percent: activation.multiplier_percent,
                        min_magnitude: rule.min_magnitude,
                        rule_name: &rule.name,
                        rule_target: rule.target,
                        snapshot: None,
                        parent_target: None,
                        value_slot: None,
                    };
                    apply_spec(dice, spec, &scope, &mut state);
                }
                RuleBody::Compound(subs) => {
                    compound::apply_compound(dice, &rule, subs, activation, &mut state);
                }
            }
        }

        debug_assert_eq!(
            dice.len(),
            len_before,
            "sequence length must not change during a pass"
        );
        state.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::{Die, DieId, DieSize, Element};
    use crate::modifier::{ModifierDuration, ModifierFilter, ModifierKind};
    use crate::rng::FixedRng;
    use crate::rules::{
        AffixRule, ConditionKind, ConditionRule, EffectKind, EffectSpec, RollValue, SubEffect,
        TargetSpec, ValueSource,
    };

    fn die_at(slot: usize, value: i32) -> Die {
        let mut die = Die::new(DieId(slot as u32), DieSize::D6, Element::Fire);
        die.force_value(value);
        die.slot_index = slot;
        die
    }

    fn processor(rng: &FixedRng) -> Processor<'_> {
        Processor::new(rng, 7)
    }

    #[test]
    fn on_roll_flat_bonus_applies_to_self() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3).with_rule(AffixRule::single(
                "steady_plus_two",
                RuleTrigger::OnRoll,
                EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
            )),
        ];

        let outcome = processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        assert_eq!(dice[0].total_value(), 5);
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].before, 3);
        assert_eq!(outcome.changes[0].after, 5);
    }

    #[test]
    fn copy_neighbor_value_transfers_half() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 6),
            die_at(1, 2).with_rule(
                AffixRule::single(
                    "siphon_left",
                    RuleTrigger::OnRoll,
                    EffectSpec::with_amount(EffectKind::CopyNeighborValue { percent: 50 }, 0),
                )
                .targeting(TargetSpec::Left),
            ),
            die_at(2, 4),
        ];

        processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        assert_eq!(dice[1].total_value(), 5); // 2 + 50% of 6
        assert_eq!(dice[0].total_value(), 6); // the neighbor only gets read
    }

    #[test]
    fn later_magnitudes_read_earlier_mutations() {
        // A's bonus lands first (slot order); B then siphons A's *live* total.
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3).with_rule(AffixRule::single(
                "steady_plus_two",
                RuleTrigger::OnRoll,
                EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
            )),
            die_at(1, 2).with_rule(
                AffixRule::single(
                    "siphon_left",
                    RuleTrigger::OnRoll,
                    EffectSpec::with_amount(EffectKind::CopyNeighborValue { percent: 100 }, 0),
                )
                .targeting(TargetSpec::Left),
            ),
        ];

        processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        assert_eq!(dice[0].total_value(), 5);
        assert_eq!(dice[1].total_value(), 7); // 2 + 5, not 2 + 3
    }

    #[test]
    fn conditions_gate_on_pre_pass_state() {
        // Rule 1 pushes the die to 6, but rule 2's gate saw the pre-pass 3.
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3)
                .with_rule(AffixRule::single(
                    "surge",
                    RuleTrigger::OnRoll,
                    EffectSpec::with_amount(EffectKind::ModifyValueFlat, 3),
                ))
                .with_rule(
                    AffixRule::single(
                        "crown_on_high",
                        RuleTrigger::OnRoll,
                        EffectSpec::with_amount(EffectKind::AddTag("crowned".into()), 0),
                    )
                    .when(ConditionRule::new(ConditionKind::SelfValueAtLeast(5))),
                ),
        ];

        processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        assert_eq!(dice[0].total_value(), 6);
        assert!(!dice[0].tags.has("crowned"));
    }

    #[test]
    fn on_use_fires_only_the_trigger_dies_rules() {
        let rng = FixedRng(0);
        let tag_rule = |name: &str| {
            AffixRule::single(
                name,
                RuleTrigger::OnUse,
                EffectSpec::with_amount(EffectKind::AddTag("spent".into()), 0),
            )
        };
        let mut dice = vec![
            die_at(0, 3).with_rule(tag_rule("a_spend")),
            die_at(1, 4).with_rule(tag_rule("b_spend")),
        ];
        dice[0].consumed = true; // the action consumed it before the pass

        let mut ctx = ProcessingContext::empty();
        ctx.trigger_slot = Some(0);
        ctx.used_count = 1;

        processor(&rng).process(&mut dice, RuleTrigger::OnUse, &ctx);

        assert!(dice[0].tags.has("spent"));
        assert!(!dice[1].tags.has("spent"));
    }

    #[test]
    fn consumed_dice_do_not_own_activations() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3).with_rule(AffixRule::single(
                "ghost_bonus",
                RuleTrigger::OnRoll,
                EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
            )),
        ];
        dice[0].consumed = true;

        processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        assert_eq!(dice[0].total_value(), 3);
    }

    #[test]
    fn consumed_dice_remain_valid_targets() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3),
            die_at(1, 2).with_rule(
                AffixRule::single(
                    "bless_left",
                    RuleTrigger::OnUse,
                    EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
                )
                .targeting(TargetSpec::Left),
            ),
        ];
        dice[0].consumed = true;
        dice[1].consumed = true;

        let mut ctx = ProcessingContext::empty();
        ctx.trigger_slot = Some(1);

        processor(&rng).process(&mut dice, RuleTrigger::OnUse, &ctx);

        assert_eq!(dice[0].total_value(), 5);
    }

    #[test]
    fn scaling_condition_multiplies_magnitude() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3).with_rule(
                AffixRule::single(
                    "momentum_damage",
                    RuleTrigger::OnUse,
                    EffectSpec::with_amount(EffectKind::EmitBonusDamage, 3),
                )
                .when(ConditionRule::new(ConditionKind::PerDieUsed)),
            ),
        ];
        dice[0].consumed = true;

        let mut ctx = ProcessingContext::empty();
        ctx.trigger_slot = Some(0);
        ctx.used_count = 2;

        let outcome = processor(&rng).process(&mut dice, RuleTrigger::OnUse, &ctx);

        assert_eq!(
            outcome.combat_events,
            vec![CombatEvent::BonusDamage { slot: 0, amount: 6 }]
        );
    }

    #[test]
    fn combat_start_value_mods_materialize_modifiers() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 0),
            die_at(1, 0),
            die_at(2, 0).with_rule(AffixRule::single(
                "opening_blessing",
                RuleTrigger::OnCombatStart,
                EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
            )),
        ];

        let outcome =
            processor(&rng).process(&mut dice, RuleTrigger::OnCombatStart, &ProcessingContext::empty());

        // Nothing mutated in place.
        assert!(dice.iter().all(|d| d.total_value() == 0));
        assert_eq!(outcome.specials.len(), 1);
        match &outcome.specials[0] {
            SpecialRequest::CreateModifier(modifier) => {
                assert_eq!(modifier.kind, ModifierKind::Flat(2));
                assert_eq!(modifier.duration, ModifierDuration::Combat);
                assert_eq!(modifier.filter, ModifierFilter::SpecificSlot(2));
                assert_eq!(modifier.source, "opening_blessing");
            }
            other => panic!("expected CreateModifier, got {other:?}"),
        }
    }

    #[test]
    fn compound_swap_is_order_independent() {
        let swap_subs = |flipped: bool| {
            let set_to_right = SubEffect::new(EffectSpec::sourced(
                EffectKind::SetRollValue(RollValue::FromSource),
                ValueSource::SnapshotTargetValue,
                0,
            ))
            .targeting(TargetSpec::SelfSlot)
            .reading(TargetSpec::Right);
            let set_right_to_self = SubEffect::new(EffectSpec::sourced(
                EffectKind::SetRollValue(RollValue::FromSource),
                ValueSource::SnapshotTargetValue,
                0,
            ))
            .targeting(TargetSpec::Right)
            .reading(TargetSpec::SelfSlot);
            if flipped {
                vec![set_right_to_self, set_to_right]
            } else {
                vec![set_to_right, set_right_to_self]
            }
        };

        for flipped in [false, true] {
            let rng = FixedRng(0);
            let mut dice = vec![
                die_at(0, 2).with_rule(AffixRule::compound(
                    "twin_swap",
                    RuleTrigger::OnRoll,
                    swap_subs(flipped),
                )),
                die_at(1, 5),
            ];

            processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

            assert_eq!(
                (dice[0].total_value(), dice[1].total_value()),
                (5, 2),
                "swap must hold with flipped={flipped}"
            );
        }
    }

    #[test]
    fn least_used_element_breaks_ties_in_declaration_order() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 3).with_rule(AffixRule::single(
                "attune",
                RuleTrigger::OnRoll,
                EffectSpec::with_amount(
                    EffectKind::SetElement(crate::rules::ElementChoice::LeastUsed),
                    0,
                ),
            )),
        ];

        let mut ctx = ProcessingContext::empty();
        ctx.element_used[Element::Fire.index()] = 2;
        ctx.element_used[Element::Frost.index()] = 1;
        // Storm, Venom, Radiant, Umbral all sit at zero; Storm is declared first.

        processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ctx);

        assert_eq!(dice[0].element, Element::Storm);
    }

    #[test]
    fn duplicate_on_max_skips_duplicates() {
        let rng = FixedRng(0);
        let rule = AffixRule::single(
            "split_on_max",
            RuleTrigger::OnRoll,
            EffectSpec::with_amount(EffectKind::DuplicateOnMax, 0),
        );

        let mut dice = vec![die_at(0, 0).with_rule(rule.clone())];
        dice[0].force_value(6);
        let outcome = processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());
        assert_eq!(
            outcome.specials,
            vec![SpecialRequest::DuplicateDie { slot: 0 }]
        );

        let mut copies = vec![die_at(0, 0).with_rule(rule)];
        copies[0].force_value(6);
        copies[0].from_duplicate = true;
        let outcome = processor(&rng).process(&mut copies, RuleTrigger::OnRoll, &ProcessingContext::empty());
        assert!(outcome.specials.is_empty());
    }

    #[test]
    fn magnitude_floor_lifts_small_results() {
        let rng = FixedRng(0);
        let mut dice = vec![
            die_at(0, 1).with_rule(
                AffixRule::single(
                    "ember_burst",
                    RuleTrigger::OnRoll,
                    EffectSpec::sourced(
                        EffectKind::EmitBonusDamage,
                        ValueSource::SelfValueFraction,
                        50,
                    ),
                )
                .floored(2),
            ),
        ];

        let outcome = processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        // 50% of 1 rounds to 1; the floor lifts it to 2.
        assert_eq!(
            outcome.combat_events,
            vec![CombatEvent::BonusDamage { slot: 0, amount: 2 }]
        );
    }

    #[test]
    fn insertion_reruns_only_affected_rules() {
        let rng = FixedRng(0);
        let mut dice = vec![
            // Slot 0: self-contained rule, already ran this turn - must not rerun.
            die_at(0, 3).with_rule(AffixRule::single(
                "steady_plus_two",
                RuleTrigger::OnRoll,
                EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
            )),
            // Slot 1: neighbor-dependent rule - must rerun when slot 2 appears.
            die_at(1, 2).with_rule(
                AffixRule::single(
                    "siphon_right",
                    RuleTrigger::OnRoll,
                    EffectSpec::with_amount(EffectKind::CopyNeighborValue { percent: 100 }, 0),
                )
                .targeting(TargetSpec::Right),
            ),
        ];
        // Simulate the original pass having run.
        dice[0].force_value(5);

        // The inserted die arrives rolled, with its own OnRoll rule.
        dice.push(die_at(2, 4).with_rule(AffixRule::single(
            "fresh_plus_one",
            RuleTrigger::OnRoll,
            EffectSpec::with_amount(EffectKind::ModifyValueFlat, 1),
        )));

        processor(&rng).process_insertion(&mut dice, 2, &ProcessingContext::empty());

        assert_eq!(dice[0].total_value(), 5); // untouched
        // Slot order holds during reprocessing: the neighbor rule at slot 1
        // reads the inserted die before its own +1 lands.
        assert_eq!(dice[1].total_value(), 6); // 2 + 4
        assert_eq!(dice[2].total_value(), 5); // own rule ran: 4 + 1
    }

    #[test]
    fn unresolvable_targets_never_block_other_rules() {
        let rng = FixedRng(0);
        let mut dice = vec![
            // Left neighbor of slot 0 does not exist; the rule is a no-op.
            die_at(0, 3)
                .with_rule(
                    AffixRule::single(
                        "siphon_left",
                        RuleTrigger::OnRoll,
                        EffectSpec::with_amount(EffectKind::CopyNeighborValue { percent: 50 }, 0),
                    )
                    .targeting(TargetSpec::Left),
                )
                .with_rule(AffixRule::single(
                    "steady_plus_two",
                    RuleTrigger::OnRoll,
                    EffectSpec::with_amount(EffectKind::ModifyValueFlat, 2),
                )),
        ];

        processor(&rng).process(&mut dice, RuleTrigger::OnRoll, &ProcessingContext::empty());

        assert_eq!(dice[0].total_value(), 5);
    }
}
