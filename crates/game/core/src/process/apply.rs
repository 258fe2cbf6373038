//! Effect application - the dispatcher for the application phase.
//!
//! One activation lands here per rule that survived the collection phase.
//! Magnitudes are resolved against live die state at this point, so effects
//! applied earlier in the same pass visibly influence later ones; that
//! ordering is part of the engine contract.
//!
//! Failure policy: an unresolvable value source or an out-of-range target
//! degrades to a no-op for that single target. Nothing here aborts a pass.

use crate::die::{Die, Element};
use crate::modifier::{ModifierDuration, ModifierFilter, ModifierKind, PersistentModifier};
use crate::rng::{RngOracle, compute_seed};
use crate::rules::{
    EffectKind, EffectSpec, ElementChoice, RollValue, RuleTrigger, TargetSpec, TypeChange,
    ValueInputs, apply_magnitude_floor, mul_percent,
};

use super::context::ProcessingContext;
use super::events::{CombatEvent, ManaEvent};
use super::outcome::{DieFields, ProcessOutcome, SpecialRequest};

/// Mutable per-pass machinery threaded through every activation.
pub(super) struct PassState<'a> {
    pub rng: &'a dyn RngOracle,
    pub game_seed: u64,
    pub trigger: RuleTrigger,
    pub ctx: &'a ProcessingContext,
    /// Per-pass stream counter so each in-pass reroll draws a fresh seed.
    pub stream: u32,
    pub outcome: ProcessOutcome,
}

impl<'a> PassState<'a> {
    pub(super) fn new(
        rng: &'a dyn RngOracle,
        game_seed: u64,
        trigger: RuleTrigger,
        ctx: &'a ProcessingContext,
    ) -> Self {
        Self {
            rng,
            game_seed,
            trigger,
            ctx,
            stream: 0,
            outcome: ProcessOutcome::new(),
        }
    }

    fn next_seed(&mut self, die_id: u32) -> u64 {
        let seed = compute_seed(self.game_seed, self.ctx.nonce, die_id, self.stream);
        self.stream = self.stream.wrapping_add(1);
        seed
    }
}

/// Everything one effect application needs to know about the rule it came
/// from. Compound sub-effects get their own scope per sub-effect, carrying
/// the shared snapshot.
pub(super) struct EffectScope<'a> {
    /// Slot of the owning die.
    pub owner: usize,

    /// Resolved target slots, in resolution order.
    pub targets: &'a [usize],

    /// Combined scaling multiplier from the rule's (and sub-effect's)
    /// conditions, in percent.
    pub multiplier_percent: i32,

    /// Rule-level floor on the magnitude's absolute value.
    pub min_magnitude: Option<i32>,

    /// Name of the rule, used as modifier source label.
    pub rule_name: &'a str,

    /// The target spec the slots were resolved from (drives the shape of
    /// materialized modifiers).
    pub rule_target: TargetSpec,

    /// Compound snapshot of per-slot totals, if inside a compound rule.
    pub snapshot: Option<&'a [i32]>,

    /// The parent rule's resolved target (compound sub-effects only).
    pub parent_target: Option<usize>,

    /// Value-read slot override (compound sub-effects only). When set, value
    /// sources read this slot instead of the effect target.
    pub value_slot: Option<usize>,
}

/// Resolves the magnitude for one target, or `None` to skip it.
fn magnitude(
    dice: &[Die],
    spec: &EffectSpec,
    scope: &EffectScope<'_>,
    ctx: &ProcessingContext,
    target: usize,
) -> Option<i32> {
    let inputs = ValueInputs {
        dice,
        owner: scope.owner,
        target: scope.value_slot.unwrap_or(target),
        ctx,
        snapshot: scope.snapshot,
        parent_target: scope.parent_target,
    };
    let raw = spec.value.resolve(spec.amount, &inputs)?;
    let scaled = mul_percent(raw, scope.multiplier_percent);
    Some(apply_magnitude_floor(scaled, scope.min_magnitude))
}

/// Applies one effect spec to its resolved targets.
pub(super) fn apply_spec(
    dice: &mut [Die],
    spec: &EffectSpec,
    scope: &EffectScope<'_>,
    state: &mut PassState<'_>,
) {
    // OnCombatStart value modifications survive the per-roll hand rebuild
    // only as persistent modifiers.
    if state.trigger == RuleTrigger::OnCombatStart
        && matches!(
            spec.effect,
            EffectKind::ModifyValueFlat | EffectKind::ModifyValuePercent
        )
    {
        materialize_modifier(dice, spec, scope, state);
        return;
    }

    // Effects that act once per rule rather than once per target.
    match &spec.effect {
        EffectKind::DestroySelf => {
            state
                .outcome
                .specials
                .push(SpecialRequest::DestroyDie { slot: scope.owner });
            return;
        }
        EffectKind::CreateCombatModifier(blueprint) => {
            state
                .outcome
                .specials
                .push(SpecialRequest::CreateModifier(PersistentModifier::new(
                    blueprint.kind.clone(),
                    blueprint.duration,
                    blueprint.filter.clone(),
                    scope.owner,
                    scope.rule_name,
                )));
            return;
        }
        EffectKind::CopyNeighborValue { percent } => {
            apply_neighbor_copy(dice, *percent, scope, state);
            return;
        }
        _ => {}
    }

    for &target in scope.targets {
        if target >= dice.len() {
            continue;
        }
        apply_to_target(dice, spec, scope, state, target);
    }
}

/// Transfers a percentage of each resolved neighbor's total onto the owner.
fn apply_neighbor_copy(
    dice: &mut [Die],
    percent: i32,
    scope: &EffectScope<'_>,
    state: &mut PassState<'_>,
) {
    if scope.owner >= dice.len() {
        return;
    }
    let mut transfer = 0i32;
    for &target in scope.targets {
        let Some(neighbor) = dice.get(target) else {
            continue;
        };
        transfer += mul_percent(neighbor.total_value(), percent);
    }
    let scaled = mul_percent(transfer, scope.multiplier_percent);
    let gained = apply_magnitude_floor(scaled, scope.min_magnitude);
    if gained == 0 {
        return;
    }
    let die = &mut dice[scope.owner];
    let before = die.total_value();
    die.apply_flat(gained);
    state
        .outcome
        .record(scope.owner, DieFields::VALUE, before, die.total_value());
}

fn apply_to_target(
    dice: &mut [Die],
    spec: &EffectSpec,
    scope: &EffectScope<'_>,
    state: &mut PassState<'_>,
    target: usize,
) {
    let Some(mag) = magnitude(dice, spec, scope, state.ctx, target) else {
        return;
    };
    let owner_tags: Vec<String> = dice[scope.owner].tags.iter().map(str::to_owned).collect();

    let die = &mut dice[target];
    let before = die.total_value();

    match &spec.effect {
        // ====================================================================
        // Value
        // ====================================================================
        EffectKind::ModifyValueFlat => {
            die.apply_flat(mag);
            state
                .outcome
                .record(target, DieFields::VALUE, before, die.total_value());
        }

        EffectKind::ModifyValuePercent => {
            die.apply_percent(mag);
            state
                .outcome
                .record(target, DieFields::VALUE, before, die.total_value());
        }

        EffectKind::SetMinimum => {
            die.set_minimum(mag);
            state
                .outcome
                .record(target, DieFields::BOUNDS, before, die.total_value());
        }

        EffectKind::SetMaximum => {
            die.set_maximum(mag);
            state
                .outcome
                .record(target, DieFields::BOUNDS, before, die.total_value());
        }

        // ====================================================================
        // Tag
        // ====================================================================
        EffectKind::AddTag(tag) => {
            if die.tags.add(tag) {
                state.outcome.record_tag_added(target, tag);
            }
        }

        EffectKind::RemoveTag(tag) => {
            if die.tags.remove(tag) {
                state.outcome.record_tags_removed(target, vec![tag.clone()]);
            }
        }

        EffectKind::CopyTags => {
            for tag in &owner_tags {
                if die.tags.add(tag) {
                    state.outcome.record_tag_added(target, tag);
                }
            }
        }

        EffectKind::RemoveAllTags => {
            let removed: Vec<String> = die.tags.iter().map(str::to_owned).collect();
            die.tags.clear();
            state.outcome.record_tags_removed(target, removed);
        }

        // ====================================================================
        // Reroll
        // ====================================================================
        EffectKind::GrantReroll => {
            die.reroll_charges = die.reroll_charges.saturating_add(1);
            state
                .outcome
                .specials
                .push(SpecialRequest::GrantReroll { slot: target });
        }

        EffectKind::AutoRerollLow { threshold } => {
            if !die.locked && die.total_value() <= *threshold {
                let seed = {
                    let id = die.id.0;
                    state.next_seed(id)
                };
                let die = &mut dice[target];
                die.roll(state.rng, seed);
                state.outcome.record(
                    target,
                    DieFields::VALUE | DieFields::ROLLED,
                    before,
                    die.total_value(),
                );
            }
        }

        // ====================================================================
        // Identity
        // ====================================================================
        EffectKind::DuplicateOnMax => {
            if die.rolled_maximum() && !die.from_duplicate {
                state
                    .outcome
                    .specials
                    .push(SpecialRequest::DuplicateDie { slot: target });
            }
        }

        EffectKind::LockDie => {
            die.locked = true;
            state
                .outcome
                .record(target, DieFields::LOCKED, before, die.total_value());
            state
                .outcome
                .specials
                .push(SpecialRequest::LockDie { slot: target });
        }

        EffectKind::ChangeDieType(change) => {
            die.size = match change {
                TypeChange::To(size) => *size,
                TypeChange::Upgrade(steps) => die.size.step_up(*steps),
                TypeChange::Downgrade(steps) => die.size.step_down(*steps),
            };
            state
                .outcome
                .record(target, DieFields::SIZE, before, die.total_value());
        }

        // Handled before the target loop.
        EffectKind::CopyNeighborValue { .. } => {}

        // ====================================================================
        // Combat tagging
        // ====================================================================
        EffectKind::AddDamageType(element) => {
            state.outcome.combat_events.push(CombatEvent::AddedDamageType {
                slot: target,
                element: *element,
            });
        }

        EffectKind::GrantStatusEffect { status } => {
            state.outcome.combat_events.push(CombatEvent::StatusApplied {
                slot: target,
                status: *status,
                potency: mag,
            });
        }

        EffectKind::RandomizeElement => {
            let seed = {
                let id = die.id.0;
                state.next_seed(id)
            };
            let pick = state
                .rng
                .range(seed, 0, (Element::ATTACK.len() - 1) as u32);
            let die = &mut dice[target];
            die.element = Element::ATTACK[pick as usize];
            state
                .outcome
                .record(target, DieFields::ELEMENT, before, die.total_value());
        }

        EffectKind::SetElement(choice) => {
            die.element = match choice {
                ElementChoice::To(element) => *element,
                ElementChoice::LeastUsed => least_used_element(state.ctx),
            };
            state
                .outcome
                .record(target, DieFields::ELEMENT, before, die.total_value());
        }

        EffectKind::LeechHeal => {
            state.outcome.combat_events.push(CombatEvent::LeechHeal {
                slot: target,
                percent: mag,
            });
        }

        // Handled before the target loop.
        EffectKind::DestroySelf | EffectKind::CreateCombatModifier(_) => {}

        EffectKind::SetRollValue(choice) => {
            let forced = match choice {
                RollValue::To(value) => *value,
                RollValue::Maximum => die.size.faces() as i32,
                RollValue::FromSource => mag,
            };
            die.force_value(forced);
            state.outcome.specials.push(SpecialRequest::ForcedRoll {
                slot: target,
                value: forced,
            });
            state.outcome.record(
                target,
                DieFields::VALUE | DieFields::ROLLED,
                before,
                die.total_value(),
            );
        }

        // ====================================================================
        // Event emission
        // ====================================================================
        EffectKind::EmitSplash { percent } => {
            let amount = emitted_amount(die, *percent, scope);
            let element = die.effective_element();
            state.outcome.combat_events.push(CombatEvent::Splash {
                slot: target,
                amount,
                element,
            });
        }

        EffectKind::EmitChain { percent, jumps } => {
            let amount = emitted_amount(die, *percent, scope);
            let element = die.effective_element();
            state.outcome.combat_events.push(CombatEvent::Chain {
                slot: target,
                amount,
                element,
                jumps: *jumps,
            });
        }

        EffectKind::EmitAoe { percent } => {
            let amount = emitted_amount(die, *percent, scope);
            let element = die.effective_element();
            state.outcome.combat_events.push(CombatEvent::AreaBurst {
                slot: target,
                amount,
                element,
            });
        }

        EffectKind::EmitBonusDamage => {
            state.outcome.combat_events.push(CombatEvent::BonusDamage {
                slot: target,
                amount: mag,
            });
        }

        EffectKind::ManaRefund => {
            state.outcome.mana_events.push(ManaEvent::Refund {
                slot: target,
                amount: mag,
            });
        }

        EffectKind::ManaGain => {
            state.outcome.mana_events.push(ManaEvent::Gain {
                slot: target,
                amount: mag,
            });
        }

        EffectKind::RollKeepHighest { extra_rolls } => {
            keep_highest(dice, target, *extra_rolls, before, state);
        }

        EffectKind::GrantExtraRoll => {
            keep_highest(dice, target, 1, before, state);
        }

        EffectKind::IgnoreResistance => {
            state
                .outcome
                .combat_events
                .push(CombatEvent::ResistanceIgnored { slot: target });
        }
    }
}

/// Damage amount for splash/chain/aoe emission: a percentage of the die's
/// live total, scaled by the rule's multiplier.
fn emitted_amount(die: &Die, percent: i32, scope: &EffectScope<'_>) -> i32 {
    let base = mul_percent(die.total_value(), percent);
    let scaled = mul_percent(base, scope.multiplier_percent);
    apply_magnitude_floor(scaled, scope.min_magnitude)
}

/// Rerolls keeping the best face, then reports the kept result.
fn keep_highest(
    dice: &mut [Die],
    target: usize,
    extra_rolls: u32,
    before: i32,
    state: &mut PassState<'_>,
) {
    if dice[target].locked {
        return;
    }
    let seed = state.next_seed(dice[target].id.0);
    let die = &mut dice[target];
    die.roll_keep_highest(state.rng, seed, extra_rolls);
    let kept = die.base_value();
    state.outcome.record(
        target,
        DieFields::VALUE | DieFields::ROLLED,
        before,
        die.total_value(),
    );
    state
        .outcome
        .combat_events
        .push(CombatEvent::ExtraRollKept { slot: target, kept });
}

/// The attack element with the lowest per-turn usage count; ties break in
/// declaration order.
fn least_used_element(ctx: &ProcessingContext) -> Element {
    let mut best = Element::ATTACK[0];
    let mut best_count = ctx.element_used[best.index()];
    for &element in &Element::ATTACK[1..] {
        let count = ctx.element_used[element.index()];
        if count < best_count {
            best = element;
            best_count = count;
        }
    }
    best
}

/// Creates the persistent modifiers standing in for an OnCombatStart value
/// modification.
fn materialize_modifier(
    dice: &[Die],
    spec: &EffectSpec,
    scope: &EffectScope<'_>,
    state: &mut PassState<'_>,
) {
    let kind_for = |mag: i32| match spec.effect {
        EffectKind::ModifyValuePercent => ModifierKind::Percent(mag),
        _ => ModifierKind::Flat(mag),
    };

    let mut blueprints: Vec<(ModifierKind, ModifierFilter)> = Vec::new();
    match scope.rule_target {
        // Whole-sequence targets collapse to a single filtered modifier.
        TargetSpec::All => {
            if let Some(mag) = magnitude(dice, spec, scope, state.ctx, scope.owner) {
                blueprints.push((kind_for(mag), ModifierFilter::AllDice));
            }
        }
        TargetSpec::AllOthers => {
            if let Some(mag) = magnitude(dice, spec, scope, state.ctx, scope.owner) {
                blueprints.push((kind_for(mag), ModifierFilter::AllExceptSource));
            }
        }
        // Everything else pins the resolved slots individually.
        _ => {
            for &target in scope.targets {
                if let Some(mag) = magnitude(dice, spec, scope, state.ctx, target) {
                    blueprints.push((kind_for(mag), ModifierFilter::SpecificSlot(target)));
                }
            }
        }
    }

    for (kind, filter) in blueprints {
        state
            .outcome
            .specials
            .push(SpecialRequest::CreateModifier(PersistentModifier::new(
                kind,
                ModifierDuration::Combat,
                filter,
                scope.owner,
                scope.rule_name,
            )));
    }
}
