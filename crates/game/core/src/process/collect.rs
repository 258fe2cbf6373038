//! The collection phase: snapshot which rules fire before anything mutates.
//!
//! The whole sequence is walked once in slot order against pre-pass state.
//! Position requirements and conditions are checked here; targets are
//! resolved here. Nothing is mutated. The ordered activation list this phase
//! produces is the contract that makes the application phase deterministic:
//! ascending slot, then each die's rules in authored order.

use crate::die::Die;
use crate::rules::{RuleTrigger, TargetSlots};

use super::context::ProcessingContext;

/// One rule that will fire, recorded before any mutation.
#[derive(Clone, Debug)]
pub(super) struct Activation {
    /// Slot of the owning die.
    pub owner: usize,

    /// Index into the owner's rule list (rules are cloned at application
    /// time; holding indices keeps the arena borrow-free).
    pub rule_index: usize,

    /// Scaling multiplier collected from the rule's condition, in percent.
    pub multiplier_percent: i32,

    /// Target slots resolved against pre-pass positions.
    pub targets: TargetSlots,
}

/// Walks the sequence and records every rule that fires for `trigger`.
pub(super) fn collect_activations(
    dice: &[Die],
    trigger: RuleTrigger,
    ctx: &ProcessingContext,
) -> Vec<Activation> {
    let mut activations = Vec::new();

    for (slot, die) in dice.iter().enumerate() {
        // OnUse is scoped: only the triggering die's own rules fire. Other
        // dice stay eligible as targets, but a sibling being used is not a
        // trigger for them.
        if trigger == RuleTrigger::OnUse && ctx.trigger_slot != Some(slot) {
            continue;
        }

        // Consumed dice no longer own rules. The triggering die itself is
        // exempt - it was just consumed by the action being processed and is
        // still readable.
        if die.consumed && ctx.trigger_slot != Some(slot) {
            continue;
        }

        for (rule_index, rule) in die.rules.iter().enumerate() {
            if rule.trigger != trigger {
                continue;
            }
            if !rule.position.matches(slot, dice.len()) {
                continue;
            }

            let mut multiplier_percent = 100;
            if let Some(condition) = &rule.condition {
                let verdict = condition.evaluate(dice, slot, ctx);
                if verdict.blocked {
                    continue;
                }
                multiplier_percent = verdict.multiplier_percent;
            }

            activations.push(Activation {
                owner: slot,
                rule_index,
                multiplier_percent,
                targets: rule.target.resolve(slot, dice.len()),
            });
        }
    }

    activations
}

/// Activation collection for a mid-combat insertion.
///
/// Only the new die's own OnRoll rules fire, plus the neighbor-dependent
/// OnRoll rules of the dice adjacent to it - the rest of the hand has
/// already been processed and must not fire again.
pub(super) fn collect_insertion_activations(
    dice: &[Die],
    new_index: usize,
    ctx: &ProcessingContext,
) -> Vec<Activation> {
    let mut activations = Vec::new();
    if new_index >= dice.len() {
        return activations;
    }

    let adjacent = [
        new_index.checked_sub(1),
        (new_index + 1 < dice.len()).then_some(new_index + 1),
    ];

    for (slot, die) in dice.iter().enumerate() {
        let rerun_all = slot == new_index;
        let rerun_neighbor_rules = adjacent.contains(&Some(slot));
        if !rerun_all && !rerun_neighbor_rules {
            continue;
        }
        if die.consumed {
            continue;
        }

        for (rule_index, rule) in die.rules.iter().enumerate() {
            if rule.trigger != RuleTrigger::OnRoll {
                continue;
            }
            if !rerun_all && !rule.is_neighbor_dependent() {
                continue;
            }
            if !rule.position.matches(slot, dice.len()) {
                continue;
            }

            let mut multiplier_percent = 100;
            if let Some(condition) = &rule.condition {
                let verdict = condition.evaluate(dice, slot, ctx);
                if verdict.blocked {
                    continue;
                }
                multiplier_percent = verdict.multiplier_percent;
            }

            activations.push(Activation {
                owner: slot,
                rule_index,
                multiplier_percent,
                targets: rule.target.resolve(slot, dice.len()),
            });
        }
    }

    activations
}
