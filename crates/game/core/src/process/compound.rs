//! Compound rule execution with snapshot semantics.
//!
//! A rule with sub-effects is processed as a unit: before any sub-effect
//! runs, every die's current total is captured into a per-slot snapshot.
//! Snapshot-backed value sources resolve against that capture instead of
//! live state, which makes symmetric pairs (two sub-effects reading each
//! other's targets, e.g. a value swap) order-independent within the rule.
//! The snapshot is discarded once the rule's sub-effects have all run.

use crate::die::Die;
use crate::rules::{AffixRule, SubEffect};

use super::apply::{EffectScope, PassState, apply_spec};
use super::collect::Activation;

/// Runs a compound rule's sub-effects against one shared snapshot.
pub(super) fn apply_compound(
    dice: &mut [Die],
    rule: &AffixRule,
    subs: &[SubEffect],
    activation: &Activation,
    state: &mut PassState<'_>,
) {
    let snapshot: Vec<i32> = dice.iter().map(Die::total_value).collect();

    // The parent's resolved target feeds ParentTargetValue/Percent.
    let parent_target = activation.targets.first().copied();

    for sub in subs {
        // A sub-effect may gate or scale further on top of the parent's
        // multiplier; its condition reads live state at application time.
        let mut multiplier = activation.multiplier_percent;
        if let Some(condition) = &sub.condition {
            let verdict = condition.evaluate(dice, activation.owner, state.ctx);
            if verdict.blocked {
                continue;
            }
            multiplier = crate::rules::mul_percent(multiplier, verdict.multiplier_percent);
        }

        // Target override falls back to the parent's resolved slots.
        let own_targets;
        let targets: &[usize] = match &sub.target {
            Some(spec) => {
                own_targets = spec.resolve(activation.owner, dice.len());
                &own_targets
            }
            None => &activation.targets,
        };

        // Value-read override: sources read this slot instead of the slot
        // the effect lands on. An override that resolves to nothing (missing
        // neighbor) degrades this sub-effect to a no-op.
        let value_slot = sub
            .value_target
            .and_then(|spec| spec.resolve(activation.owner, dice.len()).first().copied());
        if sub.value_target.is_some() && value_slot.is_none() {
            continue;
        }

        let scope = EffectScope {
            owner: activation.owner,
            targets,
            multiplier_percent: multiplier,
            min_magnitude: rule.min_magnitude,
            rule_name: &rule.name,
            rule_target: sub.target.unwrap_or(rule.target),
            snapshot: Some(&snapshot),
            parent_target,
            value_slot,
        };
        apply_spec(dice, &sub.spec, &scope, state);
    }
}
