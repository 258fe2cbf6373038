//! Dynamic value resolution for affix effects.
//!
//! A rule's magnitude is not a bare literal: it can read the owning die, the
//! resolved target, turn-level counters, or - inside compound rules - the
//! snapshot taken before any sub-effect ran. Resolution happens during the
//! application phase against live die state, so effects applied earlier in
//! the same pass visibly influence later magnitudes. That ordering is a
//! contract, not an accident.

use crate::die::{Die, Element};
use crate::process::ProcessingContext;

/// Multiplies by an integer percent, rounding half away from zero.
pub(crate) fn mul_percent(value: i32, percent: i32) -> i32 {
    let product = value as i64 * percent as i64;
    ((product + if product >= 0 { 50 } else { -50 }) / 100) as i32
}

/// Where a rule's numeric magnitude comes from.
///
/// The snapshot-backed sources are only meaningful inside a compound rule's
/// sub-effects; at the top level they resolve to nothing and the rule
/// degrades to a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueSource {
    /// The rule's literal `amount`.
    #[default]
    Static,

    /// The owning die's live total value.
    SelfValue,

    /// A percentage (`amount`) of the owning die's live total value.
    SelfValueFraction,

    /// The resolved target die's live total value.
    NeighborValue,

    /// A percentage (`amount`) of the resolved target die's live total.
    NeighborPercent,

    /// Number of dice used so far this turn.
    ContextUsedCount,

    /// Original size of the rolled hand.
    ContextDicePlaced,

    /// Per-turn usage count of one element.
    ContextElementDiceUsed(Element),

    /// Sub-effects only: the parent rule's resolved target, via snapshot.
    ParentTargetValue,

    /// Sub-effects only: a percentage (`amount`) of the parent target's
    /// snapshot value.
    ParentTargetPercent,

    /// Sub-effects only: the sub-effect's own target, via snapshot.
    SnapshotTargetValue,

    /// Sub-effects only: a percentage (`amount`) of the sub-effect target's
    /// snapshot value.
    SnapshotTargetPercent,
}

/// Everything a source can read from.
pub struct ValueInputs<'a> {
    /// The sequence being processed.
    pub dice: &'a [Die],

    /// Slot of the rule's owning die.
    pub owner: usize,

    /// Slot of the target currently being applied to.
    pub target: usize,

    /// Turn/combat context snapshot.
    pub ctx: &'a ProcessingContext,

    /// Per-slot total values captured before a compound rule began.
    pub snapshot: Option<&'a [i32]>,

    /// The parent rule's resolved target (compound sub-effects only).
    pub parent_target: Option<usize>,
}

impl ValueSource {
    /// Resolves the magnitude, or `None` when the source cannot be read
    /// (missing snapshot, out-of-range slot). Unresolvable sources degrade
    /// the single rule to a no-op; they never abort a pass.
    pub fn resolve(&self, amount: i32, inputs: &ValueInputs<'_>) -> Option<i32> {
        let live = |slot: usize| inputs.dice.get(slot).map(Die::total_value);
        let snap = |slot: usize| inputs.snapshot.and_then(|s| s.get(slot)).copied();

        match self {
            Self::Static => Some(amount),

            Self::SelfValue => live(inputs.owner),
            Self::SelfValueFraction => live(inputs.owner).map(|v| mul_percent(v, amount)),

            Self::NeighborValue => live(inputs.target),
            Self::NeighborPercent => live(inputs.target).map(|v| mul_percent(v, amount)),

            Self::ContextUsedCount => Some(inputs.ctx.used_count as i32),
            Self::ContextDicePlaced => Some(inputs.ctx.original_hand_size as i32),
            Self::ContextElementDiceUsed(element) => {
                Some(inputs.ctx.element_used[element.index()] as i32)
            }

            Self::ParentTargetValue => snap(inputs.parent_target?),
            Self::ParentTargetPercent => {
                snap(inputs.parent_target?).map(|v| mul_percent(v, amount))
            }

            Self::SnapshotTargetValue => snap(inputs.target),
            Self::SnapshotTargetPercent => snap(inputs.target).map(|v| mul_percent(v, amount)),
        }
    }
}

/// Clamps a resolved magnitude's absolute value upward to `floor`,
/// preserving sign. Zero stays zero.
pub(crate) fn apply_magnitude_floor(magnitude: i32, floor: Option<i32>) -> i32 {
    match floor {
        Some(min) if magnitude > 0 => magnitude.max(min.abs()),
        Some(min) if magnitude < 0 => magnitude.min(-min.abs()),
        _ => magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::{DieId, DieSize};

    fn hand(values: &[i32]) -> Vec<Die> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut die = Die::new(DieId(i as u32), DieSize::D6, Element::Neutral);
                die.force_value(v);
                die.slot_index = i;
                die
            })
            .collect()
    }

    fn inputs<'a>(
        dice: &'a [Die],
        ctx: &'a ProcessingContext,
        owner: usize,
        target: usize,
    ) -> ValueInputs<'a> {
        ValueInputs {
            dice,
            owner,
            target,
            ctx,
            snapshot: None,
            parent_target: None,
        }
    }

    #[test]
    fn fraction_sources_round_half_away_from_zero() {
        let dice = hand(&[5, 3]);
        let ctx = ProcessingContext::default();
        let inp = inputs(&dice, &ctx, 0, 1);
        assert_eq!(ValueSource::SelfValueFraction.resolve(50, &inp), Some(3)); // 2.5 → 3
        assert_eq!(ValueSource::NeighborPercent.resolve(50, &inp), Some(2)); // 1.5 → 2
    }

    #[test]
    fn snapshot_sources_need_a_snapshot() {
        let dice = hand(&[5]);
        let ctx = ProcessingContext::default();
        let inp = inputs(&dice, &ctx, 0, 0);
        assert_eq!(ValueSource::SnapshotTargetValue.resolve(0, &inp), None);
        assert_eq!(ValueSource::ParentTargetValue.resolve(0, &inp), None);
    }

    #[test]
    fn snapshot_reads_captured_not_live_values() {
        let mut dice = hand(&[5]);
        let snapshot = vec![9];
        dice[0].force_value(1);
        let ctx = ProcessingContext::default();
        let mut inp = inputs(&dice, &ctx, 0, 0);
        inp.snapshot = Some(&snapshot);
        inp.parent_target = Some(0);
        assert_eq!(ValueSource::SnapshotTargetValue.resolve(0, &inp), Some(9));
        assert_eq!(ValueSource::ParentTargetPercent.resolve(50, &inp), Some(5));
    }

    #[test]
    fn magnitude_floor_preserves_sign_and_zero() {
        assert_eq!(apply_magnitude_floor(1, Some(3)), 3);
        assert_eq!(apply_magnitude_floor(-1, Some(3)), -3);
        assert_eq!(apply_magnitude_floor(5, Some(3)), 5);
        assert_eq!(apply_magnitude_floor(0, Some(3)), 0);
        assert_eq!(apply_magnitude_floor(2, None), 2);
    }
}
