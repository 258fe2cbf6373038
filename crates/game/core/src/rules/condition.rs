//! Conditions gating or scaling affix rules.
//!
//! A condition is classified at evaluation time: *gating* kinds produce a
//! pass/fail (invertible), *scaling* kinds always pass and produce a percent
//! multiplier instead (`invert` is meaningless for them). A rule with no
//! condition always passes at ×1.

use crate::die::{Die, Element, StatusKind};
use crate::process::ProcessingContext;

use super::target::NeighborSide;

/// Outcome of evaluating a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConditionVerdict {
    /// True when a gating condition failed; the rule is skipped entirely.
    pub blocked: bool,

    /// Percent multiplier applied to the rule's magnitude (100 = ×1).
    ///
    /// Gating conditions always report 100; scaling conditions report the
    /// count-derived multiplier (which may legitimately be 0).
    pub multiplier_percent: i32,
}

impl ConditionVerdict {
    /// The verdict of an absent condition.
    pub const PASS: Self = Self {
        blocked: false,
        multiplier_percent: 100,
    };

    fn gate(passed: bool) -> Self {
        Self {
            blocked: !passed,
            multiplier_percent: 100,
        }
    }

    fn scale(count: u32) -> Self {
        Self {
            blocked: false,
            multiplier_percent: count as i32 * 100,
        }
    }
}

/// The predicate a condition computes.
///
/// Payloads are typed per kind; there are no string-keyed parameter lookups
/// anywhere in evaluation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionKind {
    // ========================================================================
    // Gating (pass/fail, invertible)
    // ========================================================================
    /// Owner's total value is at least the threshold.
    SelfValueAtLeast(i32),

    /// Owner's total value is at most the threshold.
    SelfValueAtMost(i32),

    /// A directional neighbor's total value is at least the threshold.
    NeighborValueAtLeast {
        threshold: i32,
        side: NeighborSide,
    },

    /// At least `n` dice have been used this turn.
    DiceUsedAtLeast(u32),

    /// Owner shares its element with a neighbor (`all` requires every
    /// existing neighbor to match; no neighbors fails either way).
    ElementMatchesNeighbor { all: bool },

    /// Owner's effective element is exactly this.
    SelfElementIs(Element),

    /// Some die in the sequence carries the tag.
    HandHasTag(String),

    /// At least `count` dice of `element` have been used this turn.
    ElementUsedAtLeast { element: Element, count: u32 },

    /// The player has at least this much mana (external resource lookup).
    ManaAtLeast(u32),

    /// The player currently has this status (external combat lookup).
    StatusActive(StatusKind),

    // ========================================================================
    // Scaling (never blocks, invert ignored)
    // ========================================================================
    /// ×1 per die used this turn.
    PerDieUsed,

    /// ×1 per existing neighbor whose total value is at least `min_value`.
    PerQualifyingNeighbor { min_value: i32 },

    /// ×1 per die of `element` used this turn.
    PerElementUsed(Element),
}

impl ConditionKind {
    /// True for kinds that scale instead of gate.
    pub fn is_scaling(&self) -> bool {
        matches!(
            self,
            Self::PerDieUsed | Self::PerQualifyingNeighbor { .. } | Self::PerElementUsed(_)
        )
    }
}

/// A condition attached to a rule or sub-effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionRule {
    pub kind: ConditionKind,

    /// Inverts the outcome of a gating kind. Ignored by scaling kinds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub invert: bool,
}

impl ConditionRule {
    /// Creates a non-inverted condition.
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            invert: false,
        }
    }

    /// Builder: invert the gate.
    #[must_use]
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// True when evaluation reads a neighbor of the owning die.
    pub fn is_neighbor_dependent(&self) -> bool {
        matches!(
            self.kind,
            ConditionKind::NeighborValueAtLeast { .. }
                | ConditionKind::ElementMatchesNeighbor { .. }
                | ConditionKind::PerQualifyingNeighbor { .. }
        )
    }

    /// Evaluates the condition for the die at `index`.
    ///
    /// Gating kinds return a blocked/unblocked verdict at ×1; scaling kinds
    /// never block and return their count-derived multiplier.
    pub fn evaluate(
        &self,
        dice: &[Die],
        index: usize,
        ctx: &ProcessingContext,
    ) -> ConditionVerdict {
        let die = match dice.get(index) {
            Some(die) => die,
            None => return ConditionVerdict::gate(false),
        };

        let verdict = match &self.kind {
            ConditionKind::SelfValueAtLeast(threshold) => {
                ConditionVerdict::gate(die.total_value() >= *threshold)
            }

            ConditionKind::SelfValueAtMost(threshold) => {
                ConditionVerdict::gate(die.total_value() <= *threshold)
            }

            ConditionKind::NeighborValueAtLeast { threshold, side } => {
                let neighbors = side.neighbors(index, dice.len());
                let passed = match side {
                    NeighborSide::Both => {
                        neighbors.len() == 2
                            && neighbors.iter().all(|&n| dice[n].total_value() >= *threshold)
                    }
                    _ => neighbors.iter().any(|&n| dice[n].total_value() >= *threshold),
                };
                ConditionVerdict::gate(passed)
            }

            ConditionKind::DiceUsedAtLeast(n) => ConditionVerdict::gate(ctx.used_count >= *n),

            ConditionKind::ElementMatchesNeighbor { all } => {
                let neighbors = NeighborSide::Any.neighbors(index, dice.len());
                let passed = if neighbors.is_empty() {
                    false
                } else if *all {
                    neighbors
                        .iter()
                        .all(|&n| dice[n].effective_element() == die.effective_element())
                } else {
                    neighbors
                        .iter()
                        .any(|&n| dice[n].effective_element() == die.effective_element())
                };
                ConditionVerdict::gate(passed)
            }

            ConditionKind::SelfElementIs(element) => {
                ConditionVerdict::gate(die.effective_element() == *element)
            }

            ConditionKind::HandHasTag(tag) => {
                ConditionVerdict::gate(dice.iter().any(|d| d.tags.has(tag)))
            }

            ConditionKind::ElementUsedAtLeast { element, count } => {
                ConditionVerdict::gate(ctx.element_used[element.index()] >= *count)
            }

            ConditionKind::ManaAtLeast(mana) => ConditionVerdict::gate(ctx.player_mana >= *mana),

            ConditionKind::StatusActive(status) => {
                ConditionVerdict::gate(ctx.active_statuses.contains(status))
            }

            ConditionKind::PerDieUsed => ConditionVerdict::scale(ctx.used_count),

            ConditionKind::PerQualifyingNeighbor { min_value } => {
                let neighbors = NeighborSide::Any.neighbors(index, dice.len());
                let qualifying = neighbors
                    .iter()
                    .filter(|&&n| dice[n].total_value() >= *min_value)
                    .count() as u32;
                ConditionVerdict::scale(qualifying)
            }

            ConditionKind::PerElementUsed(element) => {
                ConditionVerdict::scale(ctx.element_used[element.index()])
            }
        };

        if self.invert && !self.kind.is_scaling() {
            ConditionVerdict::gate(verdict.blocked)
        } else {
            verdict
        }
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
                let mut die = Die::new(DieId(i as u32), DieSize::D6, Element::Fire);
                die.force_value(v);
                die.slot_index = i;
                die
            })
            .collect()
    }

    fn ctx() -> ProcessingContext {
        ProcessingContext::default()
    }

    #[test]
    fn self_value_gate_and_invert() {
        let dice = hand(&[4]);
        let cond = ConditionRule::new(ConditionKind::SelfValueAtLeast(4));
        assert!(!cond.evaluate(&dice, 0, &ctx()).blocked);

        let inverted = cond.inverted();
        assert!(inverted.evaluate(&dice, 0, &ctx()).blocked);
    }

    #[test]
    fn neighbor_gate_requires_both_when_asked() {
        let dice = hand(&[5, 2, 5]);
        let any = ConditionRule::new(ConditionKind::NeighborValueAtLeast {
            threshold: 4,
            side: NeighborSide::Any,
        });
        let both = ConditionRule::new(ConditionKind::NeighborValueAtLeast {
            threshold: 4,
            side: NeighborSide::Both,
        });
        assert!(!any.evaluate(&dice, 1, &ctx()).blocked);
        assert!(!both.evaluate(&dice, 1, &ctx()).blocked);
        // Edge slot only has one neighbor; Both must fail.
        assert!(both.evaluate(&dice, 0, &ctx()).blocked);
    }

    #[test]
    fn scaling_never_blocks_and_ignores_invert() {
        let dice = hand(&[3, 3]);
        let mut context = ctx();
        context.used_count = 3;
        let cond = ConditionRule::new(ConditionKind::PerDieUsed).inverted();
        let verdict = cond.evaluate(&dice, 0, &context);
        assert!(!verdict.blocked);
        assert_eq!(verdict.multiplier_percent, 300);
    }

    #[test]
    fn zero_count_scaling_yields_zero_multiplier() {
        let dice = hand(&[3]);
        let cond = ConditionRule::new(ConditionKind::PerDieUsed);
        assert_eq!(cond.evaluate(&dice, 0, &ctx()).multiplier_percent, 0);
    }

    #[test]
    fn external_mana_and_status_gates_read_the_context() {
        let dice = hand(&[3]);
        let mut context = ctx();
        context.player_mana = 2;
        context.active_statuses.push(StatusKind::Burn);

        let mana = ConditionRule::new(ConditionKind::ManaAtLeast(3));
        assert!(mana.evaluate(&dice, 0, &context).blocked);
        context.player_mana = 3;
        assert!(!mana.evaluate(&dice, 0, &context).blocked);

        let status = ConditionRule::new(ConditionKind::StatusActive(StatusKind::Burn));
        assert!(!status.evaluate(&dice, 0, &context).blocked);
        let absent = ConditionRule::new(ConditionKind::StatusActive(StatusKind::Stun));
        assert!(absent.evaluate(&dice, 0, &context).blocked);
    }

    #[test]
    fn element_match_needs_a_neighbor() {
        let dice = hand(&[3]);
        let cond = ConditionRule::new(ConditionKind::ElementMatchesNeighbor { all: false });
        assert!(cond.evaluate(&dice, 0, &ctx()).blocked);
    }
}
