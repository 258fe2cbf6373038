//! Affix rules: the declarative unit bound to a die.

use super::condition::ConditionRule;
use super::effect::EffectKind;
use super::position::PositionRequirement;
use super::target::TargetSpec;
use super::trigger::RuleTrigger;
use super::value::ValueSource;

/// One concrete effect with its magnitude source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub effect: EffectKind,

    /// Where the magnitude comes from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: ValueSource,

    /// Literal parameter: the magnitude for `Static`, the percent for
    /// fraction sources.
    #[cfg_attr(feature = "serde", serde(default))]
    pub amount: i32,
}

impl EffectSpec {
    /// A static-valued effect.
    pub fn with_amount(effect: EffectKind, amount: i32) -> Self {
        Self {
            effect,
            value: ValueSource::Static,
            amount,
        }
    }

    /// An effect with an explicit value source.
    pub fn sourced(effect: EffectKind, value: ValueSource, amount: i32) -> Self {
        Self {
            effect,
            value,
            amount,
        }
    }
}

/// One step of a compound rule.
///
/// Sub-effects inherit the parent's resolved targets unless they carry their
/// own target spec, and may add a further gating/scaling condition on top of
/// the parent's multiplier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubEffect {
    pub spec: EffectSpec,

    /// Target override; `None` inherits the parent rule's targets.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Option<TargetSpec>,

    /// Where the value source reads from, when different from the effect
    /// target. Two sub-effects reading each other's targets through the
    /// snapshot is how a symmetric swap is authored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value_target: Option<TargetSpec>,

    /// Extra condition evaluated when the sub-effect runs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<ConditionRule>,
}

impl SubEffect {
    pub fn new(spec: EffectSpec) -> Self {
        Self {
            spec,
            target: None,
            value_target: None,
            condition: None,
        }
    }

    /// Builder: set a target override.
    #[must_use]
    pub fn targeting(mut self, target: TargetSpec) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder: set a value-read target override.
    #[must_use]
    pub fn reading(mut self, value_target: TargetSpec) -> Self {
        self.value_target = Some(value_target);
        self
    }

    /// Builder: set a condition override.
    #[must_use]
    pub fn when(mut self, condition: ConditionRule) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// What a rule does when it fires: a single effect, or a compound unit of
/// sub-effects sharing one pre-rule snapshot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleBody {
    /// One effect applied to every resolved target.
    Single(EffectSpec),

    /// Ordered sub-effects resolved against a snapshot of every die's total
    /// taken before the first one runs. Snapshot-backed value sources make
    /// symmetric pairs (value swaps) order-independent.
    Compound(Vec<SubEffect>),
}

/// A declarative rule bound to one die.
///
/// Immutable once loaded; evaluation never mutates the rule. Rules fire in
/// ascending slot order, then in the order they were authored onto the die -
/// a correctness contract, since later effects in a pass read values mutated
/// by earlier ones.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixRule {
    /// Stable name used by content registries, modifiers and logs.
    pub name: String,

    /// Lifecycle event this rule listens for.
    pub trigger: RuleTrigger,

    /// Slot predicate gating the rule.
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: PositionRequirement,

    /// Which dice the effect lands on.
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetSpec,

    /// Optional gating or scaling condition.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<ConditionRule>,

    /// Lower floor on the resolved magnitude's absolute value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_magnitude: Option<i32>,

    /// What to do.
    pub body: RuleBody,
}

impl AffixRule {
    /// Creates a single-effect rule targeting self with no condition.
    pub fn single(name: &str, trigger: RuleTrigger, spec: EffectSpec) -> Self {
        Self {
            name: name.to_owned(),
            trigger,
            position: PositionRequirement::Any,
            target: TargetSpec::SelfSlot,
            condition: None,
            min_magnitude: None,
            body: RuleBody::Single(spec),
        }
    }

    /// Creates a compound rule from ordered sub-effects.
    pub fn compound(name: &str, trigger: RuleTrigger, subs: Vec<SubEffect>) -> Self {
        Self {
            name: name.to_owned(),
            trigger,
            position: PositionRequirement::Any,
            target: TargetSpec::SelfSlot,
            condition: None,
            min_magnitude: None,
            body: RuleBody::Compound(subs),
        }
    }

    /// Builder: set the target spec.
    #[must_use]
    pub fn targeting(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    /// Builder: set the position requirement.
    #[must_use]
    pub fn at(mut self, position: PositionRequirement) -> Self {
        self.position = position;
        self
    }

    /// Builder: set the condition.
    #[must_use]
    pub fn when(mut self, condition: ConditionRule) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Builder: set the magnitude floor.
    #[must_use]
    pub fn floored(mut self, min_magnitude: i32) -> Self {
        self.min_magnitude = Some(min_magnitude);
        self
    }

    /// True when any part of the rule reads a neighbor of the owning die.
    ///
    /// Mid-combat insertions re-run exactly these rules on the dice adjacent
    /// to the inserted one.
    pub fn is_neighbor_dependent(&self) -> bool {
        if self.target.is_neighbor_relative() {
            return true;
        }
        if self
            .condition
            .as_ref()
            .is_some_and(ConditionRule::is_neighbor_dependent)
        {
            return true;
        }
        match &self.body {
            RuleBody::Single(spec) => spec.effect.is_neighbor_dependent(),
            RuleBody::Compound(subs) => subs.iter().any(|sub| {
                sub.target
                    .as_ref()
                    .is_some_and(TargetSpec::is_neighbor_relative)
                    || sub
                        .value_target
                        .as_ref()
                        .is_some_and(TargetSpec::is_neighbor_relative)
                    || sub
                        .condition
                        .as_ref()
                        .is_some_and(ConditionRule::is_neighbor_dependent)
                    || sub.spec.effect.is_neighbor_dependent()
            }),
        }
    }
}
