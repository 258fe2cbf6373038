//! The declarative rule model: triggers, positions, targets, conditions,
//! value sources, effects, and the affix rule that composes them.
//!
//! Rules are pure data - authored in content files, bound to dice, and never
//! mutated by evaluation. All interpretation lives in [`crate::process`].

mod affix;
mod condition;
mod effect;
mod position;
mod target;
mod trigger;
mod value;

pub use affix::{AffixRule, EffectSpec, RuleBody, SubEffect};
pub use condition::{ConditionKind, ConditionRule, ConditionVerdict};
pub use effect::{EffectKind, ElementChoice, ModifierSpec, RollValue, TypeChange};
pub use position::PositionRequirement;
pub use target::{NeighborSide, TargetSlots, TargetSpec};
pub use trigger::RuleTrigger;
pub use value::{ValueInputs, ValueSource};

pub(crate) use value::{apply_magnitude_floor, mul_percent};
