//! Deterministic dice affix rules and the engine that evaluates them.
//!
//! `dice-core` defines the canonical rule model (affixes, conditions, value
//! sources, persistent modifiers) and exposes pure APIs reusable by the
//! runtime and offline tools. All rule evaluation flows through
//! [`process::Processor`]; the [`collection::DicePool`] drives it at the
//! turn/combat lifecycle points and owns everything that survives a pass.
pub mod bonus;
pub mod collection;
pub mod config;
pub mod die;
pub mod error;
pub mod modifier;
pub mod process;
pub mod rng;
pub mod rules;

pub use bonus::{BonusEntry, BonusPool};
pub use collection::{DicePool, PoolError};
pub use config::EngineConfig;
pub use die::{Die, DieId, DieSize, Element, StatusKind, TagSet};
pub use error::{EngineError, ErrorContext, ErrorSeverity};
pub use modifier::{ModifierDuration, ModifierFilter, ModifierKind, PersistentModifier};
pub use process::{
    CombatEvent, DieChange, DieFields, ManaEvent, ProcessOutcome, ProcessingContext, Processor,
    SpecialRequest, TagChange,
};
pub use rng::{FixedRng, PcgRng, RngOracle, compute_seed};
pub use rules::{
    AffixRule, ConditionKind, ConditionRule, ConditionVerdict, EffectKind, EffectSpec,
    ElementChoice, ModifierSpec, NeighborSide, PositionRequirement, RollValue, RuleBody,
    RuleTrigger, SubEffect, TargetSpec, TypeChange, ValueSource,
};
