//! Data-driven dice content and loaders.
//!
//! This crate houses static game content and provides loaders for RON data
//! files:
//! - Affix rule definitions (data-driven via RON)
//! - Die templates referencing affixes by name (data-driven via RON)
//!
//! Content is consumed when building a [`dice_core::DicePool`] and never
//! appears in engine state.
//!
//! All loaders use dice-core types directly with serde for RON
//! deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{AffixRegistry, DieTemplateRegistry, DieTemplateSpec};
