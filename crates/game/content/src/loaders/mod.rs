//! Content loaders for reading dice data from files.
//!
//! Loaders convert embedded RON files into registries the runtime builds
//! pools from. Failure policy follows the engine contract: a malformed file
//! is a load error, but a dangling reference (a template naming an affix
//! that does not exist) degrades to a warn-and-skip - bad content never
//! takes the game down.

pub mod affixes;
pub mod dice;

pub use affixes::AffixRegistry;
pub use dice::{DieTemplateRegistry, DieTemplateSpec};

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;
