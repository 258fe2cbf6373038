/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Default lower clamp for a die's modified value when no explicit
    /// minimum override has been applied.
    pub default_min_value: i32,
}

impl EngineConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of dice in the pool (and therefore in a rolled hand).
    pub const MAX_DICE: usize = 16;
    /// Maximum number of free-form tags on a single die.
    pub const MAX_TAGS: usize = 8;
    /// Maximum number of sub-effects in a compound rule.
    pub const MAX_SUB_EFFECTS: usize = 4;
    /// Maximum number of persistent modifiers active at once.
    pub const MAX_MODIFIERS: usize = 32;
    /// Maximum number of active player statuses mirrored into the context.
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MIN_VALUE: i32 = 0;

    pub fn new() -> Self {
        Self {
            default_min_value: Self::DEFAULT_MIN_VALUE,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
