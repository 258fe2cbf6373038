//! Die sizes and the upgrade ladder.

/// Face-count type of a die.
///
/// Sizes form a fixed ladder (D4 → D20); type-change effects step along it
/// and clamp at both ends.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DieSize {
    D4,
    #[default]
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieSize {
    /// Ladder order used by relative type changes.
    pub const LADDER: [DieSize; 6] = [
        DieSize::D4,
        DieSize::D6,
        DieSize::D8,
        DieSize::D10,
        DieSize::D12,
        DieSize::D20,
    ];

    /// Number of faces.
    pub const fn faces(self) -> u32 {
        match self {
            DieSize::D4 => 4,
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
            DieSize::D20 => 20,
        }
    }

    fn ladder_index(self) -> usize {
        // LADDER is small enough that a linear scan beats a lookup table.
        Self::LADDER.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Steps up the ladder by `steps`, clamping at D20.
    #[must_use]
    pub fn step_up(self, steps: u8) -> Self {
        let idx = (self.ladder_index() + steps as usize).min(Self::LADDER.len() - 1);
        Self::LADDER[idx]
    }

    /// Steps down the ladder by `steps`, clamping at D4.
    #[must_use]
    pub fn step_down(self, steps: u8) -> Self {
        let idx = self.ladder_index().saturating_sub(steps as usize);
        Self::LADDER[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_up_clamps_at_top() {
        assert_eq!(DieSize::D6.step_up(1), DieSize::D8);
        assert_eq!(DieSize::D12.step_up(3), DieSize::D20);
        assert_eq!(DieSize::D20.step_up(1), DieSize::D20);
    }

    #[test]
    fn step_down_clamps_at_bottom() {
        assert_eq!(DieSize::D8.step_down(1), DieSize::D6);
        assert_eq!(DieSize::D4.step_down(2), DieSize::D4);
    }
}
