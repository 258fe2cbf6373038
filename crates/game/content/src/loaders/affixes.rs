//! Affix definition loader.
//!
//! Loads affix rules from RON data files.

use std::collections::HashMap;

use dice_core::{AffixRule, EngineConfig, RuleBody, ValueSource};
use serde::{Deserialize, Serialize};

use crate::loaders::LoadResult;

/// Affix catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffixCatalog {
    pub affixes: Vec<AffixRule>,
}

/// Registry for affix rules.
///
/// Loads AffixRule data from RON files and provides lookup by name.
#[derive(Debug, Clone)]
pub struct AffixRegistry {
    affixes: HashMap<String, AffixRule>,
}

impl AffixRegistry {
    /// Loads all affix definitions from embedded RON data files.
    pub fn load() -> LoadResult<Self> {
        let mut affixes = HashMap::new();

        // Value and reroll affixes (flat/percent bonuses, floors, rerolls).
        let value_ron = include_str!("../../data/affixes/value.ron");
        Self::merge(&mut affixes, value_ron, "value.ron")?;

        // Combat-facing affixes (splash, chain, statuses, mana).
        let combat_ron = include_str!("../../data/affixes/combat.ron");
        Self::merge(&mut affixes, combat_ron, "combat.ron")?;

        // Compound affixes (multi-effect units with snapshot semantics).
        let compound_ron = include_str!("../../data/affixes/compound.ron");
        Self::merge(&mut affixes, compound_ron, "compound.ron")?;

        Ok(Self { affixes })
    }

    fn merge(
        affixes: &mut HashMap<String, AffixRule>,
        source: &str,
        file: &str,
    ) -> LoadResult<()> {
        let catalog: AffixCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", file, e))?;
        for affix in catalog.affixes {
            if let Some(reason) = validate(&affix) {
                tracing::warn!(affix = %affix.name, %reason, "skipping invalid affix");
                continue;
            }
            if affixes.insert(affix.name.clone(), affix).is_some() {
                tracing::warn!(file, "duplicate affix name overwrote an earlier definition");
            }
        }
        Ok(())
    }

    /// Gets an affix by name.
    pub fn get(&self, name: &str) -> Option<&AffixRule> {
        self.affixes.get(name)
    }

    /// Returns an iterator over all registered affix names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.affixes.keys().map(String::as_str)
    }

    /// Returns the number of registered affixes.
    pub fn len(&self) -> usize {
        self.affixes.len()
    }

    /// Returns true if no affixes are registered.
    pub fn is_empty(&self) -> bool {
        self.affixes.is_empty()
    }
}

/// Checks content-level constraints a rule must satisfy.
///
/// Returns a human-readable reason when the rule is unusable.
fn validate(affix: &AffixRule) -> Option<&'static str> {
    let snapshot_only = |value: &ValueSource| {
        matches!(
            value,
            ValueSource::ParentTargetValue
                | ValueSource::ParentTargetPercent
                | ValueSource::SnapshotTargetValue
                | ValueSource::SnapshotTargetPercent
        )
    };

    match &affix.body {
        // Snapshot-backed sources only exist inside compound rules.
        RuleBody::Single(spec) if snapshot_only(&spec.value) => {
            Some("snapshot value source outside a compound rule")
        }
        RuleBody::Compound(subs) if subs.is_empty() => Some("compound rule with no sub-effects"),
        RuleBody::Compound(subs) if subs.len() > EngineConfig::MAX_SUB_EFFECTS => {
            Some("compound rule exceeds the sub-effect cap")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_core::{EffectKind, EffectSpec, RuleTrigger};

    #[test]
    fn loads_embedded_affix_catalogs() {
        let registry = AffixRegistry::load().expect("Failed to load affix catalogs");

        assert!(registry.len() >= 10, "expected a populated registry");

        // Spot-check one rule per file.
        let steady = registry.get("steady_plus_two").expect("value affix missing");
        assert_eq!(steady.trigger, RuleTrigger::OnRoll);

        assert!(registry.get("splash_on_use").is_some());
        assert!(registry.get("twin_swap").is_some());
    }

    #[test]
    fn validate_rejects_top_level_snapshot_sources() {
        let bad = AffixRule::single(
            "bad",
            RuleTrigger::OnRoll,
            EffectSpec::sourced(
                EffectKind::ModifyValueFlat,
                ValueSource::SnapshotTargetValue,
                0,
            ),
        );
        assert!(validate(&bad).is_some());
    }
}
