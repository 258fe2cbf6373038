//! Die template loader.
//!
//! Loads die templates from RON data files and resolves their affix
//! references against an [`AffixRegistry`].

use std::collections::HashMap;

use dice_core::{Die, DieId, DieSize, Element};
use serde::{Deserialize, Serialize};

use crate::loaders::{AffixRegistry, LoadResult};

/// Die template structure for RON files.
///
/// Affixes are referenced by name; resolution happens at registry build
/// time so one affix definition can be shared by many templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DieTemplateSpec {
    pub name: String,
    pub size: DieSize,
    #[serde(default)]
    pub element: Element,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub affixes: Vec<String>,
}

/// Die catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DieCatalog {
    pub dice: Vec<DieTemplateSpec>,
}

/// Registry for die templates.
#[derive(Debug, Clone)]
pub struct DieTemplateRegistry {
    templates: HashMap<String, Die>,
}

impl DieTemplateRegistry {
    /// Loads all die templates from embedded RON data files, resolving
    /// affix references.
    ///
    /// A template referencing an unknown affix keeps its other affixes; the
    /// dangling reference is logged and skipped, never fatal.
    pub fn load(affixes: &AffixRegistry) -> LoadResult<Self> {
        let basic_ron = include_str!("../../data/dice/basic.ron");
        let catalog: DieCatalog = ron::from_str(basic_ron)
            .map_err(|e| anyhow::anyhow!("Failed to parse basic.ron: {}", e))?;

        let mut templates = HashMap::new();
        for spec in catalog.dice {
            let die = build_template(&spec, affixes);
            templates.insert(spec.name, die);
        }

        Ok(Self { templates })
    }

    /// Gets a die template by name.
    ///
    /// The returned die carries placeholder identity; `DicePool::add_template`
    /// assigns the real one.
    pub fn get(&self, name: &str) -> Option<Die> {
        self.templates.get(name).cloned()
    }

    /// Returns an iterator over all registered template names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Returns the number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn build_template(spec: &DieTemplateSpec, affixes: &AffixRegistry) -> Die {
    let mut die = Die::new(DieId(0), spec.size, spec.element);
    for tag in &spec.tags {
        if !die.tags.add(tag) {
            tracing::warn!(template = %spec.name, %tag, "tag dropped (duplicate or full set)");
        }
    }
    for name in &spec.affixes {
        match affixes.get(name) {
            Some(rule) => die.rules.push(rule.clone()),
            None => {
                tracing::warn!(template = %spec.name, affix = %name, "unknown affix reference");
            }
        }
    }
    die
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_templates_with_resolved_affixes() {
        let affixes = AffixRegistry::load().expect("affix catalogs");
        let registry = DieTemplateRegistry::load(&affixes).expect("die catalog");

        assert!(registry.len() >= 4, "expected a populated die catalog");

        let ember = registry.get("ember_d6").expect("ember_d6 missing");
        assert_eq!(ember.size, DieSize::D6);
        assert_eq!(ember.element, Element::Fire);
        assert!(!ember.rules.is_empty(), "affix references must resolve");
    }

    #[test]
    fn unknown_affix_references_degrade_to_skips() {
        let affixes = AffixRegistry::load().expect("affix catalogs");
        let spec = DieTemplateSpec {
            name: "broken".into(),
            size: DieSize::D6,
            element: Element::Neutral,
            tags: vec![],
            affixes: vec!["does_not_exist".into(), "steady_plus_two".into()],
        };
        let die = build_template(&spec, &affixes);
        assert_eq!(die.rules.len(), 1);
    }
}
