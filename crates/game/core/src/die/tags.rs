//! Free-form string tags on dice.
//!
//! Tags are how affixes and modifiers recognize each other across systems
//! ("ember", "lucky", "cursed"). The set is bounded; adding past capacity is
//! a content-configuration problem and is silently ignored rather than
//! failing a pass.

use arrayvec::ArrayVec;

use crate::config::EngineConfig;

/// Bounded set of free-form tags.
///
/// Duplicates are not stored; removal is by exact match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSet {
    tags: ArrayVec<String, { EngineConfig::MAX_TAGS }>,
}

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a tag is present.
    pub fn has(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Adds a tag.
    ///
    /// Returns true if the tag was newly added. A full set ignores the add
    /// and returns false.
    pub fn add(&mut self, tag: &str) -> bool {
        if self.has(tag) || self.tags.is_full() {
            return false;
        }
        self.tags.push(tag.to_owned());
        true
    }

    /// Removes a tag. Returns true if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Removes every tag.
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Iterates over the tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Number of tags present.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if no tags are present.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.add(tag);
        }
        set
    }
}
