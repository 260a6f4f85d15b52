// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Storage-key prefix for a field's explicitly added values.
pub const OPTIONS_PREFIX: &str = "custom_opts_";
/// Storage-key prefix for a field's user-dragged ordering.
pub const ORDER_PREFIX: &str = "custom_order_";

/// Identifies one logical field (e.g. `siteName`, `material`).
/// Keys are fully isolated from each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyKey(String);

impl VocabularyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn options_storage_key(&self) -> String {
        format!("{}{}", OPTIONS_PREFIX, self.0)
    }

    pub fn order_storage_key(&self) -> String {
        format!("{}{}", ORDER_PREFIX, self.0)
    }

    /// Recovers the vocabulary key from either derived storage key.
    pub fn from_storage_key(storage_key: &str) -> Option<Self> {
        storage_key
            .strip_prefix(OPTIONS_PREFIX)
            .or_else(|| storage_key.strip_prefix(ORDER_PREFIX))
            .filter(|rest| !rest.is_empty())
            .map(Self::new)
    }
}

impl fmt::Display for VocabularyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VocabularyKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for VocabularyKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// All values the user explicitly added to a field.
/// Membership is case-sensitive; iteration order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeSet<String>);

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    /// Returns `false` if the value was already present.
    pub fn insert(&mut self, value: &str) -> bool {
        self.0.insert(value.to_string())
    }

    pub fn remove(&mut self, value: &str) -> bool {
        self.0.remove(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for OptionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// User-curated ordering. Never holds duplicates; membership in the
/// option set is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualOrder(Vec<String>);

impl ManualOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an order from an arbitrary sequence, dropping empty entries
    /// and any repeat of an earlier entry.
    pub fn from_sequence<I, S>(sequence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Self::new();
        for value in sequence {
            let value = value.into();
            if !value.is_empty() && !order.contains(&value) {
                order.0.push(value);
            }
        }
        order
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    /// Moves (or inserts) the value to the front.
    pub fn push_front(&mut self, value: &str) {
        self.remove(value);
        self.0.insert(0, value.to_string());
    }

    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != value);
        before != self.0.len()
    }

    /// Appends the value unless it is already present.
    pub fn push_back(&mut self, value: &str) {
        if !value.is_empty() && !self.contains(value) {
            self.0.push(value.to_string());
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The persisted pair for one key. Mutations always touch both halves together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyState {
    pub options: OptionSet,
    pub order: ManualOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_derived_from_the_field_name() {
        let key = VocabularyKey::new("siteName");
        assert_eq!(key.options_storage_key(), "custom_opts_siteName");
        assert_eq!(key.order_storage_key(), "custom_order_siteName");
        assert_eq!(VocabularyKey::from_storage_key("custom_order_siteName"), Some(key));
        assert_eq!(VocabularyKey::from_storage_key("custom_opts_"), None);
        assert_eq!(VocabularyKey::from_storage_key("theme"), None);
    }

    #[test]
    fn manual_order_drops_empties_and_repeats() {
        let order = ManualOrder::from_sequence(["b", "", "a", "b", "c", "a"]);
        assert_eq!(order.as_slice(), ["b", "a", "c"]);
    }

    #[test]
    fn push_front_moves_existing_entry() {
        let mut order = ManualOrder::from_sequence(["a", "b", "c"]);
        order.push_front("c");
        assert_eq!(order.as_slice(), ["c", "a", "b"]);
    }

    #[test]
    fn option_set_is_case_sensitive() {
        let mut options = OptionSet::new();
        assert!(options.insert("Jade"));
        assert!(options.insert("jade"));
        assert!(!options.insert("Jade"));
        assert_eq!(options.len(), 2);
    }
}
