// File: src/curation.rs
use crate::core::types::{ManualOrder, VocabularyState};

/// A user edit to one field's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Curation {
    Add(String),
    Remove(String),
    Reorder(Vec<String>),
}

/// Applies curation edits to the in-memory pair. Persisting is the caller's job.
pub struct CurationEngine;

impl CurationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if the state changed and needs to be written.
    pub fn apply(&self, state: &mut VocabularyState, curation: &Curation) -> bool {
        match curation {
            Curation::Add(value) => self.add(state, value),
            Curation::Remove(value) => self.remove(state, value),
            Curation::Reorder(sequence) => self.reorder(state, sequence),
        }
    }

    fn add(&self, state: &mut VocabularyState, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || state.options.contains(value) {
            return false;
        }
        state.options.insert(value);
        state.order.push_front(value);
        true
    }

    fn remove(&self, state: &mut VocabularyState, value: &str) -> bool {
        let in_options = state.options.remove(value);
        let in_order = state.order.remove(value);
        in_options || in_order
    }

    fn reorder(&self, state: &mut VocabularyState, sequence: &[String]) -> bool {
        let order = ManualOrder::from_sequence(sequence.iter().cloned());
        if order == state.order {
            return false;
        }
        state.order = order;
        true
    }
}

impl Default for CurationEngine {
    fn default() -> Self {
        Self::new()
    }
}
