// File: src/picker.rs
//! Session state of one "smart select" input: the free-text query, the
//! candidates currently shown and the highlighted row.

use crate::core::engine::VocabularyManager;
use crate::core::types::VocabularyKey;
use crate::persistence::KeyValueStore;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    /// Rows cannot be dragged while the list is narrowed by a query,
    /// since the visible subset does not reflect the full ordering.
    #[error("cannot reorder while filtering by {0:?}")]
    FilteringActive(String),

    #[error("row {index} is out of range ({len} rows shown)")]
    OutOfRange { index: usize, len: usize },

    #[error("nothing to add")]
    EmptyValue,

    /// The row comes from the record history, not from curated options.
    #[error("'{0}' is not a saved option")]
    NotCurated(String),
}

pub struct Picker<'a, S: KeyValueStore> {
    manager: &'a VocabularyManager<S>,
    key: VocabularyKey,
    history: Vec<String>,
    query: String,
    candidates: Vec<String>,
    selected: Option<usize>,
}

impl<'a, S: KeyValueStore> Picker<'a, S> {
    pub fn new(manager: &'a VocabularyManager<S>, key: impl Into<VocabularyKey>) -> Self {
        let mut picker = Self {
            manager,
            key: key.into(),
            history: Vec::new(),
            query: String::new(),
            candidates: Vec::new(),
            selected: None,
        };
        picker.refresh();
        picker
    }

    pub fn key(&self) -> &VocabularyKey {
        &self.key
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|i| self.candidates[i].as_str())
    }

    pub fn is_filtering(&self) -> bool {
        !self.query.is_empty()
    }

    /// Replaces the field values taken from the current record set.
    pub fn set_history(&mut self, history: Vec<String>) {
        self.history = history;
        self.refresh();
    }

    /// Surrounding whitespace is dropped, matching what `add_current_query` saves.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.trim().to_string();
        self.refresh();
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    /// Recomputes the candidates. Drops the highlight.
    pub fn refresh(&mut self) {
        self.candidates = self
            .manager
            .get_display_list(self.key.as_str(), &self.query, &self.history);
        self.selected = None;
    }

    pub fn offers_add(&self) -> bool {
        self.manager
            .should_offer_add(self.key.as_str(), &self.query, &self.history)
    }

    pub fn select(&mut self, index: usize) -> Result<&str, PickerError> {
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(self.candidates[index].as_str())
    }

    /// Takes the highlighted candidate, or the typed text if nothing is
    /// highlighted, and resets the query. `None` when both are empty.
    pub fn commit(&mut self) -> Option<String> {
        let value = match self.selected {
            Some(index) => self.candidates[index].clone(),
            None => self.query.trim().to_string(),
        };
        self.clear_query();
        (!value.is_empty()).then_some(value)
    }

    /// Stores the typed text as a new option for this field.
    pub fn add_current_query(&mut self) -> Result<String, PickerError> {
        let value = self.query.trim().to_string();
        if value.is_empty() {
            return Err(PickerError::EmptyValue);
        }
        self.manager.add_option(self.key.as_str(), &value);
        self.clear_query();
        Ok(value)
    }

    /// Removes the candidate at `index` from the field's curated options.
    /// Rows that only come from the record history cannot be removed.
    pub fn remove(&mut self, index: usize) -> Result<String, PickerError> {
        self.check_index(index)?;
        let value = self.candidates[index].clone();
        if !self.manager.remove_option(self.key.as_str(), &value) {
            return Err(PickerError::NotCurated(value));
        }
        self.refresh();
        Ok(value)
    }

    /// Moves the row at `from` to position `to` and saves the whole
    /// displayed list as the field's manual order.
    pub fn drag(&mut self, from: usize, to: usize) -> Result<(), PickerError> {
        if self.is_filtering() {
            return Err(PickerError::FilteringActive(self.query.clone()));
        }
        self.check_index(from)?;
        self.check_index(to)?;

        let mut sequence = self.candidates.clone();
        let moved = sequence.remove(from);
        sequence.insert(to, moved);
        self.manager.reorder(self.key.as_str(), &sequence);
        self.refresh();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), PickerError> {
        if index < self.candidates.len() {
            Ok(())
        } else {
            Err(PickerError::OutOfRange {
                index,
                len: self.candidates.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn history(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn drag_is_refused_while_filtering() {
        let manager = VocabularyManager::new(MemoryStore::new());
        let mut picker = Picker::new(&manager, "material");
        picker.set_history(history(&["bone", "flint", "bone"]));
        picker.set_query("o");

        assert_eq!(
            picker.drag(0, 1),
            Err(PickerError::FilteringActive("o".to_string()))
        );
        assert!(manager.manual_order("material").is_empty());
    }

    #[test]
    fn drag_saves_displayed_order() {
        let manager = VocabularyManager::new(MemoryStore::new());
        let mut picker = Picker::new(&manager, "material");
        picker.set_history(history(&["bone", "bone", "flint", "shell"]));
        assert_eq!(picker.candidates(), ["bone", "flint", "shell"]);

        picker.drag(2, 0).unwrap();
        assert_eq!(picker.candidates(), ["shell", "bone", "flint"]);
        assert_eq!(manager.manual_order("material").as_slice(), ["shell", "bone", "flint"]);
        assert!(manager.options("material").is_empty());
    }

    #[test]
    fn drag_rejects_bad_rows() {
        let manager = VocabularyManager::new(MemoryStore::new());
        let mut picker = Picker::new(&manager, "material");
        assert_eq!(picker.drag(0, 0), Err(PickerError::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn add_then_commit_flow() {
        let manager = VocabularyManager::new(MemoryStore::new());
        let mut picker = Picker::new(&manager, "finder");
        picker.set_query("  K. Kenyon ");
        assert!(picker.offers_add());
        assert_eq!(picker.add_current_query().unwrap(), "K. Kenyon");
        assert_eq!(picker.candidates(), ["K. Kenyon"]);

        assert_eq!(picker.selected(), None);
        picker.select(0).unwrap();
        assert_eq!(picker.selected(), Some("K. Kenyon"));
        assert_eq!(picker.commit().as_deref(), Some("K. Kenyon"));
        assert_eq!(picker.selected(), None);
        assert_eq!(picker.query(), "");
        assert_eq!(picker.commit(), None);
        assert_eq!(picker.add_current_query(), Err(PickerError::EmptyValue));
    }

    #[test]
    fn commit_without_selection_takes_typed_text() {
        let manager = VocabularyManager::new(MemoryStore::new());
        let mut picker = Picker::new(&manager, "finder");
        picker.set_query(" Petrie ");
        assert_eq!(picker.commit().as_deref(), Some("Petrie"));
    }

    #[test]
    fn trailing_space_does_not_hide_known_entry() {
        let manager = VocabularyManager::new(MemoryStore::new());
        manager.add_option("material", "Jade");
        manager.add_option("material", "bone");
        let mut picker = Picker::new(&manager, "material");

        picker.set_query("Jade ");
        assert_eq!(picker.query(), "Jade");
        assert_eq!(picker.candidates(), ["bone", "Jade"]);
        assert!(!picker.offers_add());

        picker.set_query("jasper ");
        assert!(picker.candidates().is_empty());
        assert!(picker.offers_add());
    }

    #[test]
    fn history_only_row_cannot_be_removed() {
        let manager = VocabularyManager::new(MemoryStore::new());
        manager.add_option("siteName", "Ur");
        let mut picker = Picker::new(&manager, "siteName");
        picker.set_history(history(&["Lagash"]));
        assert_eq!(picker.candidates(), ["Ur", "Lagash"]);

        assert_eq!(
            picker.remove(1),
            Err(PickerError::NotCurated("Lagash".to_string()))
        );
        assert_eq!(picker.candidates(), ["Ur", "Lagash"]);
    }

    #[test]
    fn remove_drops_curated_row() {
        let manager = VocabularyManager::new(MemoryStore::new());
        manager.add_option("siteName", "Ur");
        manager.add_option("siteName", "Uruk");
        let mut picker = Picker::new(&manager, "siteName");
        assert_eq!(picker.remove(0).unwrap(), "Uruk");
        assert_eq!(picker.candidates(), ["Ur"]);
    }
}
