use crate::core::frequency::FrequencyTable;
use crate::core::merge::{filter_by_query, merge_tiers};
use crate::core::types::{ManualOrder, OptionSet, VocabularyKey, VocabularyState};
use crate::curation::{Curation, CurationEngine};
use crate::persistence::{KeyValueStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Cached state for one key; `None` until first loaded from the store.
type StateCell = Arc<Mutex<Option<VocabularyState>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps each field's added options and manual ordering, and merges them
/// with frequency rankings into the list an input control shows.
///
/// State is loaded lazily per key and written through to the store on every
/// mutation. A failed write is logged and the in-memory state keeps the
/// change. A failed read shows as empty and is retried on the next access;
/// mutations are skipped until the store reads again. Mutations on one key
/// are serialized; different keys never contend.
pub struct VocabularyManager<S: KeyValueStore> {
    store: S,
    cells: Mutex<HashMap<VocabularyKey, StateCell>>,
    curation: CurationEngine,
}

impl<S: KeyValueStore> VocabularyManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cells: Mutex::new(HashMap::new()),
            curation: CurationEngine::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The candidate list for `key`: manual order, then `history` ranked by
    /// frequency, then the remaining added options, narrowed by `query`
    /// unless the query is empty or names an entry exactly (ignoring case).
    pub fn get_display_list<T: AsRef<str>>(&self, key: &str, query: &str, history: &[T]) -> Vec<String> {
        filter_by_query(self.merged_list(key, history), query)
    }

    /// The display list before any query filtering.
    pub fn merged_list<T: AsRef<str>>(&self, key: &str, history: &[T]) -> Vec<String> {
        let state = self.snapshot(key);
        let frequencies = FrequencyTable::from_values(history);
        merge_tiers(&state, &frequencies)
    }

    /// Whether an input control should offer to add `query` as a new option.
    pub fn should_offer_add<T: AsRef<str>>(&self, key: &str, query: &str, history: &[T]) -> bool {
        let query = query.trim();
        !query.is_empty() && !self.merged_list(key, history).iter().any(|entry| entry == query)
    }

    /// Adds a trimmed, non-empty value and moves it to the top of the manual
    /// order. Blank or already-added values are ignored.
    pub fn add_option(&self, key: &str, value: &str) {
        self.apply(key, Curation::Add(value.to_string()));
    }

    /// Removes the value from both the added options and the manual order.
    /// Returns `false` if it was in neither.
    pub fn remove_option(&self, key: &str, value: &str) -> bool {
        self.apply(key, Curation::Remove(value.to_string()))
    }

    /// Replaces the manual order wholesale. Repeats and empty entries are
    /// dropped. Callers must not reorder while a query filter is active.
    pub fn reorder<T: AsRef<str>>(&self, key: &str, sequence: &[T]) {
        let sequence = sequence.iter().map(|v| v.as_ref().to_string()).collect();
        self.apply(key, Curation::Reorder(sequence));
    }

    pub fn options(&self, key: &str) -> OptionSet {
        self.snapshot(key).options
    }

    pub fn manual_order(&self, key: &str) -> ManualOrder {
        self.snapshot(key).order
    }

    /// Runs `update` on a key's state under the key's lock, then writes it.
    pub fn update_state(&self, key: &str, update: impl FnOnce(&mut VocabularyState)) {
        let key = VocabularyKey::new(key);
        let cell = self.cell(&key);
        let mut guard = lock(&cell);
        let Some(state) = self.loaded(&key, &mut guard) else {
            warn!(key = %key, "store unreadable, vocabulary update skipped");
            return;
        };
        update(&mut *state);
        self.persist(&key, state);
    }

    /// Drops cached state so the next access reads the store again.
    pub fn reload(&self, key: &str) {
        let key = VocabularyKey::new(key);
        *lock(&self.cell(&key)) = None;
    }

    /// Keys with persisted state in the store, sorted.
    pub fn stored_keys(&self) -> Vec<VocabularyKey> {
        let mut keys: Vec<VocabularyKey> = match self.store.keys() {
            Ok(keys) => keys.iter().filter_map(|k| VocabularyKey::from_storage_key(k)).collect(),
            Err(error) => {
                warn!(%error, "could not list stored vocabularies");
                Vec::new()
            }
        };
        keys.sort();
        keys.dedup();
        keys
    }

    fn apply(&self, key: &str, curation: Curation) -> bool {
        let key = VocabularyKey::new(key);
        let cell = self.cell(&key);
        // Held across read, modify and write.
        let mut guard = lock(&cell);
        // Writing a pair built on a failed read would overwrite the stored lists.
        let Some(state) = self.loaded(&key, &mut guard) else {
            warn!(key = %key, ?curation, "store unreadable, vocabulary change skipped");
            return false;
        };
        let changed = self.curation.apply(state, &curation);
        if changed {
            debug!(key = %key, ?curation, "vocabulary changed");
            self.persist(&key, state);
        }
        changed
    }

    /// Empty when the store cannot be read; that result is not cached.
    fn snapshot(&self, key: &str) -> VocabularyState {
        let key = VocabularyKey::new(key);
        let cell = self.cell(&key);
        let mut guard = lock(&cell);
        self.loaded(&key, &mut guard).map(|state| state.clone()).unwrap_or_default()
    }

    /// The cached state, loading it first if needed. `None` if the store
    /// read failed, in which case the slot stays unloaded.
    fn loaded<'g>(
        &self,
        key: &VocabularyKey,
        slot: &'g mut Option<VocabularyState>,
    ) -> Option<&'g mut VocabularyState> {
        if slot.is_none() {
            *slot = Some(self.load_state(key).ok()?);
        }
        slot.as_mut()
    }

    fn cell(&self, key: &VocabularyKey) -> StateCell {
        lock(&self.cells).entry(key.clone()).or_default().clone()
    }

    fn load_state(&self, key: &VocabularyKey) -> Result<VocabularyState, StoreError> {
        let options: Vec<String> = self.load_list(&key.options_storage_key())?;
        let order: Vec<String> = self.load_list(&key.order_storage_key())?;
        debug!(key = %key, options = options.len(), order = order.len(), "loaded vocabulary");
        Ok(VocabularyState {
            options: options.into_iter().filter(|v| !v.is_empty()).collect(),
            order: ManualOrder::from_sequence(order),
        })
    }

    /// A value that is not a JSON string list reads as empty; only a failed
    /// store read is an error.
    fn load_list(&self, storage_key: &str) -> Result<Vec<String>, StoreError> {
        let raw = match self.store.load(storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(error) => {
                warn!(storage_key, %error, "failed to read vocabulary, treating as empty");
                return Err(error);
            }
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|error| {
            warn!(storage_key, %error, "stored vocabulary is not a string list, treating as empty");
            Vec::new()
        }))
    }

    fn persist(&self, key: &VocabularyKey, state: &VocabularyState) {
        self.store_list(&key.options_storage_key(), &state.options);
        self.store_list(&key.order_storage_key(), &state.order);
    }

    fn store_list<T: serde::Serialize>(&self, storage_key: &str, list: &T) {
        let encoded = match serde_json::to_string(list) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(storage_key, %error, "failed to encode vocabulary");
                return;
            }
        };
        if let Err(error) = self.store.store(storage_key, &encoded) {
            warn!(storage_key, %error, "failed to save vocabulary, keeping change in memory only");
        }
    }
}
