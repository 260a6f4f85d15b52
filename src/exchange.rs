// File: src/exchange.rs
//! Export and import of every field's vocabulary as one JSON document.

use crate::core::engine::VocabularyManager;
use crate::core::types::{ManualOrder, OptionSet, VocabularyKey, VocabularyState};
use crate::persistence::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported bundle format version {found}")]
    UnsupportedVersion { found: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Sorted so exported files are stable.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyBundle {
    pub format_version: u32,
    #[serde(default)]
    pub vocabularies: BTreeMap<VocabularyKey, VocabularyEntry>,
}

impl Default for VocabularyBundle {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            vocabularies: BTreeMap::new(),
        }
    }
}

impl VocabularyBundle {
    pub fn to_json(&self) -> Result<String, ExchangeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, ExchangeError> {
        let bundle: Self = serde_json::from_str(raw)?;
        if bundle.format_version != FORMAT_VERSION {
            return Err(ExchangeError::UnsupportedVersion {
                found: bundle.format_version,
            });
        }
        Ok(bundle)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), ExchangeError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_file(path: &Path) -> Result<Self, ExchangeError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Each imported key's state overwrites the existing state.
    Replace,
    /// Options are unioned; unseen order entries go after the existing order.
    Merge,
}

pub fn export<S: KeyValueStore>(manager: &VocabularyManager<S>, keys: &[VocabularyKey]) -> VocabularyBundle {
    let mut bundle = VocabularyBundle::default();
    for key in keys {
        let options = manager.options(key.as_str());
        let order = manager.manual_order(key.as_str());
        bundle.vocabularies.insert(
            key.clone(),
            VocabularyEntry {
                options: options.iter().map(str::to_string).collect(),
                order: order.as_slice().to_vec(),
            },
        );
    }
    bundle
}

/// Exports every vocabulary that has state in the store.
pub fn export_all<S: KeyValueStore>(manager: &VocabularyManager<S>) -> VocabularyBundle {
    export(manager, &manager.stored_keys())
}

/// Applies a bundle. Returns the number of vocabularies written.
pub fn import<S: KeyValueStore>(
    manager: &VocabularyManager<S>,
    bundle: &VocabularyBundle,
    mode: ImportMode,
) -> Result<usize, ExchangeError> {
    if bundle.format_version != FORMAT_VERSION {
        return Err(ExchangeError::UnsupportedVersion {
            found: bundle.format_version,
        });
    }

    for (key, entry) in &bundle.vocabularies {
        let incoming = VocabularyState {
            options: entry
                .options
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect::<OptionSet>(),
            order: ManualOrder::from_sequence(entry.order.iter().cloned()),
        };
        manager.update_state(key.as_str(), |state| match mode {
            ImportMode::Replace => *state = incoming,
            ImportMode::Merge => merge_into(state, incoming),
        });
    }

    info!(count = bundle.vocabularies.len(), ?mode, "imported vocabularies");
    Ok(bundle.vocabularies.len())
}

fn merge_into(current: &mut VocabularyState, incoming: VocabularyState) {
    for value in incoming.options.iter() {
        current.options.insert(value);
    }
    for value in incoming.order.iter() {
        current.order.push_back(value);
    }
}
