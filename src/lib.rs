// src/lib.rs

pub mod config;
pub mod core;
pub mod curation;
pub mod exchange;
pub mod history;
pub mod persistence;
pub mod picker;
pub use crate::core::engine::VocabularyManager;
pub use crate::core::types::{ManualOrder, OptionSet, VocabularyKey, VocabularyState};
pub use crate::persistence::{FileStore, KeyValueStore, MemoryStore, StoreError};
