// File: src/history.rs
//! Pulls a field's historical values out of the live record set.

use crate::core::types::VocabularyKey;
use serde_json::Value;

/// Ties a record field to the vocabulary that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: String,
    pub key: VocabularyKey,
}

impl FieldBinding {
    /// Binding whose vocabulary key is the field name itself.
    pub fn same_name(field: &str) -> Self {
        Self {
            field: field.to_string(),
            key: VocabularyKey::new(field),
        }
    }

    pub fn new(field: &str, key: impl Into<VocabularyKey>) -> Self {
        Self {
            field: field.to_string(),
            key: key.into(),
        }
    }

    pub fn values(&self, records: &[Value]) -> Vec<String> {
        field_values(records, &self.field)
    }
}

/// Values of `field` across `records`, in record order.
///
/// Strings are trimmed and numbers use their JSON text. Records without
/// the field, other value types and blank strings are skipped.
pub fn field_values(records: &[Value], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.get(field))
        .filter_map(|value| match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|value| !value.is_empty())
        .collect()
}
