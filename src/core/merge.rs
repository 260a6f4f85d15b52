// File: src/core/merge.rs
use crate::core::frequency::FrequencyTable;
use crate::core::types::VocabularyState;
use std::collections::HashSet;

/// Builds the unfiltered candidate list in three tiers:
/// manual order first, then frequency ranking, then remaining added options.
/// The first occurrence of a value wins; identity is case-sensitive.
pub fn merge_tiers(state: &VocabularyState, frequencies: &FrequencyTable) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(state.order.len() + frequencies.len() + state.options.len());

    let ranked = frequencies.ranked();
    let tiers = state
        .order
        .iter()
        .chain(ranked.iter().map(|&(value, _)| value))
        .chain(state.options.iter());

    for value in tiers {
        if !value.is_empty() && seen.insert(value) {
            merged.push(value.to_string());
        }
    }
    merged
}

/// Whether any entry equals the query ignoring case.
pub fn has_exact_match(entries: &[String], query: &str) -> bool {
    let query = query.to_lowercase();
    entries.iter().any(|entry| entry.to_lowercase() == query)
}

/// Narrows the merged list to case-insensitive substring matches.
/// An empty query, or one that exactly names an entry, keeps the full list.
pub fn filter_by_query(merged: Vec<String>, query: &str) -> Vec<String> {
    if query.is_empty() || has_exact_match(&merged, query) {
        return merged;
    }
    let needle = query.to_lowercase();
    merged
        .into_iter()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ManualOrder, OptionSet};

    fn state(order: &[&str], options: &[&str]) -> VocabularyState {
        VocabularyState {
            options: options.iter().map(|s| s.to_string()).collect::<OptionSet>(),
            order: ManualOrder::from_sequence(order.iter().copied()),
        }
    }

    #[test]
    fn manual_order_precedes_frequency_which_precedes_options() {
        let freq = FrequencyTable::from_values(["a", "a", "b", "a", "c", "b"]);
        let merged = merge_tiers(&state(&["c"], &["z", "b"]), &freq);
        assert_eq!(merged, ["c", "a", "b", "z"]);
    }

    #[test]
    fn filter_is_substring_and_case_insensitive() {
        let merged = vec!["amphora".to_string(), "Amulet".to_string(), "bone".to_string()];
        assert_eq!(filter_by_query(merged, "aM"), ["amphora", "Amulet"]);
    }

    #[test]
    fn filter_matches_inside_words() {
        let merged = vec!["red slip".to_string(), "black slip".to_string(), "plain".to_string()];
        assert_eq!(filter_by_query(merged, "slip"), ["red slip", "black slip"]);
    }

    #[test]
    fn exact_match_keeps_everything() {
        let merged = vec!["Jade".to_string(), "jadeite".to_string(), "bone".to_string()];
        assert_eq!(filter_by_query(merged.clone(), "jade"), merged);
    }
}
