// File: src/core/frequency.rs
use std::collections::HashMap;

/// Occurrence counts of a field's values across the live record set.
/// Always rebuilt from the caller's values; never persisted.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    /// (value, count) in first-seen order.
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    /// Counts exact-string occurrences. O(n) in the number of values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for value in values {
            table.record(value.as_ref());
        }
        table
    }

    fn record(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.index.get(value) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push((value.to_string(), 1));
            }
        }
    }

    pub fn count(&self, value: &str) -> u64 {
        self.index.get(value).map_or(0, |&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values by descending count. The sort is stable over first-seen
    /// order, so equal counts keep the order they appeared in.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .entries
            .iter()
            .map(|(value, count)| (value.as_str(), *count))
            .collect();
        ranked.sort_by_key(|&(_, count)| std::cmp::Reverse(count));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_count_descending() {
        let table = FrequencyTable::from_values(["a", "a", "b", "a", "c", "b"]);
        assert_eq!(table.ranked(), vec![("a", 3), ("b", 2), ("c", 1)]);
        assert_eq!(table.count("b"), 2);
        assert_eq!(table.count("z"), 0);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let table = FrequencyTable::from_values(["flint", "bone", "shell", "bone", "flint", "shell"]);
        let values: Vec<&str> = table.ranked().into_iter().map(|(v, _)| v).collect();
        assert_eq!(values, ["flint", "bone", "shell"]);
    }

    #[test]
    fn counting_is_case_sensitive_and_skips_empty() {
        let table = FrequencyTable::from_values(["Jade", "jade", "", "Jade"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.count("Jade"), 2);
        assert_eq!(table.count("jade"), 1);
    }
}
