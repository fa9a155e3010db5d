use std::collections::HashMap;

/// Mapping from word (exact byte sequence) to occurrence count.
///
/// Comparison is byte-for-byte: no case folding, no normalization, so
/// `"Cat"`, `"cat"` and `"CAT"` are three distinct entries. One table
/// exists per worker slot and accumulates across every batch that slot
/// participates in; a final merged table is produced once at end of run.
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    counts: HashMap<Box<[u8]>, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `word`: insert with zero if absent, then
    /// increment. Only copies the word bytes on first sighting.
    pub fn add(&mut self, word: &[u8]) {
        if let Some(count) = self.counts.get_mut(word) {
            *count += 1;
        } else {
            self.counts.insert(word.into(), 1);
        }
    }

    /// Occurrence count for `word`, zero if never seen.
    pub fn get(&self, word: &[u8]) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the total number of tokens observed.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.counts.iter().map(|(word, &count)| (word.as_ref(), count))
    }

    /// Fold another table into this one by summing counts per word.
    pub fn absorb(&mut self, other: FrequencyTable) {
        for (word, count) in other.counts {
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    /// Consume the table into a deterministically ordered listing:
    /// descending count, ties broken by ascending byte order.
    pub fn into_sorted(self) -> Vec<(Box<[u8]>, u64)> {
        let mut entries: Vec<(Box<[u8]>, u64)> = self.counts.into_iter().collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

/// Combine per-slot tables into the global table.
///
/// Commutative and associative: the result does not depend on the order
/// the tables are folded in, because `absorb` only ever sums counts for
/// identical byte keys.
pub fn merge(tables: impl IntoIterator<Item = FrequencyTable>) -> FrequencyTable {
    let mut global = FrequencyTable::new();
    for table in tables {
        global.absorb(table);
    }
    global
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(words: &[&str]) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for word in words {
            table.add(word.as_bytes());
        }
        table
    }

    #[test]
    fn add_counts_repeats() {
        let table = table_of(&["the", "quick", "the"]);
        assert_eq!(table.get(b"the"), 2);
        assert_eq!(table.get(b"quick"), 1);
        assert_eq!(table.get(b"missing"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn words_are_case_sensitive() {
        let table = table_of(&["Cat", "cat", "CAT"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(b"Cat"), 1);
        assert_eq!(table.get(b"cat"), 1);
        assert_eq!(table.get(b"CAT"), 1);
    }

    #[test]
    fn absorb_sums_overlapping_words() {
        let mut left = table_of(&["a", "b", "a"]);
        let right = table_of(&["b", "c"]);
        left.absorb(right);
        assert_eq!(left.get(b"a"), 2);
        assert_eq!(left.get(b"b"), 2);
        assert_eq!(left.get(b"c"), 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let slots = [
            table_of(&["x", "y"]),
            table_of(&["y", "z", "z"]),
            table_of(&["x"]),
        ];

        let forward = merge(slots.clone());
        let backward = merge(slots.into_iter().rev());

        assert_eq!(forward.into_sorted(), backward.into_sorted());
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let global = merge(std::iter::empty());
        assert!(global.is_empty());
        assert_eq!(global.total(), 0);
    }

    #[test]
    fn sorted_output_orders_by_count_then_bytes() {
        let table = table_of(&["bee", "ant", "bee", "cow", "ant", "bee"]);
        let sorted = table.into_sorted();
        let listing: Vec<(&[u8], u64)> =
            sorted.iter().map(|(w, c)| (w.as_ref(), *c)).collect();
        assert_eq!(
            listing,
            vec![(&b"bee"[..], 3), (&b"ant"[..], 2), (&b"cow"[..], 1)]
        );
    }
}
