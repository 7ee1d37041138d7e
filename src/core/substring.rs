// File: src/core/substring.rs
//! Substring lookup over dictionary entries.
//!
//! The engine only depends on [`SubstringIndex`]. [`SuffixArrayIndex`] is the
//! default implementation: entries are concatenated with a sentinel byte after
//! each one, and every suffix that starts on a character boundary is sorted.
//! A query then resolves to one contiguous run of suffixes found by binary search.

use std::collections::BTreeSet;

/// Finds every dictionary entry that contains a query as a contiguous substring.
pub trait SubstringIndex: Send + Sync {
    /// Verbatim entries containing `query`. No ordering guarantee.
    fn find_entries(&self, query: &str) -> Vec<String>;

    /// Number of distinct entries indexed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const SENTINEL: u8 = 0;

#[derive(Debug, Clone, Copy)]
struct Suffix {
    pos: usize,
    entry: usize,
}

/// Case-sensitive, byte-exact substring index backed by a suffix array.
#[derive(Debug, Clone, Default)]
pub struct SuffixArrayIndex {
    /// Entries joined with `SENTINEL` after each one.
    text: Vec<u8>,
    /// Byte range of each entry inside `text`.
    bounds: Vec<(usize, usize)>,
    entries: Vec<String>,
    suffixes: Vec<Suffix>,
}

impl SuffixArrayIndex {
    pub fn build<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let mut index = Self::default();

        for entry in entries {
            let entry = entry.as_ref();
            // Entries containing the sentinel could never be matched correctly.
            if entry.as_bytes().contains(&SENTINEL) || !seen.insert(entry.to_string()) {
                continue;
            }
            let start = index.text.len();
            index.text.extend_from_slice(entry.as_bytes());
            index.bounds.push((start, index.text.len()));
            index.text.push(SENTINEL);
            index.entries.push(entry.to_string());
        }

        for (id, &(start, end)) in index.bounds.iter().enumerate() {
            for pos in start..end {
                // Skip UTF-8 continuation bytes; a valid query never starts inside a character.
                if index.text[pos] & 0xC0 != 0x80 {
                    index.suffixes.push(Suffix { pos, entry: id });
                }
            }
        }

        let text = &index.text;
        let bounds = &index.bounds;
        index
            .suffixes
            .sort_unstable_by(|a, b| suffix_bytes(text, bounds, a).cmp(suffix_bytes(text, bounds, b)));
        index
    }

    fn suffix(&self, s: &Suffix) -> &[u8] {
        suffix_bytes(&self.text, &self.bounds, s)
    }
}

fn suffix_bytes<'a>(text: &'a [u8], bounds: &[(usize, usize)], s: &Suffix) -> &'a [u8] {
    &text[s.pos..bounds[s.entry].1]
}

impl SubstringIndex for SuffixArrayIndex {
    fn find_entries(&self, query: &str) -> Vec<String> {
        let needle = query.as_bytes();
        let lower = self.suffixes.partition_point(|s| self.suffix(s) < needle);
        let run = self.suffixes[lower..].partition_point(|s| self.suffix(s).starts_with(needle));

        let ids: BTreeSet<usize> = self.suffixes[lower..lower + run]
            .iter()
            .map(|s| s.entry)
            .collect();
        ids.into_iter().map(|id| self.entries[id].clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn finds_entries_containing_query() {
        let index = SuffixArrayIndex::build(["atomic", "tom", "bottom", "cat"]);
        assert_eq!(sorted(index.find_entries("tom")), vec!["atomic", "bottom", "tom"]);
        assert_eq!(index.find_entries("cat"), vec!["cat"]);
        assert_eq!(sorted(index.find_entries("t")).len(), 4);
    }

    #[test]
    fn match_does_not_cross_entry_boundaries() {
        let index = SuffixArrayIndex::build(["ab", "cd"]);
        assert!(index.find_entries("bc").is_empty());
        assert!(index.find_entries("abc").is_empty());
    }

    #[test]
    fn is_case_sensitive_and_handles_multi_word_entries() {
        let index = SuffixArrayIndex::build(["New York", "newt"]);
        assert_eq!(index.find_entries("w Y"), vec!["New York"]);
        assert_eq!(index.find_entries("new"), vec!["newt"]);
    }

    #[test]
    fn duplicates_are_reported_once() {
        let index = SuffixArrayIndex::build(["zzzz", "zzzz", "zz"]);
        assert_eq!(index.len(), 2);
        assert_eq!(sorted(index.find_entries("zz")), vec!["zz", "zzzz"]);
    }

    #[test]
    fn unicode_entries_match_on_character_boundaries() {
        let index = SuffixArrayIndex::build(["café", "éclair"]);
        assert_eq!(sorted(index.find_entries("é")), vec!["café", "éclair"]);
        assert_eq!(index.find_entries("fé"), vec!["café"]);
    }

    #[test]
    fn unknown_query_matches_nothing() {
        let index = SuffixArrayIndex::build(["alpha"]);
        assert!(index.find_entries("beta").is_empty());
        assert!(index.find_entries("\0").is_empty());
        assert!(SuffixArrayIndex::build(Vec::<String>::new()).is_empty());
    }
}
