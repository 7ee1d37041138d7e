// File: src/core/signature.rs
use crate::core::types::{signature_of, LetterSignature};
use std::collections::{BTreeSet, HashMap};

/// Maps a letter signature to every dictionary entry that shares it.
/// Built once per dictionary generation and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex {
    /// Words are kept ordered so phrase construction is deterministic.
    groups: HashMap<LetterSignature, BTreeSet<String>>,
}

impl SignatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for entry in entries {
            index.insert(entry.as_ref());
        }
        index
    }

    /// Adds an entry under its signature. Duplicate entries collapse.
    pub fn insert(&mut self, entry: &str) {
        self.groups
            .entry(signature_of(entry))
            .or_default()
            .insert(entry.to_string());
    }

    pub fn lookup(&self, signature: &LetterSignature) -> Option<&BTreeSet<String>> {
        self.groups.get(signature)
    }

    /// Single-word anagrams of `word` (the word itself included, if present).
    pub fn anagrams_of(&self, word: &str) -> Option<&BTreeSet<String>> {
        self.lookup(&signature_of(word))
    }

    pub fn contains(&self, signature: &LetterSignature) -> bool {
        self.groups.contains_key(signature)
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
