// File: src/core/dictionary.rs
use crate::core::signature::SignatureIndex;

/// An immutable word list together with its letter-signature index.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<String>,
    signatures: SignatureIndex,
}

impl Dictionary {
    /// Entries are trimmed; blank lines are dropped.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<String> = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        let signatures = SignatureIndex::from_entries(&entries);
        Self { entries, signatures }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn signatures(&self) -> &SignatureIndex {
        &self.signatures
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
