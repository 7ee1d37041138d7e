// src/core/types.rs
use std::cmp::Ordering;

/// Separator placed between the words of a multi-word phrase.
pub const WORD_SEPARATOR: char = ' ';

/// The sorted characters of a word or phrase.
/// Two entries share a signature iff they are single-word anagrams of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LetterSignature(String);

impl LetterSignature {
    /// Wraps characters that are already sorted, e.g. a candidate built from a sorted pool.
    pub(crate) fn from_sorted(sorted: String) -> Self {
        debug_assert!(is_sorted(&sorted), "signature must be sorted: {sorted:?}");
        Self(sorted)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for LetterSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the signature of a word: its characters, sorted.
/// Case and internal spaces are kept as-is.
pub fn signature_of(word: &str) -> LetterSignature {
    let mut chars: Vec<char> = word.chars().collect();
    chars.sort_unstable();
    LetterSignature(chars.into_iter().collect())
}

fn is_sorted(s: &str) -> bool {
    let mut prev = None;
    for c in s.chars() {
        if prev.is_some_and(|p| p > c) {
            return false;
        }
        prev = Some(c);
    }
    true
}

/// Ranking key of a phrase.
/// `None` is the sentinel for phrases shorter than two characters and sorts lowest.
pub type SecondLetterKey = Option<char>;

/// The second character of a phrase, or the third if the second is the word separator.
pub fn second_letter_key(phrase: &str) -> SecondLetterKey {
    let mut chars = phrase.chars().skip(1);
    match chars.next() {
        None => None,
        Some(WORD_SEPARATOR) => Some(chars.next().unwrap_or(WORD_SEPARATOR)),
        Some(c) => Some(c),
    }
}

/// Total order used for ranking: second-letter key, then the phrase text to break ties.
pub fn rank_order(a: &str, b: &str) -> Ordering {
    second_letter_key(a)
        .cmp(&second_letter_key(b))
        .then_with(|| a.cmp(b))
}

/// Sorts phrases by [`rank_order`] and keeps the first `limit`.
pub fn rank_and_truncate(phrases: &mut Vec<String>, limit: usize) {
    phrases.sort_unstable_by(|a, b| rank_order(a, b));
    phrases.truncate(limit);
}
