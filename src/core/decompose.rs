// File: src/core/decompose.rs
//! Multi-word anagram decomposition.
//!
//! A letter pool is split into dictionary words by picking a first word from
//! every sub-multiset of the pool that is a known signature, then recursing on
//! the letters left over. Complete results for every residual pool are memoized
//! in a [`DecompositionCache`], which belongs to a single dictionary generation.
//!
//! Only the outermost call of a search ([`Depth::TopLevel`]) keeps its output
//! ranked and truncated, and only there can a first word be pruned. Nested
//! calls return every phrase, because the same residual is shared by many
//! different first words.

use crate::config::{EngineConfig, SearchLimits};
use crate::core::signature::SignatureIndex;
use crate::core::types::{
    rank_and_truncate, second_letter_key, LetterSignature, SecondLetterKey, WORD_SEPARATOR,
};
use crate::error::{BudgetKind, QueryError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Position of a decomposition call within one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Outermost call: output is ranked, truncated and may be pruned.
    TopLevel,
    /// Residual pool: output is complete and unordered.
    Nested,
}

/// A memoized phrase list and the candidates it took to build it.
#[derive(Debug, Clone)]
struct Memo {
    phrases: Arc<[String]>,
    cost: usize,
}

/// Memoized decompositions for one dictionary generation.
#[derive(Debug, Default)]
pub struct DecompositionCache {
    /// Complete phrase lists, keyed by the residual letter string.
    complete: HashMap<String, Memo>,
    /// Ranked and truncated top-level lists. Never served to nested calls.
    ranked: HashMap<String, Memo>,
}

impl DecompositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized letter pools.
    pub fn len(&self) -> usize {
        self.complete.len() + self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complete.is_empty() && self.ranked.is_empty()
    }

    pub fn clear(&mut self) {
        self.complete.clear();
        self.ranked.clear();
    }

    /// Drops every memo once `max_pools` pools are held. Returns whether it did.
    pub fn clear_if_full(&mut self, max_pools: usize) -> bool {
        if self.len() < max_pools {
            return false;
        }
        log::info!("Decomposition cache reached {} pools, clearing", self.len());
        self.clear();
        true
    }
}

/// One search's view of the decomposition machinery.
/// The candidate budget is charged per `Decomposer`, so build one per search.
///
/// A cache hit charges the cost recorded when the pool was first expanded,
/// so whether a search fits its budget never depends on what earlier
/// searches left in the cache.
pub struct Decomposer<'a> {
    index: &'a SignatureIndex,
    cache: &'a mut DecompositionCache,
    max_results: usize,
    pruning: bool,
    limits: SearchLimits,
    candidates_seen: usize,
}

impl<'a> Decomposer<'a> {
    pub fn new(
        index: &'a SignatureIndex,
        cache: &'a mut DecompositionCache,
        config: &EngineConfig,
    ) -> Self {
        Self {
            index,
            cache,
            max_results: config.max_results,
            pruning: config.pruning,
            limits: config.limits,
            candidates_seen: 0,
        }
    }

    /// Candidates charged so far by this search, cached pools included.
    pub fn candidates_seen(&self) -> usize {
        self.candidates_seen
    }

    /// Every phrase whose letters are exactly `letters`.
    /// At top level the result is ranked and holds at most `max_results` phrases.
    pub fn decompose(&mut self, letters: &str, depth: Depth) -> Result<Arc<[String]>> {
        if letters.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }

        let memo = match depth {
            Depth::TopLevel => &self.cache.ranked,
            Depth::Nested => &self.cache.complete,
        };
        if let Some(hit) = memo.get(letters).cloned() {
            self.charge(hit.cost)?;
            return Ok(hit.phrases);
        }

        let before = self.candidates_seen;
        let phrases: Arc<[String]> = self.expand(letters, depth)?.into();
        let memo = Memo {
            phrases: Arc::clone(&phrases),
            cost: self.candidates_seen - before,
        };
        let map = match depth {
            Depth::TopLevel => &mut self.cache.ranked,
            Depth::Nested => &mut self.cache.complete,
        };
        map.insert(letters.to_string(), memo);
        Ok(phrases)
    }

    fn expand(&mut self, letters: &str, depth: Depth) -> Result<Vec<String>> {
        let index = self.index;
        let top = depth == Depth::TopLevel;
        let pool = letter_counts(letters);
        let total = letters.chars().count();
        let mut out: Vec<String> = Vec::new();

        for_each_sub_multiset(&pool, &mut |picked: &[char]| -> Result<()> {
            self.charge(1)?;

            let signature = LetterSignature::from_sorted(picked.iter().collect());
            let Some(words) = index.lookup(&signature) else {
                return Ok(());
            };
            let whole = picked.len() == total;

            if top && self.pruning && out.len() >= self.max_results {
                if let (Some(bound), Some(last)) = (lead_bound(words, whole), out.last()) {
                    if bound > second_letter_key(last) {
                        return Ok(());
                    }
                }
            }

            if whole {
                out.extend(words.iter().cloned());
            } else {
                let rest = self.decompose(&residual(letters, picked), Depth::Nested)?;
                if rest.is_empty() {
                    return Ok(());
                }
                if !top {
                    self.check_phrases(out.len() + words.len() * rest.len())?;
                }
                out.reserve(words.len() * rest.len());
                for word in words {
                    for tail in rest.iter() {
                        out.push(format!("{word}{WORD_SEPARATOR}{tail}"));
                    }
                }
            }

            if top {
                rank_and_truncate(&mut out, self.max_results);
            } else {
                self.check_phrases(out.len())?;
            }
            Ok(())
        })?;

        Ok(out)
    }

    fn charge(&mut self, candidates: usize) -> Result<()> {
        self.candidates_seen = self.candidates_seen.saturating_add(candidates);
        if self.candidates_seen > self.limits.max_candidates {
            return Err(QueryError::BudgetExhausted {
                kind: BudgetKind::Candidates,
                limit: self.limits.max_candidates,
            });
        }
        Ok(())
    }

    fn check_phrases(&self, count: usize) -> Result<()> {
        if count > self.limits.max_phrases {
            return Err(QueryError::BudgetExhausted {
                kind: BudgetKind::Phrases,
                limit: self.limits.max_phrases,
            });
        }
        Ok(())
    }
}

/// Lowest second-letter key any phrase led by one of `words` can have.
/// `None` when some word leaves the key to whatever follows it, so no bound exists.
fn lead_bound(words: &BTreeSet<String>, whole: bool) -> Option<SecondLetterKey> {
    let mut bound: Option<SecondLetterKey> = None;
    for word in words {
        let key = if whole {
            second_letter_key(word)
        } else {
            let mut chars = word.chars().skip(1);
            match chars.next() {
                None => return None,
                Some(WORD_SEPARATOR) => Some(chars.next()?),
                Some(c) => Some(c),
            }
        };
        bound = Some(bound.map_or(key, |b| b.min(key)));
    }
    bound
}

/// Distinct letters of `letters` in sorted order, with their multiplicities.
fn letter_counts(letters: &str) -> Vec<(char, usize)> {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    for c in letters.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// `letters` with one occurrence of every picked letter removed, order preserved.
fn residual(letters: &str, picked: &[char]) -> String {
    let mut remaining: Vec<char> = letters.chars().collect();
    for c in picked {
        if let Some(pos) = remaining.iter().position(|r| r == c) {
            remaining.remove(pos);
        }
    }
    remaining.into_iter().collect()
}

/// Visits every distinct non-empty sub-multiset of `pool` as a sorted slice.
/// Smaller sizes come first; within a size, sub-multisets come in lexicographic
/// order. This is the order `combinations` of the sorted pool yields once
/// repeated tuples are dropped.
fn for_each_sub_multiset<E>(
    pool: &[(char, usize)],
    visit: &mut dyn FnMut(&[char]) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    // available_from[i]: letters at positions i.. of the pool.
    let mut available_from = vec![0; pool.len() + 1];
    for i in (0..pool.len()).rev() {
        available_from[i] = available_from[i + 1] + pool[i].1;
    }

    let mut used = vec![0; pool.len()];
    let mut picked = Vec::with_capacity(available_from[0]);
    for size in 1..=available_from[0] {
        pick(pool, &available_from, &mut used, &mut picked, 0, size, visit)?;
    }
    Ok(())
}

fn pick<E>(
    pool: &[(char, usize)],
    available_from: &[usize],
    used: &mut [usize],
    picked: &mut Vec<char>,
    from: usize,
    remaining: usize,
    visit: &mut dyn FnMut(&[char]) -> std::result::Result<(), E>,
) -> std::result::Result<(), E> {
    if remaining == 0 {
        return visit(picked.as_slice());
    }
    for i in from..pool.len() {
        let (letter, count) = pool[i];
        if count - used[i] + available_from[i + 1] < remaining {
            break;
        }
        if used[i] == count {
            continue;
        }
        used[i] += 1;
        picked.push(letter);
        let step = pick(pool, available_from, used, picked, i, remaining - 1, visit);
        picked.pop();
        used[i] -= 1;
        step?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::signature_of;
    use pretty_assertions::assert_eq;

    fn sub_multisets(letters: &str) -> Vec<String> {
        let mut seen = Vec::new();
        for_each_sub_multiset::<()>(&letter_counts(letters), &mut |picked: &[char]| {
            seen.push(picked.iter().collect::<String>());
            Ok(())
        })
        .expect("infallible visit");
        seen
    }

    fn sorted(phrases: &[String]) -> Vec<String> {
        let mut v = phrases.to_vec();
        v.sort();
        v
    }

    fn decompose_with(
        words: &[&str],
        letters: &str,
        depth: Depth,
        config: &EngineConfig,
    ) -> Result<Vec<String>> {
        let index = SignatureIndex::from_entries(words.iter().copied());
        let mut cache = DecompositionCache::new();
        let mut decomposer = Decomposer::new(&index, &mut cache, config);
        decomposer
            .decompose(signature_of(letters).as_str(), depth)
            .map(|p| p.to_vec())
    }

    #[test]
    fn sub_multisets_follow_combination_order_without_repeats() {
        assert_eq!(
            sub_multisets("aab"),
            vec!["a", "b", "aa", "ab", "aab"]
        );
        assert_eq!(
            sub_multisets("abc"),
            vec!["a", "b", "c", "ab", "ac", "bc", "abc"]
        );
        assert_eq!(sub_multisets("zzz"), vec!["z", "zz", "zzz"]);
        assert!(sub_multisets("").is_empty());
    }

    #[test]
    fn residual_removes_one_occurrence_per_letter() {
        assert_eq!(residual("aabbc", &['a', 'b']), "abc");
        assert_eq!(residual("abc", &['a', 'b', 'c']), "");
        assert_eq!(residual("abc", &['z']), "abc");
    }

    #[test]
    fn finds_single_and_multi_word_anagrams() {
        let words = ["act", "cat", "dog", "god", "catdog"];
        let nested = decompose_with(&words, "tacgod", Depth::Nested, &EngineConfig::default())
            .expect("decompose");
        assert_eq!(
            sorted(&nested),
            vec![
                "act dog", "act god", "cat dog", "cat god", "catdog", "dog act", "dog cat",
                "god act", "god cat",
            ]
        );
    }

    #[test]
    fn empty_pool_and_unknown_letters_yield_nothing() {
        let config = EngineConfig::default();
        assert!(decompose_with(&["a"], "", Depth::TopLevel, &config)
            .expect("empty")
            .is_empty());
        assert!(decompose_with(&["cat"], "caq", Depth::Nested, &config)
            .expect("unknown letter")
            .is_empty());
        // A lone letter with no single-letter word cannot finish a phrase.
        assert!(decompose_with(&["at"], "cat", Depth::Nested, &config)
            .expect("dangling letter")
            .is_empty());
    }

    #[test]
    fn top_level_is_ranked_and_truncated() {
        let config = EngineConfig {
            max_results: 3,
            ..EngineConfig::default()
        };
        let words = ["a", "b", "c", "ab", "ba"];
        let top = decompose_with(&words, "abc", Depth::TopLevel, &config).expect("top");
        // Phrases keyed on 'a': "b a c", "ba c", "c a b", "c ab".
        assert_eq!(top, vec!["b a c", "ba c", "c a b"]);
    }

    #[test]
    fn nested_results_are_never_truncated() {
        let config = EngineConfig {
            max_results: 1,
            ..EngineConfig::default()
        };
        let words = ["a", "b", "c"];
        let nested = decompose_with(&words, "abc", Depth::Nested, &config).expect("nested");
        assert_eq!(nested.len(), 6);
    }

    #[test]
    fn truncated_top_level_list_is_not_served_to_nested_calls() {
        let config = EngineConfig {
            max_results: 1,
            ..EngineConfig::default()
        };
        let index = SignatureIndex::from_entries(["a", "b", "c"]);
        let mut cache = DecompositionCache::new();
        let mut decomposer = Decomposer::new(&index, &mut cache, &config);

        assert_eq!(decomposer.decompose("abc", Depth::TopLevel).expect("top").len(), 1);
        assert_eq!(decomposer.decompose("abc", Depth::Nested).expect("nested").len(), 6);
        assert_eq!(decomposer.decompose("abc", Depth::TopLevel).expect("top again").len(), 1);
    }

    #[test]
    fn pruning_never_changes_top_level_output() {
        let words = [
            "a", "i", "at", "ta", "it", "ti", "tin", "nit", "ant", "tan", "nat", "in", "an",
            "tina", "anti", "taint", "tat", "tit",
        ];
        for letters in ["taint", "tinat", "anti", "ttaiin", "nattin"] {
            for max_results in [1, 2, 5, 10] {
                let pruned = EngineConfig {
                    max_results,
                    ..EngineConfig::default()
                };
                let unpruned = EngineConfig {
                    pruning: false,
                    ..pruned.clone()
                };
                assert_eq!(
                    decompose_with(&words, letters, Depth::TopLevel, &pruned).expect("pruned"),
                    decompose_with(&words, letters, Depth::TopLevel, &unpruned).expect("unpruned"),
                    "letters={letters} max_results={max_results}"
                );
            }
        }
    }

    #[test]
    fn lead_bound_uses_words_not_sorted_letters() {
        let words: BTreeSet<String> = ["cat", "act"].iter().map(|s| s.to_string()).collect();
        // Signature "act" keys on 'c', but "cat" can lead with 'a'.
        assert_eq!(lead_bound(&words, false), Some(Some('a')));

        let single: BTreeSet<String> = ["a".to_string()].into_iter().collect();
        assert_eq!(lead_bound(&single, false), None);
        assert_eq!(lead_bound(&single, true), Some(None));

        let spaced: BTreeSet<String> = ["a b".to_string()].into_iter().collect();
        assert_eq!(lead_bound(&spaced, false), Some(Some('b')));
    }

    #[test]
    fn candidate_budget_stops_runaway_pools() {
        let config = EngineConfig {
            limits: SearchLimits {
                max_candidates: 50,
                ..SearchLimits::default()
            },
            ..EngineConfig::default()
        };
        let err = decompose_with(&["abcdefghij"], "abcdefghij", Depth::TopLevel, &config)
            .expect_err("budget");
        assert_eq!(
            err,
            QueryError::BudgetExhausted {
                kind: BudgetKind::Candidates,
                limit: 50
            }
        );
    }

    #[test]
    fn phrase_budget_stops_exploding_nested_results() {
        let config = EngineConfig {
            limits: SearchLimits {
                max_phrases: 100,
                ..SearchLimits::default()
            },
            ..EngineConfig::default()
        };
        let words = ["a", "aa", "aaa"];
        let err = decompose_with(&words, "aaaaaaaaaaaaaaaa", Depth::TopLevel, &config)
            .expect_err("budget");
        assert!(matches!(
            err,
            QueryError::BudgetExhausted {
                kind: BudgetKind::Phrases,
                ..
            }
        ));
    }

    #[test]
    fn cached_pools_charge_their_recorded_cost() {
        let config = EngineConfig::default();
        let index = SignatureIndex::from_entries(["ab", "c"]);
        let mut cache = DecompositionCache::new();

        let mut first = Decomposer::new(&index, &mut cache, &config);
        first.decompose("abc", Depth::TopLevel).expect("first");
        let cold = first.candidates_seen();
        assert!(cold > 0);

        let mut second = Decomposer::new(&index, &mut cache, &config);
        second.decompose("abc", Depth::TopLevel).expect("second");
        assert_eq!(second.candidates_seen(), cold);
        assert!(!cache.is_empty());
    }

    fn tight_budget() -> EngineConfig {
        EngineConfig {
            limits: SearchLimits {
                max_candidates: 30,
                ..SearchLimits::default()
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn aborted_pool_fails_the_same_way_on_retry() {
        let config = tight_budget();
        let index = SignatureIndex::from_entries(["a", "aa", "aaa", "aaaaaaaa"]);
        let mut cache = DecompositionCache::new();

        let first = Decomposer::new(&index, &mut cache, &config)
            .decompose("aaaaaaaa", Depth::TopLevel)
            .map(|p| p.to_vec());
        let second = Decomposer::new(&index, &mut cache, &config)
            .decompose("aaaaaaaa", Depth::TopLevel)
            .map(|p| p.to_vec());

        assert_eq!(
            first,
            Err(QueryError::BudgetExhausted {
                kind: BudgetKind::Candidates,
                limit: 30
            })
        );
        assert_eq!(first, second);
    }

    #[test]
    fn warm_cache_does_not_stretch_the_budget() {
        let config = tight_budget();
        let index = SignatureIndex::from_entries(["a", "aa", "aaa", "aaaaaaaa"]);

        let mut warm_cache = DecompositionCache::new();
        Decomposer::new(&index, &mut warm_cache, &EngineConfig::default())
            .decompose("aaaaaaa", Depth::Nested)
            .expect("warm up");
        let warm = Decomposer::new(&index, &mut warm_cache, &config)
            .decompose("aaaaaaaa", Depth::TopLevel)
            .map(|p| p.to_vec());

        let mut cold_cache = DecompositionCache::new();
        let cold = Decomposer::new(&index, &mut cold_cache, &config)
            .decompose("aaaaaaaa", Depth::TopLevel)
            .map(|p| p.to_vec());

        assert_eq!(warm, cold);
    }

    #[test]
    fn full_cache_is_cleared() {
        let config = EngineConfig::default();
        let index = SignatureIndex::from_entries(["a", "b", "c"]);
        let mut cache = DecompositionCache::new();
        Decomposer::new(&index, &mut cache, &config)
            .decompose("abc", Depth::TopLevel)
            .expect("decompose");
        let pools = cache.len();
        assert!(pools > 1);

        assert!(!cache.clear_if_full(pools + 1));
        assert_eq!(cache.len(), pools);
        assert!(cache.clear_if_full(pools));
        assert!(cache.is_empty());
    }
}
