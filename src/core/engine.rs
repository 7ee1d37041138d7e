// File: src/core/engine.rs
use crate::config::EngineConfig;
use crate::core::decompose::{DecompositionCache, Decomposer, Depth};
use crate::core::dictionary::Dictionary;
use crate::core::substring::{SubstringIndex, SuffixArrayIndex};
use crate::core::types::{rank_and_truncate, signature_of};
use crate::error::{LoadError, QueryError};
use crate::loader::load_entries;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Result of a well-formed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "phrases", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Ranked phrases, at most `max_results` of them.
    Matches(Vec<String>),
    NoMatches,
}

impl SearchOutcome {
    pub fn phrases(&self) -> &[String] {
        match self {
            SearchOutcome::Matches(phrases) => phrases,
            SearchOutcome::NoMatches => &[],
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, SearchOutcome::Matches(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub generation: u64,
    pub entries: usize,
    pub signatures: usize,
    pub cached_pools: usize,
}

/// A dictionary snapshot with the caches derived from it.
/// Replaced as a whole on reload, so cached phrases never outlive their words.
struct Generation {
    id: u64,
    dictionary: Dictionary,
    substrings: Box<dyn SubstringIndex>,
    cache: Mutex<DecompositionCache>,
    /// Cache size as of the last finished search, readable without the cache lock.
    cached_pools: AtomicUsize,
}

/// Substring anagram search over a swappable dictionary generation.
pub struct AnagramEngine {
    config: EngineConfig,
    current: RwLock<Arc<Generation>>,
    next_generation: AtomicU64,
}

impl AnagramEngine {
    /// Builds an engine over `entries` with the default suffix-array substring index.
    pub fn new<I, S>(config: EngineConfig, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dictionary = Dictionary::from_entries(entries);
        let substrings = SuffixArrayIndex::build(dictionary.entries());
        Self::with_substring_index(config, dictionary, Box::new(substrings))
    }

    pub fn with_substring_index(
        config: EngineConfig,
        dictionary: Dictionary,
        substrings: Box<dyn SubstringIndex>,
    ) -> Self {
        let generation = Self::make_generation(1, dictionary, substrings);
        Self {
            config,
            current: RwLock::new(Arc::new(generation)),
            next_generation: AtomicU64::new(2),
        }
    }

    pub fn from_file(config: EngineConfig, path: &Path) -> Result<Self, LoadError> {
        let entries = load_entries(path)?;
        Ok(Self::new(config, entries))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn make_generation(
        id: u64,
        dictionary: Dictionary,
        substrings: Box<dyn SubstringIndex>,
    ) -> Generation {
        log::info!(
            "Dictionary generation {} loaded: {} entries, {} signatures",
            id,
            dictionary.len(),
            dictionary.signatures().len()
        );
        Generation {
            id,
            dictionary,
            substrings,
            cache: Mutex::new(DecompositionCache::new()),
            cached_pools: AtomicUsize::new(0),
        }
    }

    fn current(&self) -> Arc<Generation> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Finds dictionary entries containing `query`, then returns the best-ranked
    /// anagram phrases of those entries.
    pub fn search(&self, query: &str) -> Result<SearchOutcome, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        let len = query.chars().count();
        if len > self.config.max_query_chars {
            return Err(QueryError::QueryTooLong {
                len,
                max: self.config.max_query_chars,
            });
        }

        let generation = self.current();
        let entries = generation.substrings.find_entries(query);
        if entries.is_empty() {
            log::debug!("Query '{}': no entry contains it", query);
            return Ok(SearchOutcome::NoMatches);
        }

        // Anagram entries produce identical phrases, so each signature is searched once.
        let pools: BTreeSet<String> = entries
            .iter()
            .map(|entry| signature_of(entry).into_string())
            .collect();
        log::debug!(
            "Query '{}': {} entries, {} distinct letter pools",
            query,
            entries.len(),
            pools.len()
        );

        let mut cache = generation.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.clear_if_full(self.config.limits.max_cached_pools);
        let expanded = Self::expand_pools(&generation, &mut cache, &self.config, &pools);
        generation.cached_pools.store(cache.len(), Ordering::Relaxed);
        drop(cache);

        let (union, candidates_seen) = match expanded {
            Ok(expanded) => expanded,
            Err((pool, err)) => {
                log::warn!("Query '{}' aborted on pool '{}': {}", query, pool, err);
                return Err(err);
            }
        };

        let mut ranked: Vec<String> = union.into_iter().collect();
        rank_and_truncate(&mut ranked, self.config.max_results);
        log::debug!(
            "Query '{}': {} phrases returned, {} candidates examined",
            query,
            ranked.len(),
            candidates_seen
        );

        if ranked.is_empty() {
            Ok(SearchOutcome::NoMatches)
        } else {
            Ok(SearchOutcome::Matches(ranked))
        }
    }

    /// Decomposes every pool at top level and unions the phrases.
    /// Returns the pool that failed alongside the error.
    fn expand_pools<'p>(
        generation: &Generation,
        cache: &mut DecompositionCache,
        config: &EngineConfig,
        pools: &'p BTreeSet<String>,
    ) -> Result<(HashSet<String>, usize), (&'p str, QueryError)> {
        let mut decomposer = Decomposer::new(generation.dictionary.signatures(), cache, config);
        let mut union: HashSet<String> = HashSet::new();
        for pool in pools {
            let phrases = decomposer
                .decompose(pool, Depth::TopLevel)
                .map_err(|err| (pool.as_str(), err))?;
            union.extend(phrases.iter().cloned());
        }
        Ok((union, decomposer.candidates_seen()))
    }

    /// Replaces the dictionary with the contents of `path`.
    /// On failure the current generation keeps serving.
    pub fn reload(&self, path: &Path) -> Result<u64, LoadError> {
        let entries = load_entries(path)?;
        Ok(self.reload_entries(entries))
    }

    /// Builds a new generation from `entries` and swaps it in with an empty cache.
    pub fn reload_entries<I, S>(&self, entries: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dictionary = Dictionary::from_entries(entries);
        let substrings = SuffixArrayIndex::build(dictionary.entries());
        self.reload_with(dictionary, Box::new(substrings))
    }

    pub fn reload_with(&self, dictionary: Dictionary, substrings: Box<dyn SubstringIndex>) -> u64 {
        let id = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let generation = Arc::new(Self::make_generation(id, dictionary, substrings));
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = generation;
        id
    }

    /// Never waits on a running search; `cached_pools` lags by at most that search.
    pub fn stats(&self) -> EngineStats {
        let generation = self.current();
        EngineStats {
            generation: generation.id,
            entries: generation.dictionary.len(),
            signatures: generation.dictionary.signatures().len(),
            cached_pools: generation.cached_pools.load(Ordering::Relaxed),
        }
    }
}
