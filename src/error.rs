// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

/// Failures while reading a dictionary source. Fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dictionary {path} has no entries")]
    EmptyDictionary { path: PathBuf },
}

/// Which computational ceiling a search ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Candidates,
    Phrases,
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetKind::Candidates => f.write_str("candidate"),
            BudgetKind::Phrases => f.write_str("phrase"),
        }
    }
}

/// Query-time failures. A well-formed query with no anagrams is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("query has {len} characters, limit is {max}")]
    QueryTooLong { len: usize, max: usize },

    #[error("search exceeded the {kind} limit of {limit}")]
    BudgetExhausted { kind: BudgetKind, limit: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
