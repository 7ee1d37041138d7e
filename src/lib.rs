// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod loader;

pub use crate::config::{EngineConfig, SearchLimits, MAX_RETURN_LENGTH};
pub use crate::core::engine::{AnagramEngine, EngineStats, SearchOutcome};
pub use crate::core::substring::{SubstringIndex, SuffixArrayIndex};
pub use crate::error::{LoadError, QueryError};
