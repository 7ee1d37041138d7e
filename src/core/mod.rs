// src/core/mod.rs

pub mod decompose;
pub mod dictionary;
pub mod engine;
pub mod signature;
pub mod substring;
pub mod types;
