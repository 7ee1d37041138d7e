// File: src/loader.rs
use crate::error::LoadError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads newline-delimited entries, trimming each line and skipping blank ones.
pub fn read_entries<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            entries.push(line.to_string());
        }
    }
    Ok(entries)
}

/// Loads a dictionary file. An unreadable or empty file is an error, so a
/// server never starts against a missing word list.
pub fn load_entries(path: &Path) -> Result<Vec<String>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let entries = read_entries(BufReader::new(file)).map_err(io_err)?;
    if entries.is_empty() {
        return Err(LoadError::EmptyDictionary {
            path: path.to_path_buf(),
        });
    }
    log::debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}
