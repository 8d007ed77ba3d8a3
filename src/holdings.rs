//! Locally curated DAO holdings (USD value per token family)

use crate::error::CensusError;
use crate::export::read_table;
use crate::join::ID;
use crate::table::Table;
use std::fs;
use std::path::{Path, PathBuf};

pub const ETH: &str = "ETH";
pub const GEN: &str = "GEN";
pub const OTHER_TOKENS: &str = "otherTokens";

/// Token columns carried by a holdings file, in census order.
pub const HOLDING_COLUMNS: [&str; 3] = [ETH, GEN, OTHER_TOKENS];

/// Finds the holdings file under `dir`.
///
/// Walks `dir` recursively for file names containing `marker`. When several files
/// match, the lexicographically last path wins so that dated snapshots resolve to the
/// newest one.
///
/// # Errors
/// Returns `CensusError::HoldingsNotFound` if nothing matches, or an I/O error if
/// `dir` cannot be read.
pub fn find_holdings_file(dir: &Path, marker: &str) -> Result<PathBuf, CensusError> {
    let mut matches = Vec::new();
    walk(dir, marker, &mut matches)?;
    matches.sort();

    matches.pop().ok_or_else(|| CensusError::HoldingsNotFound {
        dir: dir.to_path_buf(),
        marker: marker.to_string(),
    })
}

fn walk(dir: &Path, marker: &str, matches: &mut Vec<PathBuf>) -> Result<(), CensusError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, marker, matches)?;
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(marker))
        {
            matches.push(path);
        }
    }
    Ok(())
}

/// Loads a holdings file keyed by `id`.
///
/// # Errors
/// Fails if the file cannot be read or lacks one of `id`, `ETH`, `GEN`, `otherTokens`.
pub fn load_holdings(path: &Path) -> Result<Table, CensusError> {
    let table = read_table(path)?;
    table.require_column(ID)?;
    for column in HOLDING_COLUMNS {
        table.require_column(column)?;
    }
    log::info!("Loaded holdings for {} DAOs from {}", table.len(), path.display());
    Ok(table)
}
