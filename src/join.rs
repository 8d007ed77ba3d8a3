//! Id-keyed joins between tables
//!
//! Joins never fail on a missing partner: the copied columns keep their default and
//! the miss is logged at debug level.

use crate::error::CensusError;
use crate::table::{Cell, Table};
use std::collections::{HashMap, HashSet};

/// Key column shared by every joined table.
pub const ID: &str = "id";

/// Copies `keys` from `other` into `base`, matching rows by `id`.
///
/// Each key column is (re)initialized to `0` first; see [`join_by_id_or`].
pub fn join_by_id(base: &mut Table, other: &Table, keys: &[&str]) -> Result<(), CensusError> {
    join_by_id_or(base, other, keys, Cell::Int(0))
}

/// Copies `keys` from `other` into `base`, matching rows by `id`.
///
/// Every key column of `base` is set to `default`, then for each base row the first
/// row of `other` with the same id provides the values. Rows without a partner, and
/// keys `other` does not have, keep the default.
///
/// # Errors
/// Returns `CensusError::MissingColumn` if either table has no `id` column.
pub fn join_by_id_or(
    base: &mut Table,
    other: &Table,
    keys: &[&str],
    default: Cell,
) -> Result<(), CensusError> {
    base.require_column(ID)?;
    other.require_column(ID)?;

    // Snapshot first so that joining a table with itself reads the unmodified values
    let mut partners: HashMap<String, Vec<Cell>> = HashMap::new();
    for row in other.iter() {
        partners.entry(row.text(ID)).or_insert_with(|| {
            keys.iter()
                .map(|k| row.get(k).cloned().unwrap_or_else(|| default.clone()))
                .collect()
        });
    }

    for key in keys {
        if !other.has_column(key) {
            log::debug!("join source has no column '{}', keeping default", key);
        }
        base.add_column(key, default.clone());
    }

    let ids: Vec<String> = base.iter().map(|row| row.text(ID)).collect();
    for (index, id) in ids.iter().enumerate() {
        match partners.get(id) {
            Some(values) => {
                for (key, value) in keys.iter().zip(values) {
                    base.set(index, key, value.clone())?;
                }
            }
            None => log::debug!("no join partner for id {}", id),
        }
    }

    Ok(())
}

/// Appends to `base` a row for every id of `other` that `base` lacks.
///
/// The new row carries the id and the `name_column` value of `other` (looked up under
/// `other_name_column`); every other column is `0`.
pub fn fill_ids(
    base: &mut Table,
    other: &Table,
    name_column: &str,
    other_name_column: &str,
) -> Result<(), CensusError> {
    base.require_column(ID)?;
    other.require_column(ID)?;

    let mut known: HashSet<String> = base.iter().map(|row| row.text(ID)).collect();
    let columns = base.columns().to_vec();

    for row in other.iter() {
        let id = row.text(ID);
        if !known.insert(id.clone()) {
            continue;
        }

        let new_row = columns
            .iter()
            .map(|column| match column.as_str() {
                ID => row.get(ID).cloned().unwrap_or(Cell::Null),
                c if c == name_column => row.get(other_name_column).cloned().unwrap_or(Cell::Null),
                _ => Cell::Int(0),
            })
            .collect();
        base.push_row(new_row);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census() -> Table {
        let mut table = Table::new(["id", "name", "n_users"]);
        table.push_row(vec!["0xa".into(), "Alpha".into(), Cell::Int(10)]);
        table.push_row(vec!["0xb".into(), "Beta".into(), Cell::Int(3)]);
        table
    }

    fn holdings() -> Table {
        let mut table = Table::new(["id", "ETH", "GEN"]);
        table.push_row(vec!["0xb".into(), Cell::Float(1.5), Cell::Float(20.0)]);
        table.push_row(vec!["0xb".into(), Cell::Float(99.0), Cell::Float(99.0)]);
        table
    }

    #[test]
    fn test_join_copies_first_match() {
        let mut base = census();
        join_by_id(&mut base, &holdings(), &["ETH", "GEN"]).unwrap();

        assert_eq!(base.get(1, "ETH"), Some(&Cell::Float(1.5)));
        assert_eq!(base.get(1, "GEN"), Some(&Cell::Float(20.0)));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_join_missing_partner_keeps_default() {
        let mut base = census();
        join_by_id(&mut base, &holdings(), &["ETH"]).unwrap();
        assert_eq!(base.get(0, "ETH"), Some(&Cell::Int(0)));
    }

    #[test]
    fn test_join_with_itself_is_idempotent() {
        let mut base = census();
        let copy = base.clone();
        join_by_id(&mut base, &copy, &["name", "n_users"]).unwrap();
        assert_eq!(base, copy);
    }

    #[test]
    fn test_join_disjoint_ids_yields_defaults() {
        let mut base = census();
        let mut other = Table::new(["id", "n_votes"]);
        other.push_row(vec!["0xz".into(), Cell::Int(7)]);

        join_by_id_or(&mut base, &other, &["n_votes"], Cell::Int(0)).unwrap();

        let votes = base.column("n_votes").unwrap();
        assert!(votes.iter().all(|c| **c == Cell::Int(0)));
    }

    #[test]
    fn test_join_unknown_key_column_defaults() {
        let mut base = census();
        join_by_id_or(&mut base, &holdings(), &["otherTokens"], Cell::Float(0.0)).unwrap();
        assert_eq!(base.get(1, "otherTokens"), Some(&Cell::Float(0.0)));
    }

    #[test]
    fn test_join_requires_id() {
        let mut base = census();
        let other = Table::new(["daoId", "x"]);
        assert!(matches!(
            join_by_id(&mut base, &other, &["x"]),
            Err(CensusError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_fill_ids_appends_missing() {
        let mut counts = Table::new(["id", "daoName", "nProposals"]);
        counts.push_row(vec!["0xa".into(), "Alpha".into(), Cell::Int(4)]);

        fill_ids(&mut counts, &census(), "daoName", "name").unwrap();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(1, "id"), Some(&Cell::from("0xb")));
        assert_eq!(counts.get(1, "daoName"), Some(&Cell::from("Beta")));
        assert_eq!(counts.get(1, "nProposals"), Some(&Cell::Int(0)));
    }
}
