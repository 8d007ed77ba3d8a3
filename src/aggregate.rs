//! Per-parent counts and group-by-size reductions

use crate::error::CensusError;
use crate::join::ID;
use crate::table::{Cell, Table};
use std::collections::{BTreeMap, HashMap};

/// Count of child records per parent DAO.
///
/// Parents are kept in insertion order. A parent recorded with zero children is
/// present with a count of 0, and lookups of unknown parents also yield 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentCounts {
    column: String,
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl ParentCounts {
    /// Creates an empty aggregate whose table column is `column`.
    pub fn new(column: impl Into<String>) -> Self {
        ParentCounts {
            column: column.into(),
            order: Vec::new(),
            counts: HashMap::new(),
        }
    }

    /// Records the number of children of `parent_id`, replacing an earlier value.
    pub fn record(&mut self, parent_id: &str, count: u64) {
        if self.counts.insert(parent_id.to_string(), count).is_none() {
            self.order.push(parent_id.to_string());
        }
    }

    pub fn count(&self, parent_id: &str) -> u64 {
        self.counts.get(parent_id).copied().unwrap_or(0)
    }

    pub fn contains(&self, parent_id: &str) -> bool {
        self.counts.contains_key(parent_id)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Two-column table `id, <column>`.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new([ID, self.column.as_str()]);
        for id in &self.order {
            table.push_row(vec![Cell::from(id.as_str()), Cell::from(self.count(id))]);
        }
        table
    }
}

/// Counts rows per distinct combination of `by` columns.
///
/// The result has the `by` columns plus `name`, ordered by the group keys.
pub fn group_size(table: &Table, by: &[&str], name: &str) -> Result<Table, CensusError> {
    for column in by {
        table.require_column(column)?;
    }

    let mut groups: BTreeMap<Vec<String>, (Vec<Cell>, u64)> = BTreeMap::new();
    for row in table.iter() {
        let cells: Vec<Cell> = by
            .iter()
            .map(|c| row.get(c).cloned().unwrap_or(Cell::Null))
            .collect();
        let key: Vec<String> = cells.iter().map(Cell::key).collect();
        groups.entry(key).or_insert_with(|| (cells, 0)).1 += 1;
    }

    let mut columns: Vec<&str> = by.to_vec();
    columns.push(name);
    let mut result = Table::new(columns);
    for (_, (mut cells, count)) in groups {
        cells.push(Cell::from(count));
        result.push_row(cells);
    }
    Ok(result)
}
