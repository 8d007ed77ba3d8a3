//! In-memory tables keyed by column name
//!
//! A `Table` is a list of named columns and rows of `Cell`s. It is the shape every
//! collector produces and every exporter and plotter consumes.

use crate::error::CensusError;
use ordered_float::OrderedFloat;
use serde_json::Value;
use std::fmt;

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Converts a JSON value. Strings stay text; nested values are kept as JSON text.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Parses a field read from a delimited file.
    pub fn parse(field: &str) -> Cell {
        if field.is_empty() {
            return Cell::Null;
        }
        match field {
            "True" | "true" => return Cell::Bool(true),
            "False" | "false" => return Cell::Bool(false),
            _ => {}
        }
        if let Ok(i) = field.parse::<i64>() {
            return Cell::Int(i);
        }
        // "inf" and "NaN" would parse as floats; names like "Infinity DAO" must not
        if field.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = field.parse::<f64>() {
                return Cell::Float(f);
            }
        }
        Cell::Text(field.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Text(s) => s.parse().ok(),
            Cell::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Float(f) if f.is_finite() => Some(*f as i64),
            Cell::Bool(b) => Some(*b as i64),
            Cell::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Int(i) => Some(*i != 0),
            Cell::Text(s) => match s.as_str() {
                "True" | "true" => Some(true),
                "False" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String used to match ids across tables.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(true) => write!(f, "True"),
            Cell::Bool(false) => write!(f, "False"),
            Cell::Int(i) => write!(f, "{}", i),
            // Debug keeps a trailing ".0" so floats read back as floats
            Cell::Float(x) => write!(f, "{:?}", x),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// Ordered columns and rows of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.get(self.index, column)
    }

    pub fn f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    pub fn i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Cell::as_i64)
    }

    pub fn bool(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(Cell::as_bool)
    }

    /// Cell rendered as text; empty for missing or null cells.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(Cell::to_string).unwrap_or_default()
    }

    pub fn cells(&self) -> &'a [Cell] {
        &self.table.rows[self.index]
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Like `column_index`, failing with `CensusError::MissingColumn`.
    pub fn require_column(&self, column: &str) -> Result<usize, CensusError> {
        self.column_index(column)
            .ok_or_else(|| CensusError::MissingColumn(column.to_string()))
    }

    /// Appends a row; short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row { table: self, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    pub fn set(&mut self, row: usize, column: &str, value: impl Into<Cell>) -> Result<(), CensusError> {
        let col = self.require_column(column)?;
        if let Some(r) = self.rows.get_mut(row) {
            r[col] = value.into();
        }
        Ok(())
    }

    /// Adds a column filled with `default`; an existing column is reset to it.
    pub fn add_column(&mut self, column: &str, default: Cell) {
        match self.column_index(column) {
            Some(col) => {
                for row in &mut self.rows {
                    row[col] = default.clone();
                }
            }
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(default.clone());
                }
            }
        }
    }

    /// Adds a column computed from each row.
    pub fn derive_column<F>(&mut self, column: &str, f: F)
    where
        F: Fn(Row<'_>) -> Cell,
    {
        let values: Vec<Cell> = self.iter().map(f).collect();
        self.add_column(column, Cell::Null);
        if let Some(col) = self.column_index(column) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[col] = value;
            }
        }
    }

    /// Renames columns; unknown names are ignored.
    pub fn rename(&mut self, renames: &[(&str, &str)]) {
        for (from, to) in renames {
            if let Some(col) = self.column_index(from) {
                self.columns[col] = (*to).to_string();
            }
        }
    }

    /// Projects (and reorders) the given columns.
    pub fn select(&self, columns: &[&str]) -> Result<Table, CensusError> {
        let indexes = columns
            .iter()
            .map(|c| self.require_column(c))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        })
    }

    /// Keeps rows matching the predicate.
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(Row<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|row| predicate(*row))
            .map(|row| row.cells().to_vec())
            .collect();

        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Stable ascending sort on a numeric column; non-numeric cells sort first.
    pub fn sort_by_f64(&mut self, column: &str) -> Result<(), CensusError> {
        let col = self.require_column(column)?;
        self.rows
            .sort_by_key(|row| row[col].as_f64().map(OrderedFloat));
        Ok(())
    }

    /// Appends the rows of `other`, extending the columns with any it adds.
    pub fn append(&mut self, other: Table) {
        for column in &other.columns {
            if !self.has_column(column) {
                self.add_column(column, Cell::Null);
            }
        }

        let mapping: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();

        for row in other.rows {
            let mut new_row = vec![Cell::Null; self.columns.len()];
            for (value, &col) in row.into_iter().zip(&mapping) {
                new_row[col] = value;
            }
            self.rows.push(new_row);
        }
    }

    /// All cells of a column, in row order.
    pub fn column(&self, column: &str) -> Result<Vec<&Cell>, CensusError> {
        let col = self.require_column(column)?;
        Ok(self.rows.iter().map(|row| &row[col]).collect())
    }

    /// Numeric values of a column; non-numeric cells become NaN.
    pub fn column_f64(&self, column: &str) -> Result<Vec<f64>, CensusError> {
        Ok(self
            .column(column)?
            .into_iter()
            .map(|c| c.as_f64().unwrap_or(f64::NAN))
            .collect())
    }

    /// Text rendering of a column.
    pub fn column_text(&self, column: &str) -> Result<Vec<String>, CensusError> {
        Ok(self.column(column)?.into_iter().map(Cell::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(["id", "name", "n_users"]);
        table.push_row(vec!["0xb".into(), "Beta".into(), Cell::Int(30)]);
        table.push_row(vec!["0xa".into(), "Alpha".into(), Cell::Int(10)]);
        table.push_row(vec!["0xc".into(), "Gamma".into(), Cell::Null]);
        table
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse(""), Cell::Null);
        assert_eq!(Cell::parse("True"), Cell::Bool(true));
        assert_eq!(Cell::parse("42"), Cell::Int(42));
        assert_eq!(Cell::parse("0.5"), Cell::Float(0.5));
        assert_eq!(Cell::parse("0x12ab"), Cell::Text("0x12ab".to_string()));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Float(3.0).to_string(), "3.0");
        assert_eq!(Cell::Bool(false).to_string(), "False");
        assert_eq!(Cell::Null.to_string(), "");
    }

    #[test]
    fn test_push_row_pads() {
        let mut table = Table::new(["a", "b"]);
        table.push_row(vec![Cell::Int(1)]);
        assert_eq!(table.get(0, "b"), Some(&Cell::Null));
    }

    #[test]
    fn test_select_reorders_and_rejects_unknown() {
        let table = sample();
        let selected = table.select(&["n_users", "id"]).unwrap();
        assert_eq!(selected.columns(), &["n_users", "id"]);
        assert_eq!(selected.get(0, "id"), Some(&Cell::from("0xb")));
        assert!(matches!(table.select(&["missing"]), Err(CensusError::MissingColumn(_))));
    }

    #[test]
    fn test_sort_by_f64() {
        let mut table = sample();
        table.sort_by_f64("n_users").unwrap();
        let names = table.column_text("name").unwrap();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn test_append_unions_columns() {
        let mut table = sample();
        let mut other = Table::new(["id", "score"]);
        other.push_row(vec!["0xd".into(), Cell::Float(1.5)]);
        table.append(other);

        assert_eq!(table.len(), 4);
        assert_eq!(table.columns(), &["id", "name", "n_users", "score"]);
        assert_eq!(table.get(3, "score"), Some(&Cell::Float(1.5)));
        assert_eq!(table.get(0, "score"), Some(&Cell::Null));
        assert_eq!(table.get(3, "name"), Some(&Cell::Null));
    }

    #[test]
    fn test_filter_and_derive() {
        let mut table = sample();
        table.derive_column("double", |row| row.f64("n_users").map(|v| v * 2.0).into());
        let filtered = table.filter(|row| row.f64("n_users").unwrap_or(0.0) > 15.0);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get(0, "double"), Some(&Cell::Float(60.0)));
    }

    #[test]
    fn test_rename() {
        let mut table = sample();
        table.rename(&[("n_users", "users"), ("unknown", "x")]);
        assert!(table.has_column("users"));
        assert!(!table.has_column("n_users"));
    }
}
