//! Delimited flat-file export and import

use crate::error::CensusError;
use crate::table::{Cell, Table};
use std::fs;
use std::path::Path;

/// Field separator of a flat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
        }
    }

    /// Picks the separator used by a header line.
    pub fn detect(header: &str) -> Delimiter {
        let semicolons = header.matches(';').count();
        let commas = header.matches(',').count();
        if semicolons > commas {
            Delimiter::Semicolon
        } else {
            Delimiter::Comma
        }
    }
}

/// Writes `table` with a header row, creating parent directories as needed.
pub fn write_table(table: &Table, path: &Path, delimiter: Delimiter) -> Result<(), CensusError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .from_path(path)?;

    writer.write_record(table.columns())?;
    for row in table.iter() {
        writer.write_record(row.cells().iter().map(Cell::to_string))?;
    }
    writer.flush()?;

    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Identifier and label columns; always read as text.
pub const TEXT_COLUMNS: [&str; 6] = ["id", "name", "daoId", "daoName", "proposalId", "userId"];

/// Type shared by every field of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Numeric,
    Bool,
    Text,
}

impl ColumnKind {
    fn cell(self, field: &str) -> Cell {
        if field.is_empty() {
            return Cell::Null;
        }
        match self {
            ColumnKind::Text => Cell::Text(field.to_string()),
            _ => Cell::parse(field),
        }
    }
}

/// A column is numeric or boolean only if every non-empty field is; anything else
/// makes the whole column text.
fn column_kind<'a>(name: &str, fields: impl Iterator<Item = &'a String>) -> ColumnKind {
    if TEXT_COLUMNS.contains(&name) {
        return ColumnKind::Text;
    }

    let mut kind = None;
    for field in fields.filter(|f| !f.is_empty()) {
        let field_kind = match Cell::parse(field) {
            Cell::Int(_) | Cell::Float(_) => ColumnKind::Numeric,
            Cell::Bool(_) => ColumnKind::Bool,
            _ => return ColumnKind::Text,
        };
        match kind {
            None => kind = Some(field_kind),
            Some(k) if k != field_kind => return ColumnKind::Text,
            _ => {}
        }
    }
    kind.unwrap_or(ColumnKind::Text)
}

/// Reads a delimited file with a header row.
///
/// The separator is detected from the header. Types are inferred per column (see
/// [`TEXT_COLUMNS`]); empty fields are null.
pub fn read_table(path: &Path) -> Result<Table, CensusError> {
    let content = fs::read_to_string(path)?;
    let header = content.lines().next().unwrap_or_default();
    let delimiter = Delimiter::detect(header);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw.push(record.iter().map(str::to_string).collect());
    }

    let kinds: Vec<ColumnKind> = headers
        .iter()
        .enumerate()
        .map(|(col, name)| column_kind(name, raw.iter().filter_map(|row| row.get(col))))
        .collect();

    let mut table = Table::new(headers);
    for row in raw {
        table.push_row(
            row.iter()
                .zip(&kinds)
                .map(|(field, kind)| kind.cell(field))
                .collect(),
        );
    }

    log::debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}
