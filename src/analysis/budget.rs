//! DAO funds per token family

use super::stats::round2;
use crate::error::CensusError;
use crate::holdings::{ETH, GEN, HOLDING_COLUMNS, OTHER_TOKENS};
use crate::table::{Cell, Table};
use std::fmt;

/// Summed holdings in USD.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BudgetStats {
    pub eth: f64,
    pub gen: f64,
    pub others: f64,
}

impl BudgetStats {
    pub fn total(&self) -> f64 {
        self.eth + self.gen + self.others
    }

    /// Percentage of the total held in `part`, 0 when there are no funds.
    pub fn share(&self, part: f64) -> f64 {
        let total = self.total();
        if total > 0.0 {
            round2(part / total * 100.0)
        } else {
            0.0
        }
    }
}

impl fmt::Display for BudgetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total funds = {}$", round2(self.total()))?;
        writeln!(f, "ETH = {}$ ~> {}%", round2(self.eth), self.share(self.eth))?;
        writeln!(f, "GEN = {}$ ~> {}%", round2(self.gen), self.share(self.gen))?;
        write!(f, "Other criptos = {}$ ~> {}%", round2(self.others), self.share(self.others))
    }
}

/// Census with a `budget = ETH + GEN + otherTokens` column, sorted ascending and
/// keeping only DAOs with at least `min_budget`.
pub fn budget_table(census: &Table, min_budget: f64) -> Result<Table, CensusError> {
    for column in HOLDING_COLUMNS {
        census.require_column(column)?;
    }

    let mut table = census.clone();
    table.derive_column("budget", |row| {
        Cell::Float(HOLDING_COLUMNS.iter().map(|c| row.f64(c).unwrap_or(0.0)).sum())
    });
    let mut table = table.filter(|row| row.f64("budget").map_or(false, |b| b >= min_budget));
    table.sort_by_f64("budget")?;
    Ok(table)
}

/// Sums each token family over the table.
pub fn budget_stats(table: &Table) -> Result<BudgetStats, CensusError> {
    let sum = |column: &str| -> Result<f64, CensusError> {
        Ok(table.column_f64(column)?.into_iter().filter(|v| !v.is_nan()).sum())
    };

    Ok(BudgetStats {
        eth: sum(ETH)?,
        gen: sum(GEN)?,
        others: sum(OTHER_TOKENS)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census() -> Table {
        let mut table = Table::new(["id", "name", "ETH", "GEN", "otherTokens"]);
        table.push_row(vec!["a".into(), "Alpha".into(), Cell::Float(300.0), Cell::Float(100.0), Cell::Float(0.0)]);
        table.push_row(vec!["b".into(), "Beta".into(), Cell::Float(0.5), Cell::Float(0.0), Cell::Float(0.0)]);
        table.push_row(vec!["c".into(), "Gamma".into(), Cell::Float(50.0), Cell::Float(0.0), Cell::Float(50.0)]);
        table
    }

    #[test]
    fn test_budget_table_filters_and_sorts() {
        let table = budget_table(&census(), 1.0).unwrap();
        assert_eq!(table.column_text("name").unwrap(), vec!["Gamma", "Alpha"]);
        assert_eq!(table.get(1, "budget"), Some(&Cell::Float(400.0)));
    }

    #[test]
    fn test_budget_stats_shares() {
        let table = budget_table(&census(), 1.0).unwrap();
        let stats = budget_stats(&table).unwrap();

        assert_eq!(stats.total(), 500.0);
        assert_eq!(stats.share(stats.eth), 70.0);
        assert_eq!(stats.share(stats.gen), 20.0);
        assert_eq!(stats.share(stats.others), 10.0);
        assert!(stats.to_string().starts_with("Total funds = 500$"));
    }

    #[test]
    fn test_empty_budget_has_zero_shares() {
        let stats = BudgetStats::default();
        assert_eq!(stats.share(stats.eth), 0.0);
    }
}
