//! How well boosting predicts a proposal's outcome

use super::stats::round2;
use crate::error::CensusError;
use crate::join::ID;
use crate::table::{Cell, Row, Table};
use std::collections::HashMap;

/// Color of DAOs without proposals.
pub const NO_PROPOSALS_COLOR: &str = "#BDBDBD";

/// Proposal-count buckets as `(legend, color)`, smallest first.
pub const PROPOSAL_BUCKETS: [(&str, &str); 5] = [
    ("0 > Proposals < 11", "#E1BEE7"),
    ("10 > Proposals < 26", "#BA68C8"),
    ("25 > Proposals < 51", "#8E24AA"),
    ("50 > Proposals < 101", "#4A148C"),
    ("100 > Proposals", "#C2185B"),
];

/// Confusion counts treating "boosted" as the prediction and "passed" as the truth.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Confusion {
    pub tp: u64,
    pub tn: u64,
    pub fp: u64,
    pub fn_: u64,
}

impl Confusion {
    pub fn record(&mut self, boosted: bool, passed: bool) {
        match (boosted, passed) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// `(tp + tn) / total` rounded to two decimals; `None` without proposals.
    pub fn accuracy(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(round2((self.tp + self.tn) as f64 / total as f64)),
        }
    }
}

/// Bucket color for a DAO with `n` proposals.
pub fn proposal_color(n: i64) -> &'static str {
    let bucket = match n {
        1..=10 => 0,
        11..=25 => 1,
        26..=50 => 2,
        51..=100 => 3,
        n if n > 100 => 4,
        _ => return NO_PROPOSALS_COLOR,
    };
    PROPOSAL_BUCKETS[bucket].1
}

fn outcome(row: Row<'_>) -> Option<(bool, bool)> {
    let passed = row.bool("hasPassed")?;
    let boosted = row.get("boostedAt").map_or(false, |c| !c.is_null());
    Some((boosted, passed))
}

/// Confusion counts per DAO id from a `proposals.csv` table.
pub fn confusion_per_dao(proposals: &Table) -> Result<HashMap<String, Confusion>, CensusError> {
    proposals.require_column("daoId")?;
    proposals.require_column("hasPassed")?;

    let mut per_dao: HashMap<String, Confusion> = HashMap::new();
    for row in proposals.iter() {
        if let Some((boosted, passed)) = outcome(row) {
            per_dao.entry(row.text("daoId")).or_default().record(boosted, passed);
        }
    }
    Ok(per_dao)
}

/// Census rows extended with `accuracy` (null without proposals) and `color`.
pub fn prediction_accuracy(census: &Table, proposals: &Table) -> Result<Table, CensusError> {
    census.require_column(ID)?;
    let per_dao = confusion_per_dao(proposals)?;

    let mut table = census.clone();
    table.derive_column("accuracy", |row| {
        Cell::from(per_dao.get(&row.text(ID)).and_then(Confusion::accuracy))
    });
    table.derive_column("color", |row| {
        Cell::from(proposal_color(row.i64("n_proposals").unwrap_or(0)))
    });
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_accuracy() {
        let mut confusion = Confusion::default();
        confusion.record(true, true);
        confusion.record(false, false);
        confusion.record(true, false);

        assert_eq!(confusion, Confusion { tp: 1, tn: 1, fp: 1, fn_: 0 });
        assert_eq!(confusion.accuracy(), Some(0.67));
        assert_eq!(Confusion::default().accuracy(), None);
    }

    #[test]
    fn test_proposal_color_buckets() {
        assert_eq!(proposal_color(0), NO_PROPOSALS_COLOR);
        assert_eq!(proposal_color(10), "#E1BEE7");
        assert_eq!(proposal_color(11), "#BA68C8");
        assert_eq!(proposal_color(50), "#8E24AA");
        assert_eq!(proposal_color(100), "#4A148C");
        assert_eq!(proposal_color(101), "#C2185B");
    }

    #[test]
    fn test_prediction_accuracy_table() {
        let mut census = Table::new(["id", "name", "n_users", "n_proposals"]);
        census.push_row(vec!["a".into(), "Alpha".into(), Cell::Int(5), Cell::Int(4)]);
        census.push_row(vec!["b".into(), "Beta".into(), Cell::Int(2), Cell::Int(0)]);

        let mut proposals = Table::new(["daoId", "hasPassed", "boostedAt"]);
        proposals.push_row(vec!["a".into(), true.into(), Cell::Int(1)]);
        proposals.push_row(vec!["a".into(), false.into(), Cell::Null]);
        proposals.push_row(vec!["a".into(), true.into(), Cell::Null]);
        proposals.push_row(vec!["a".into(), false.into(), Cell::Null]);

        let table = prediction_accuracy(&census, &proposals).unwrap();
        assert_eq!(table.get(0, "accuracy"), Some(&Cell::Float(0.75)));
        assert_eq!(table.get(0, "color"), Some(&Cell::from("#E1BEE7")));
        assert_eq!(table.get(1, "accuracy"), Some(&Cell::Null));
        assert_eq!(table.get(1, "color"), Some(&Cell::from(NO_PROPOSALS_COLOR)));
    }
}
