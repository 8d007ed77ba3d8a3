//! Proposal outcome, boosting and staking metrics per DAO

use crate::aggregate::group_size;
use crate::error::CensusError;
use crate::join::{fill_ids, join_by_id, ID};
use crate::table::{Cell, Row, Table};

/// Census counts copied into the boost table.
const CENSUS_KEYS: [&str; 3] = ["n_users", "n_votes", "n_stakes"];

/// Counts proposals matching `predicate` per DAO as `id, <name>`.
fn count_matching<F>(proposals: &Table, name: &str, predicate: F) -> Result<Table, CensusError>
where
    F: Fn(Row<'_>) -> bool,
{
    group_size(&proposals.filter(predicate), &[ID], name)
}

fn percentage(part: Option<f64>, whole: f64) -> Cell {
    Cell::Float(part.unwrap_or(0.0) / whole * 100.0)
}

/// Builds the per-DAO boosting table.
///
/// `proposals` uses the `proposals.csv` layout. DAOs of the census without proposals
/// get a row with `nProposals = 0`. Percentage columns stay null unless the DAO has at
/// least one proposal.
pub fn boost_data(census: &Table, proposals: &Table) -> Result<Table, CensusError> {
    let mut props = proposals.clone();
    props.rename(&[("daoId", ID)]);

    let mut table = group_size(&props, &[ID, "daoName"], "nProposals")?;
    fill_ids(&mut table, census, "daoName", "name")?;
    join_by_id(&mut table, census, &CENSUS_KEYS)?;

    let accepted = count_matching(&props, "nPropAccepted", |row| row.bool("hasPassed") == Some(true))?;
    join_by_id(&mut table, &accepted, &["nPropAccepted"])?;
    let rejected = count_matching(&props, "nPropRejected", |row| row.bool("hasPassed") == Some(false))?;
    join_by_id(&mut table, &rejected, &["nPropRejected"])?;

    let boosted = count_matching(&props, "nBoost", |row| {
        row.get("boostedAt").map_or(false, |c| !c.is_null())
    })?;
    join_by_id(&mut table, &boosted, &["nBoost"])?;

    let staked = count_matching(&props, "nPropStaked", |row| {
        row.f64("differentStakers").map_or(false, |n| n > 0.0)
    })?;
    join_by_id(&mut table, &staked, &["nPropStaked"])?;

    table.derive_column("activity", |row| {
        let total = ["n_stakes", "n_votes", "nProposals"]
            .iter()
            .map(|c| row.i64(c).unwrap_or(0))
            .sum::<i64>();
        Cell::Int(total)
    });

    let percentages = [
        ("acceptedPercentage", "nPropAccepted"),
        ("rejectedPercentage", "nPropRejected"),
        ("boostPercentage", "nBoost"),
        ("stakePercentage", "nPropStaked"),
    ];
    for (column, source) in percentages {
        table.derive_column(column, |row| match row.f64("nProposals") {
            Some(n) if n > 0.0 => percentage(row.f64(source), n),
            _ => Cell::Null,
        });
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census() -> Table {
        let mut table = Table::new(["id", "name", "n_users", "n_proposals", "n_votes", "n_stakes"]);
        table.push_row(vec!["a".into(), "Alpha".into(), Cell::Int(10), Cell::Int(4), Cell::Int(20), Cell::Int(5)]);
        table.push_row(vec!["b".into(), "Beta".into(), Cell::Int(3), Cell::Int(0), Cell::Int(0), Cell::Int(0)]);
        table
    }

    fn proposals() -> Table {
        let mut table = Table::new(["daoId", "daoName", "proposalId", "hasPassed", "boostedAt", "differentStakers"]);
        table.push_row(vec!["a".into(), "Alpha".into(), "p1".into(), true.into(), Cell::Int(1580000000), Cell::Int(2)]);
        table.push_row(vec!["a".into(), "Alpha".into(), "p2".into(), true.into(), Cell::Null, Cell::Int(0)]);
        table.push_row(vec!["a".into(), "Alpha".into(), "p3".into(), false.into(), Cell::Null, Cell::Int(1)]);
        table.push_row(vec!["a".into(), "Alpha".into(), "p4".into(), true.into(), Cell::Int(1580000500), Cell::Int(0)]);
        table
    }

    #[test]
    fn test_boost_counts() {
        let table = boost_data(&census(), &proposals()).unwrap();
        assert_eq!(table.len(), 2);

        let alpha = table.row(0);
        assert_eq!(alpha.text("id"), "a");
        assert_eq!(alpha.i64("nProposals"), Some(4));
        assert_eq!(alpha.i64("nPropAccepted"), Some(3));
        assert_eq!(alpha.i64("nPropRejected"), Some(1));
        assert_eq!(alpha.i64("nBoost"), Some(2));
        assert_eq!(alpha.i64("nPropStaked"), Some(2));
        assert_eq!(alpha.i64("activity"), Some(29));
        assert_eq!(alpha.f64("acceptedPercentage"), Some(75.0));
        assert_eq!(alpha.f64("boostPercentage"), Some(50.0));
    }

    #[test]
    fn test_dao_without_proposals_is_filled() {
        let table = boost_data(&census(), &proposals()).unwrap();

        let beta = table.row(1);
        assert_eq!(beta.text("id"), "b");
        assert_eq!(beta.text("daoName"), "Beta");
        assert_eq!(beta.i64("nProposals"), Some(0));
        assert_eq!(beta.i64("n_users"), Some(3));
        assert_eq!(beta.get("stakePercentage"), Some(&Cell::Null));
    }
}
