use daocensus::analysis::{boost_data, prediction_accuracy};
use daocensus::{fill_ids, group_size, join_by_id, read_table, write_table, Cell, Delimiter, Table};

fn census() -> Table {
    let mut table = Table::new(["id", "name", "n_users", "n_proposals", "n_votes", "n_stakes"]);
    table.push_row(vec!["0xa".into(), "Alpha".into(), Cell::Int(12), Cell::Int(3), Cell::Int(9), Cell::Int(4)]);
    table.push_row(vec!["0xb".into(), "Beta".into(), Cell::Int(2), Cell::Int(0), Cell::Int(0), Cell::Int(0)]);
    table
}

fn proposals() -> Table {
    let mut table = Table::new(["daoId", "daoName", "proposalId", "hasPassed", "boostedAt", "differentStakers"]);
    table.push_row(vec!["0xa".into(), "Alpha".into(), "p1".into(), true.into(), Cell::Int(1), Cell::Int(1)]);
    table.push_row(vec!["0xa".into(), "Alpha".into(), "p2".into(), false.into(), Cell::Null, Cell::Int(0)]);
    table.push_row(vec!["0xa".into(), "Alpha".into(), "p3".into(), true.into(), Cell::Null, Cell::Int(0)]);
    table
}

#[test]
fn self_join_leaves_values_unchanged() {
    let mut table = census();
    let snapshot = table.clone();

    join_by_id(&mut table, &snapshot, &["n_users", "n_votes"]).unwrap();
    assert_eq!(table, snapshot);
}

#[test]
fn disjoint_join_yields_defaults() {
    let mut table = census();
    let mut other = Table::new(["id", "n_users"]);
    other.push_row(vec!["0xz".into(), Cell::Int(99)]);

    join_by_id(&mut table, &other, &["n_users"]).unwrap();
    assert_eq!(table.column("n_users").unwrap(), vec![&Cell::Int(0), &Cell::Int(0)]);
}

#[test]
fn grouped_counts_fill_missing_daos() {
    let mut props = proposals();
    props.rename(&[("daoId", "id")]);

    let mut counts = group_size(&props, &["id", "daoName"], "nProposals").unwrap();
    fill_ids(&mut counts, &census(), "daoName", "name").unwrap();

    assert_eq!(counts.len(), 2);
    assert_eq!(counts.get(1, "daoName"), Some(&Cell::from("Beta")));
    assert_eq!(counts.get(1, "nProposals"), Some(&Cell::Int(0)));
}

#[test]
fn analysis_survives_a_csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let census_path = dir.path().join("census.csv");
    let proposals_path = dir.path().join("proposals.csv");
    write_table(&census(), &census_path, Delimiter::Semicolon).unwrap();
    write_table(&proposals(), &proposals_path, Delimiter::Comma).unwrap();

    let census = read_table(&census_path).unwrap();
    let proposals = read_table(&proposals_path).unwrap();

    let boost = boost_data(&census, &proposals).unwrap();
    assert_eq!(boost.get(0, "nPropAccepted"), Some(&Cell::Int(2)));
    assert_eq!(boost.get(0, "nBoost"), Some(&Cell::Int(1)));

    let accuracy = prediction_accuracy(&census, &proposals).unwrap();
    // tp = p1, tn = p2, fn = p3
    assert_eq!(accuracy.get(0, "accuracy"), Some(&Cell::Float(0.67)));
    assert_eq!(accuracy.get(1, "accuracy"), Some(&Cell::Null));
}
