//! Executed proposals with outcome, boosting and staking details

use super::daos::{fetch_daos, DaoDirectory};
use crate::config::{CensusConfig, PROPOSALS_FILE};
use crate::error::CensusError;
use crate::export::write_table;
use crate::paginator::Paginator;
use crate::query::{DAO_QUERY, EXECUTED_PROPOSAL_QUERY};
use crate::record::{Record, RecordExt};
use crate::table::{Cell, Table};
use crate::transport::Transport;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Column order of `proposals.csv`.
pub const PROPOSAL_COLUMNS: [&str; 12] = [
    "daoId",
    "daoName",
    "proposalId",
    "createdAt",
    "totalRepWhenExecuted",
    "votesFor",
    "votesAgainst",
    "hasPassed",
    "boostedAt",
    "stakesFor",
    "stakesAgainst",
    "differentStakers",
];

/// Number of distinct addresses in a proposal's nested `stakes` list.
pub fn different_stakers(record: &Record) -> usize {
    record
        .get("stakes")
        .and_then(Value::as_array)
        .map(|stakes| {
            stakes
                .iter()
                .filter_map(|s| s.get("staker").and_then(Value::as_str))
                .collect::<HashSet<_>>()
                .len()
        })
        .unwrap_or(0)
}

/// Flattens one proposal record into a `proposals.csv` row.
fn proposal_row(record: &Record, dao_id: &str, dao_name: &str) -> Vec<Cell> {
    let field = |key: &str| record.get(key).map(Cell::from_json).unwrap_or(Cell::Null);
    let has_passed = record.str_field("winningOutcome") == Some("Pass");

    vec![
        Cell::from(dao_id),
        Cell::from(dao_name),
        field("id"),
        Cell::from(record.i64_field("createdAt")),
        field("totalRepWhenExecuted"),
        field("votesFor"),
        field("votesAgainst"),
        Cell::from(has_passed),
        field("boostedAt"),
        field("stakesFor"),
        field("stakesAgainst"),
        Cell::from(different_stakers(record)),
    ]
}

/// Requests executed proposals for every DAO.
pub async fn collect_proposals<T: Transport>(
    paginator: &Paginator<'_, T>,
    daos: &DaoDirectory,
) -> Result<Table, CensusError> {
    info!("Requesting proposals ...");
    let start = Instant::now();

    let mut table = Table::new(PROPOSAL_COLUMNS);
    for dao in daos.iter() {
        let records = paginator
            .collect(EXECUTED_PROPOSAL_QUERY, "proposals", Some(dao.id.as_str()))
            .await?;
        for record in &records {
            table.push_row(proposal_row(record, &dao.id, &dao.name));
        }
    }

    info!("Proposals requested in {:.2}s", start.elapsed().as_secs_f64());
    Ok(table)
}

/// Keeps proposals created at or before `created_before`; `None` keeps everything.
pub fn created_before(table: &Table, created_before: Option<i64>) -> Table {
    match created_before {
        Some(limit) => table.filter(|row| row.i64("createdAt").is_some_and(|t| t <= limit)),
        None => table.clone(),
    }
}

/// Runs the proposal collector and writes `proposals.csv`.
pub async fn run<T: Transport>(transport: &T, config: &CensusConfig) -> Result<PathBuf, CensusError> {
    let paginator = Paginator::with_page_size(transport, config.page_size);

    let daos = fetch_daos(&paginator, DAO_QUERY).await?;
    let proposals = collect_proposals(&paginator, &daos).await?;
    let proposals = created_before(&proposals, config.proposals_created_before);

    let out_file = config.output_path(PROPOSALS_FILE);
    write_table(&proposals, &out_file, config.delimiter)?;
    info!("DONE. Data stored in {}", out_file.display());
    Ok(out_file)
}
