//! DAO census: users, proposals, votes, stakes and holdings per DAO

use super::daos::{fetch_daos, DaoDirectory};
use crate::aggregate::ParentCounts;
use crate::config::{CensusConfig, CENSUS_FILE};
use crate::error::CensusError;
use crate::export::write_table;
use crate::holdings::{find_holdings_file, load_holdings, HOLDING_COLUMNS};
use crate::join::{join_by_id, join_by_id_or};
use crate::paginator::Paginator;
use crate::query::{QueryTemplate, DAO_CENSUS_QUERY, PROPOSAL_ID_QUERY, STAKE_ID_QUERY, VOTE_ID_QUERY};
use crate::table::{Cell, Table};
use crate::transport::Transport;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Column order of `census.csv`.
pub const CENSUS_COLUMNS: [&str; 9] = [
    "id",
    "name",
    "n_users",
    "n_proposals",
    "n_votes",
    "n_stakes",
    "ETH",
    "GEN",
    "otherTokens",
];

/// A per-DAO child entity counted by the census.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedEntity {
    pub label: &'static str,
    pub template: QueryTemplate,
    pub result_key: &'static str,
    pub column: &'static str,
}

pub const PROPOSALS: CountedEntity = CountedEntity {
    label: "proposals",
    template: PROPOSAL_ID_QUERY,
    result_key: "proposals",
    column: "n_proposals",
};

pub const VOTES: CountedEntity = CountedEntity {
    label: "votes",
    template: VOTE_ID_QUERY,
    result_key: "proposalVotes",
    column: "n_votes",
};

pub const STAKES: CountedEntity = CountedEntity {
    label: "stakes",
    template: STAKE_ID_QUERY,
    result_key: "proposalStakes",
    column: "n_stakes",
};

/// Counts `entity` records for every DAO of the directory.
///
/// DAOs without any record are recorded with a count of 0.
pub async fn count_per_dao<T: Transport>(
    paginator: &Paginator<'_, T>,
    daos: &DaoDirectory,
    entity: CountedEntity,
) -> Result<ParentCounts, CensusError> {
    info!("Requesting {} ...", entity.label);
    let start = Instant::now();

    let mut counts = ParentCounts::new(entity.column);
    for dao_id in daos.ids() {
        let records = paginator
            .collect(entity.template, entity.result_key, Some(dao_id))
            .await?;
        counts.record(dao_id, records.len() as u64);
    }

    info!(
        "{} requested in {:.2}s ({} total)",
        entity.label,
        start.elapsed().as_secs_f64(),
        counts.total()
    );
    Ok(counts)
}

/// Builds `id, name, n_users, n_proposals, n_votes, n_stakes`.
pub async fn collect_census<T: Transport>(
    paginator: &Paginator<'_, T>,
    daos: &DaoDirectory,
) -> Result<Table, CensusError> {
    let mut census = daos.to_table();
    for entity in [PROPOSALS, VOTES, STAKES] {
        let counts = count_per_dao(paginator, daos, entity).await?;
        join_by_id(&mut census, &counts.to_table(), &[entity.column])?;
    }
    Ok(census)
}

/// Adds `ETH`, `GEN` and `otherTokens` from the holdings table; DAOs without holdings
/// keep 0.0.
pub fn attach_holdings(census: &mut Table, holdings: &Table) -> Result<(), CensusError> {
    join_by_id_or(census, holdings, &HOLDING_COLUMNS, Cell::Float(0.0))?;
    *census = census.select(&CENSUS_COLUMNS)?;
    Ok(())
}

/// Runs the whole census and writes `census.csv`.
///
/// # Returns
/// The path of the written file.
pub async fn run<T: Transport>(transport: &T, config: &CensusConfig) -> Result<PathBuf, CensusError> {
    let paginator = Paginator::with_page_size(transport, config.page_size);

    let daos = fetch_daos(&paginator, DAO_CENSUS_QUERY).await?;
    let mut census = collect_census(&paginator, &daos).await?;

    let holdings_path = find_holdings_file(config.datawarehouse(), &config.holdings_marker)?;
    let holdings = load_holdings(&holdings_path)?;
    attach_holdings(&mut census, &holdings)?;

    let out_file = config.output_path(CENSUS_FILE);
    write_table(&census, &out_file, config.delimiter)?;
    info!("DONE. Data stored in {}", out_file.display());
    Ok(out_file)
}
