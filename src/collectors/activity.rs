//! Activity time series: every proposal, vote and stake with its author and date
//!
//! This collector runs for a long time against a rate-limited endpoint, so it pauses
//! between batches and retries a failed DAO once after a cooldown.

use super::daos::{fetch_daos, DaoDirectory};
use crate::config::{CensusConfig, ACTIVITY_FILE};
use crate::error::CensusError;
use crate::export::write_table;
use crate::paginator::{Paginator, RetryPolicy};
use crate::query::{QueryTemplate, DAO_QUERY, PROPOSAL_ACTION_QUERY, STAKE_ACTION_QUERY, VOTE_ACTION_QUERY};
use crate::record::RecordExt;
use crate::table::{Cell, Table};
use crate::transport::Transport;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Column order of `activity_serie.csv`.
pub const ACTIVITY_COLUMNS: [&str; 5] = ["daoId", "daoName", "actionType", "unixDate", "userId"];

/// Kind of governance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Proposal,
    Vote,
    Stake,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Proposal, ActionKind::Vote, ActionKind::Stake];

    /// Value of the `actionType` column.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Proposal => "proposal",
            ActionKind::Vote => "vote",
            ActionKind::Stake => "stake",
        }
    }

    fn template(self) -> QueryTemplate {
        match self {
            ActionKind::Proposal => PROPOSAL_ACTION_QUERY,
            ActionKind::Vote => VOTE_ACTION_QUERY,
            ActionKind::Stake => STAKE_ACTION_QUERY,
        }
    }

    fn result_key(self) -> &'static str {
        match self {
            ActionKind::Proposal => "proposals",
            ActionKind::Vote => "proposalVotes",
            ActionKind::Stake => "proposalStakes",
        }
    }

    /// Record field holding the acting address.
    fn user_field(self) -> &'static str {
        match self {
            ActionKind::Proposal => "proposer",
            ActionKind::Vote => "voter",
            ActionKind::Stake => "staker",
        }
    }
}

/// Requests every action of `kind` for all DAOs.
///
/// A failing DAO is retried once after `cooldown`; a second failure aborts.
pub async fn collect_actions<T: Transport>(
    paginator: &Paginator<'_, T>,
    daos: &DaoDirectory,
    kind: ActionKind,
    cooldown: Duration,
) -> Result<Table, CensusError> {
    info!("Requesting {}s ...", kind.label());
    let start = Instant::now();
    let policy = RetryPolicy::Once { cooldown };

    let mut table = Table::new(ACTIVITY_COLUMNS);
    for dao in daos.iter() {
        let records = paginator
            .collect_with_retry(kind.template(), kind.result_key(), Some(dao.id.as_str()), policy)
            .await?;

        for record in &records {
            table.push_row(vec![
                Cell::from(dao.id.as_str()),
                Cell::from(dao.name.as_str()),
                Cell::from(kind.label()),
                Cell::from(record.i64_field("createdAt")),
                Cell::from(record.str_field(kind.user_field())),
            ]);
        }
    }

    info!(
        "{}s requested in {:.2}s",
        kind.label(),
        start.elapsed().as_secs_f64()
    );
    Ok(table)
}

/// Collects proposals, votes and stakes, pausing `pause` before each batch.
pub async fn collect_activity<T: Transport>(
    paginator: &Paginator<'_, T>,
    daos: &DaoDirectory,
    cooldown: Duration,
    pause: Duration,
) -> Result<Table, CensusError> {
    let mut activity = Table::new(ACTIVITY_COLUMNS);
    for kind in ActionKind::ALL {
        if !pause.is_zero() {
            info!("Pausing {}s before the next batch", pause.as_secs());
            tokio::time::sleep(pause).await;
        }
        activity.append(collect_actions(paginator, daos, kind, cooldown).await?);
    }
    Ok(activity)
}

/// Runs the activity collector and writes `activity_serie.csv`.
pub async fn run<T: Transport>(transport: &T, config: &CensusConfig) -> Result<PathBuf, CensusError> {
    let paginator = Paginator::with_page_size(transport, config.page_size);

    let daos = fetch_daos(&paginator, DAO_QUERY).await?;
    let activity = collect_activity(&paginator, &daos, config.retry_cooldown, config.batch_pause).await?;
    let activity = activity.select(&ACTIVITY_COLUMNS)?;

    let out_file = config.output_path(ACTIVITY_FILE);
    write_table(&activity, &out_file, config.delimiter)?;
    info!("DONE. Data stored in {}", out_file.display());
    Ok(out_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::daos::Dao;
    use crate::record::Record;
    use crate::transport::InMemoryTransport;
    use serde_json::json;

    fn action(user_field: &str, user: &str, created_at: &str) -> Record {
        let mut record = Record::new();
        record.insert(user_field.to_string(), json!(user));
        record.insert("createdAt".to_string(), json!(created_at));
        record
    }

    fn directory() -> DaoDirectory {
        DaoDirectory::new(vec![
            Dao { id: "0xa".to_string(), name: "Alpha".to_string(), n_users: None },
            Dao { id: "0xb".to_string(), name: "Beta".to_string(), n_users: None },
        ])
    }

    fn transport() -> InMemoryTransport {
        let mut transport = InMemoryTransport::new();
        transport.add_records("proposals", Some("0xa"), vec![action("proposer", "u1", "1580000000")]);
        transport.add_records(
            "proposalVotes",
            Some("0xa"),
            vec![action("voter", "u1", "1580000100"), action("voter", "u2", "1580000200")],
        );
        transport.add_records("proposalStakes", Some("0xb"), vec![action("staker", "u3", "1580000300")]);
        transport
    }

    #[tokio::test]
    async fn test_collect_activity_rows() {
        let transport = transport();
        let paginator = Paginator::new(&transport);

        let activity = collect_activity(&paginator, &directory(), Duration::ZERO, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(activity.columns(), &ACTIVITY_COLUMNS);
        assert_eq!(activity.len(), 4);
        let kinds = activity.column_text("actionType").unwrap();
        assert_eq!(kinds, vec!["proposal", "vote", "vote", "stake"]);
        assert_eq!(activity.get(3, "daoName"), Some(&Cell::from("Beta")));
        assert_eq!(activity.get(3, "userId"), Some(&Cell::from("u3")));
        assert_eq!(activity.get(0, "unixDate"), Some(&Cell::Int(1580000000)));
    }

    #[tokio::test]
    async fn test_failed_dao_is_retried_once() {
        let transport = transport();
        let paginator = Paginator::new(&transport);
        transport.fail_next(1);

        let votes = collect_actions(&paginator, &directory(), ActionKind::Vote, Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(votes.len(), 2);
        // failed attempt + retry for 0xa, one request for 0xb
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_repeated_failure_aborts() {
        let transport = transport();
        let paginator = Paginator::new(&transport);
        transport.fail_next(2);

        let result = collect_actions(&paginator, &directory(), ActionKind::Stake, Duration::ZERO).await;
        assert!(matches!(result, Err(CensusError::Transport(_))));
    }
}
