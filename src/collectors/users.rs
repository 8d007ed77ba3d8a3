use super::daos::{fetch_daos, DaoDirectory};
use crate::config::CensusConfig;
use crate::error::CensusError;
use crate::paginator::Paginator;
use crate::query::{DAO_QUERY, REPUTATION_HOLDER_QUERY};
use crate::record::RecordExt;
use crate::transport::Transport;
use std::collections::HashSet;
use std::time::Instant;
use tracing::info;

/// Reputation holders across all DAOs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserCensus {
    /// Holder entries summed over DAOs (an address in two DAOs counts twice)
    pub total: usize,
    /// Distinct addresses
    pub distinct: usize,
}

pub async fn count_users<T: Transport>(
    paginator: &Paginator<'_, T>,
    daos: &DaoDirectory,
) -> Result<UserCensus, CensusError> {
    info!("Requesting users ...");
    let start = Instant::now();

    let mut total = 0;
    let mut addresses = HashSet::new();
    for dao_id in daos.ids() {
        let holders = paginator
            .collect(REPUTATION_HOLDER_QUERY, "reputationHolders", Some(dao_id))
            .await?;
        total += holders.len();
        addresses.extend(
            holders
                .iter()
                .filter_map(|h| h.str_field("address"))
                .map(str::to_string),
        );
    }

    info!("Users requested in {:.2}s", start.elapsed().as_secs_f64());
    Ok(UserCensus {
        total,
        distinct: addresses.len(),
    })
}

/// Counts users over every registered DAO and logs the result.
pub async fn run<T: Transport>(transport: &T, config: &CensusConfig) -> Result<UserCensus, CensusError> {
    let paginator = Paginator::with_page_size(transport, config.page_size);
    let daos = fetch_daos(&paginator, DAO_QUERY).await?;
    let users = count_users(&paginator, &daos).await?;

    info!("Total users = {}", users.total);
    info!("Total different users = {}", users.distinct);
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::transport::InMemoryTransport;
    use serde_json::json;

    fn holders(addresses: &[&str]) -> Vec<Record> {
        addresses
            .iter()
            .map(|a| json!({ "address": a }).as_object().cloned().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_total_and_distinct_users() {
        let mut transport = InMemoryTransport::new();
        transport.add_records(
            "daos",
            None,
            vec![
                json!({"id": "0xa", "name": "Alpha"}).as_object().cloned().unwrap(),
                json!({"id": "0xb", "name": "Beta"}).as_object().cloned().unwrap(),
                json!({"id": "0xc", "name": "Gamma"}).as_object().cloned().unwrap(),
            ],
        );
        transport.add_records("reputationHolders", Some("0xa"), holders(&["u1", "u2", "u3"]));
        transport.add_records("reputationHolders", Some("0xb"), holders(&["u2", "u4"]));

        let config = CensusConfig::default().with_page_size(2);
        let users = run(&transport, &config).await.unwrap();

        assert_eq!(users, UserCensus { total: 5, distinct: 4 });
    }
}
