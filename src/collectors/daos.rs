use crate::error::CensusError;
use crate::join::ID;
use crate::paginator::Paginator;
use crate::query::QueryTemplate;
use crate::record::RecordExt;
use crate::table::{Cell, Table};
use crate::transport::Transport;
use std::time::Instant;
use tracing::info;

/// A registered DAO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dao {
    pub id: String,
    pub name: String,
    /// Reputation holder count, when the query asked for it
    pub n_users: Option<i64>,
}

/// The DAOs known to a run.
///
/// Produced once by [`fetch_daos`] and handed to every per-DAO collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaoDirectory {
    daos: Vec<Dao>,
}

impl DaoDirectory {
    pub fn new(daos: Vec<Dao>) -> Self {
        DaoDirectory { daos }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dao> {
        self.daos.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.daos.iter().map(|d| d.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&Dao> {
        self.daos.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.daos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.daos.is_empty()
    }

    /// `id, name, n_users` table.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new([ID, "name", "n_users"]);
        for dao in &self.daos {
            table.push_row(vec![
                Cell::from(dao.id.as_str()),
                Cell::from(dao.name.as_str()),
                Cell::from(dao.n_users),
            ]);
        }
        table
    }
}

/// Requests every registered DAO.
///
/// `reputationHoldersCount`, when the template selects it, becomes `n_users`.
pub async fn fetch_daos<T: Transport>(
    paginator: &Paginator<'_, T>,
    template: QueryTemplate,
) -> Result<DaoDirectory, CensusError> {
    info!("Requesting DAOs ...");
    let start = Instant::now();

    let records = paginator.collect(template, "daos", None).await?;

    info!("DAOs requested in {:.2}s", start.elapsed().as_secs_f64());

    let daos = records
        .iter()
        .filter_map(|record| {
            let id = record.str_field("id")?;
            Some(Dao {
                id: id.to_string(),
                name: record.str_field("name").unwrap_or_default().to_string(),
                n_users: record.i64_field("reputationHoldersCount"),
            })
        })
        .collect();

    Ok(DaoDirectory::new(daos))
}
