//! Collectors turning paginated entity queries into per-DAO tables
//!
//! Every collector starts from a [`DaoDirectory`] and issues one pagination per DAO.

pub mod activity;
pub mod census;
pub mod daos;
pub mod proposals;
pub mod users;

pub use activity::{ActionKind, ACTIVITY_COLUMNS};
pub use census::{CountedEntity, CENSUS_COLUMNS};
pub use daos::{fetch_daos, Dao, DaoDirectory};
pub use proposals::PROPOSAL_COLUMNS;
pub use users::UserCensus;
