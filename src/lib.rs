pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod transport;
pub mod paginator;
pub mod table;
pub mod join;
pub mod aggregate;
pub mod export;
pub mod holdings;
pub mod collectors;
pub mod analysis;
pub mod plot;


pub use config::CensusConfig;
pub use error::CensusError;
pub use query::QueryTemplate;
pub use record::{Record, RecordExt};
pub use transport::{GraphQlClient, InMemoryTransport, Transport, TransportConfig, TransportError};
pub use paginator::{Paginator, RetryPolicy, PAGE_SIZE};
pub use table::{Cell, Row, Table};
pub use join::{fill_ids, join_by_id, join_by_id_or};
pub use aggregate::{group_size, ParentCounts};
pub use export::{read_table, write_table, Delimiter};
pub use holdings::{find_holdings_file, load_holdings};
pub use collectors::{Dao, DaoDirectory, UserCensus};
pub use plot::{Chart, Figure};
