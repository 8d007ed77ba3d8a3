//! DAO census command line
//!
//! Run with: `cargo run --bin daocensus -- census`
//!
//! Set `RUST_LOG` to control the log level, e.g. `RUST_LOG=daocensus=debug`.

use chrono::Utc;
use clap::{Parser, Subcommand};
use daocensus::collectors::{activity, census, proposals, users};
use daocensus::config::{CensusConfig, DAOSTACK_URL};
use daocensus::plot::{self, Chart};
use daocensus::transport::{GraphQlClient, TransportConfig, TransportError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Collects DAOstack DAO statistics and renders charts from them.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GraphQL endpoint of the DAOstack subgraph
    #[arg(long, env = "DAOCENSUS_ENDPOINT", default_value = DAOSTACK_URL)]
    endpoint: String,

    /// Directory holding the holdings file and the exported tables
    #[arg(long, env = "DAOCENSUS_DATAWAREHOUSE", default_value = "datawarehouse")]
    datawarehouse: PathBuf,

    /// HTTP request timeout
    #[arg(long, default_value_t = 30)]
    timeout_seconds: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Per-DAO counts joined with holdings, written to census.csv
    Census,
    /// Executed proposals, written to proposals.csv
    Proposals,
    /// Proposal, vote and stake time series, written to activity_serie.csv
    Activity {
        /// Skip the pauses between batches and before retries
        #[arg(long)]
        no_pauses: bool,
    },
    /// Total and distinct reputation holders
    Users,
    /// Render a chart from the exported tables
    Plot {
        /// One of: census, users, distributions, holdings, budget, activity,
        /// correlation, boosting, prediction, time-series
        chart: Chart,
    },
}

fn transport(config: &CensusConfig) -> Result<GraphQlClient, TransportError> {
    GraphQlClient::new(TransportConfig {
        endpoint: config.endpoint.clone(),
        timeout_seconds: config.timeout_seconds,
    })
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CensusConfig::new(args.endpoint, args.datawarehouse);
    config.timeout_seconds = args.timeout_seconds;

    match args.command {
        Command::Census => {
            census::run(&transport(&config)?, &config).await?;
        }
        Command::Proposals => {
            proposals::run(&transport(&config)?, &config).await?;
        }
        Command::Activity { no_pauses } => {
            if no_pauses {
                config = config.without_pauses();
            }
            activity::run(&transport(&config)?, &config).await?;
        }
        Command::Users => {
            let users = users::run(&transport(&config)?, &config).await?;
            println!("Total users = {}", users.total);
            println!("Total different users = {}", users.distinct);
        }
        Command::Plot { chart } => {
            for path in plot::render(chart, &config, Utc::now().date_naive())? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    run(Args::parse()).await
}
