//! Chart rendering
//!
//! Charts read the exported tables from the data-warehouse directory and are written
//! as standalone HTML pages under `<datawarehouse>/plots/`.

pub mod charts;
pub mod figure;

pub use figure::{Axis, Color, Figure, Layout, Marker, Trace, TraceKind};

use crate::analysis::{
    activity_ratio, boost_data, budget_stats, budget_table, month_activity, monthly_actives,
    prediction_accuracy,
};
use crate::config::{CensusConfig, ACTIVITY_FILE, CENSUS_FILE, PROPOSALS_FILE};
use crate::error::CensusError;
use crate::export::read_table;
use crate::join::join_by_id;
use crate::table::Table;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// DAOs below this budget (USD) are left out of the budget chart.
pub const MIN_BUDGET: f64 = 1.0;

/// Charts the CLI can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    Census,
    Users,
    Distributions,
    Holdings,
    Budget,
    Activity,
    Correlation,
    Boosting,
    Prediction,
    TimeSeries,
}

impl Chart {
    pub const ALL: [Chart; 10] = [
        Chart::Census,
        Chart::Users,
        Chart::Distributions,
        Chart::Holdings,
        Chart::Budget,
        Chart::Activity,
        Chart::Correlation,
        Chart::Boosting,
        Chart::Prediction,
        Chart::TimeSeries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Chart::Census => "census",
            Chart::Users => "users",
            Chart::Distributions => "distributions",
            Chart::Holdings => "holdings",
            Chart::Budget => "budget",
            Chart::Activity => "activity",
            Chart::Correlation => "correlation",
            Chart::Boosting => "boosting",
            Chart::Prediction => "prediction",
            Chart::TimeSeries => "time-series",
        }
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Chart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chart::ALL
            .into_iter()
            .find(|chart| chart.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Chart::ALL.iter().map(|c| c.name()).collect();
                format!("unknown chart '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

fn load(config: &CensusConfig, file: &str) -> Result<Table, CensusError> {
    read_table(&config.output_path(file))
}

/// Builds the figures of `chart`, named by their output file stem.
pub fn build(chart: Chart, config: &CensusConfig, today: NaiveDate) -> Result<Vec<(String, Figure)>, CensusError> {
    let name = chart.name().to_string();
    let numbered = |figures: Vec<Figure>| -> Vec<(String, Figure)> {
        figures
            .into_iter()
            .enumerate()
            .map(|(i, f)| (format!("{}-{}", name, i + 1), f))
            .collect()
    };

    let figures = match chart {
        Chart::Census => vec![(name.clone(), charts::census_scatter(&load(config, CENSUS_FILE)?)?)],
        Chart::Users => vec![(name.clone(), charts::user_distribution(&load(config, CENSUS_FILE)?)?)],
        Chart::Distributions => numbered(charts::distributions(&load(config, CENSUS_FILE)?)?),
        Chart::Holdings => vec![(name.clone(), charts::holdings(&load(config, CENSUS_FILE)?)?)],
        Chart::Budget => {
            let table = budget_table(&load(config, CENSUS_FILE)?, MIN_BUDGET)?;
            info!("Stats:\n{}", budget_stats(&table)?);
            vec![(name.clone(), charts::budget(&table)?)]
        }
        Chart::Activity => {
            let months = month_activity(&load(config, CENSUS_FILE)?, &load(config, ACTIVITY_FILE)?, today)?;
            vec![(name.clone(), charts::activity_months(&months)?)]
        }
        Chart::Correlation => numbered(charts::correlations(&load(config, CENSUS_FILE)?)?),
        Chart::Boosting => {
            let census = load(config, CENSUS_FILE)?;
            let mut boost = boost_data(&census, &load(config, PROPOSALS_FILE)?)?;
            let months = month_activity(&census, &load(config, ACTIVITY_FILE)?, today)?;
            join_by_id(&mut boost, &months, &["activityMonths", "monthLife"])?;
            activity_ratio(&mut boost);
            vec![(name.clone(), charts::boosting_correlation(&boost)?)]
        }
        Chart::Prediction => {
            let table = prediction_accuracy(&load(config, CENSUS_FILE)?, &load(config, PROPOSALS_FILE)?)?;
            vec![(name.clone(), charts::prediction_rate(&table)?)]
        }
        Chart::TimeSeries => {
            let activity = load(config, ACTIVITY_FILE)?;
            vec![
                (
                    format!("{}-daos", name),
                    charts::time_series(&monthly_actives(&activity, "daoId")?, "Number of active DAOs")?,
                ),
                (
                    format!("{}-users", name),
                    charts::time_series(&monthly_actives(&activity, "userId")?, "Number of active users")?,
                ),
            ]
        }
    };
    Ok(figures)
}

/// Renders `chart` into `<datawarehouse>/plots/` and returns the written pages.
pub fn render(chart: Chart, config: &CensusConfig, today: NaiveDate) -> Result<Vec<PathBuf>, CensusError> {
    let plots_dir = config.output_path("plots");

    let mut written = Vec::new();
    for (stem, figure) in build(chart, config, today)? {
        let path = plots_dir.join(format!("{}.html", stem));
        figure.write_html(&path)?;
        written.push(path);
    }
    info!("{} chart(s) rendered for '{}'", written.len(), chart);
    Ok(written)
}
