//! Derived DAO metrics
//!
//! Stateless functions turning the collected tables (census, proposals, activity)
//! into the per-DAO metrics the charts display.

pub mod activity;
pub mod boost;
pub mod budget;
pub mod prediction;
pub mod stats;

pub use activity::{activity_ratio, month_activity, monthly_actives, months_between};
pub use boost::boost_data;
pub use budget::{budget_stats, budget_table, BudgetStats};
pub use prediction::{prediction_accuracy, proposal_color, Confusion, PROPOSAL_BUCKETS};
pub use stats::{pearson, quantile, round2};
