// Analyzer module: summaries over a run's batch and over the whole history.

pub mod history;
pub mod price_analysis;

pub use history::{average_by_date, cheapest};
pub use price_analysis::calculate_stats;
