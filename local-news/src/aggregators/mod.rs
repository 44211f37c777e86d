pub mod stats;

pub use stats::{AggregateStats, CountTable, StatsAggregator, StatsSummary, DEFAULT_TOP_LIMIT};
