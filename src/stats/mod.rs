//! Statistics module - aggregation, reshaping, period changes and trends

mod aggregator;
mod calculator;
mod change;
mod trend;

pub use aggregator::{Aggregator, MonthSummary, OverviewMetrics, ParticularTotal, PivotTable};
pub use calculator::{LatestValue, ParticularStats, StatsCalculator};
pub use change::{
    average_changes, change_matrix, delta, particular_series, pct_change, period_over_period,
    AverageChange, ChangeMatrix, PeriodChange,
};
pub use trend::{linear_trend, LinearTrend, MIN_TREND_POINTS};
