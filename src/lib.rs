//! Bank Dashboard - Banking Spreadsheet Filter, Pivot & Trend Pipeline
//!
//! Loads a banking workbook ("Data" and "NPA" sheets), cleans it, filters it
//! by particular and month, and derives the summaries, pivots, period changes
//! and trend lines a dashboard displays.

pub mod config;
pub mod dashboard;
pub mod data;
pub mod format;
pub mod report;
pub mod stats;

pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{Dashboard, DashboardError, DetailView, Notice, OverviewView, TrendView};
pub use format::{classify_column, Formatter, ValueKind};
