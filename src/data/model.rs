//! Data Model Module
//! Typed rows produced by the normalizer and shared by every later stage.

use polars::prelude::*;
use std::collections::HashMap;

/// Name of the rank column appended to the cleaned frame.
pub const MONTH_RANK_COLUMN: &str = "Month_Num";

/// One row of the transactional "Data" sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub particular: String,
    pub month: String,
    pub month_rank: usize,
    pub amount: Option<f64>,
}

impl Record {
    pub fn new(particular: &str, month: &str, month_rank: usize, amount: Option<f64>) -> Self {
        Self {
            particular: particular.to_string(),
            month: month.to_string(),
            month_rank,
            amount,
        }
    }
}

/// One row of the "NPA" sheet. Ratios are fractions of advances.
#[derive(Debug, Clone, PartialEq)]
pub struct NpaRecord {
    pub month: String,
    pub gross_npa_ratio: Option<f64>,
    pub net_npa_ratio: Option<f64>,
}

/// Chronological rank of month labels, taken from first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthOrdering {
    labels: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl MonthOrdering {
    /// Build from labels in source row order. Repeats keep their first rank.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordering = Self::default();
        for label in labels {
            let label = label.as_ref();
            if !ordering.ranks.contains_key(label) {
                ordering.ranks.insert(label.to_string(), ordering.labels.len());
                ordering.labels.push(label.to_string());
            }
        }
        ordering
    }

    pub fn rank(&self, label: &str) -> Option<usize> {
        self.ranks.get(label).copied()
    }

    /// Month labels in rank order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Cells the value coercion turned into missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionReport {
    /// Cells equal to the placeholder token.
    pub placeholder_cells: usize,
    /// Non-empty cells that failed to parse as a number.
    pub unparseable_cells: usize,
    /// Rows dropped from the typed records for lacking a particular or month.
    pub skipped_rows: usize,
}

impl CoercionReport {
    pub fn has_warnings(&self) -> bool {
        self.unparseable_cells > 0 || self.skipped_rows > 0
    }
}

/// Column names of the transactional table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumns {
    pub particular: String,
    pub month: String,
    pub value: String,
}

impl Default for DataColumns {
    fn default() -> Self {
        Self {
            particular: "Particulars".to_string(),
            month: "Month".to_string(),
            value: "Rs".to_string(),
        }
    }
}

/// A cleaned "Data" sheet, held read-only until the next refresh.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Cleaned frame: denylisted columns removed, value column numeric,
    /// month rank appended.
    pub frame: DataFrame,
    pub records: Vec<Record>,
    pub months: MonthOrdering,
    pub columns: DataColumns,
    pub coercion: CoercionReport,
}

impl Dataset {
    /// Column names of the cleaned frame.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }
}
