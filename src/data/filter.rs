//! Filter Engine Module
//! "All-or-subset" selection over particulars and months.

use crate::data::model::{DataColumns, MonthOrdering, Record};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Pick-list token meaning "no constraint".
pub const ALL_TOKEN: &str = "All";

/// Selection over one dimension.
///
/// `Only` with an empty set selects nothing; it is never read as `All`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(labels.into_iter().map(Into::into).collect())
    }

    pub fn none() -> Self {
        Selection::Only(BTreeSet::new())
    }

    /// Interpret a widget pick list, in the order the user picked.
    ///
    /// A concrete pick made after "All" drops "All"; picking "All" last
    /// clears the concrete labels. No picks selects nothing.
    pub fn from_picks<S: AsRef<str>>(picks: &[S]) -> Self {
        match picks.last() {
            None => Selection::none(),
            Some(last) if last.as_ref() == ALL_TOKEN => Selection::All,
            Some(_) => Selection::only(
                picks
                    .iter()
                    .map(|p| p.as_ref())
                    .filter(|p| *p != ALL_TOKEN)
                    .map(str::to_string),
            ),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(labels) => labels.contains(label),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

/// Current filter state, owned by the caller between interactions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub particulars: Selection,
    pub months: Selection,
}

impl FilterSelection {
    pub fn new(particulars: Selection, months: Selection) -> Self {
        Self {
            particulars,
            months,
        }
    }

    pub fn with_particulars(self, particulars: Selection) -> Self {
        Self {
            particulars,
            ..self
        }
    }

    pub fn with_months(self, months: Selection) -> Self {
        Self { months, ..self }
    }

    pub fn matches(&self, particular: &str, month: &str) -> bool {
        self.particulars.contains(particular) && self.months.contains(month)
    }
}

pub struct FilterEngine;

impl FilterEngine {
    /// Rows matching the selection, in input order.
    pub fn apply(selection: &FilterSelection, records: &[Record]) -> Vec<Record> {
        let filtered: Vec<Record> = records
            .iter()
            .filter(|r| selection.matches(&r.particular, &r.month))
            .cloned()
            .collect();
        debug!(input = records.len(), output = filtered.len(), "filtered records");
        filtered
    }

    /// Apply the same predicate to the cleaned frame, keeping every column.
    ///
    /// Rows with a null particular or month only survive an "All" dimension.
    pub fn apply_frame(
        selection: &FilterSelection,
        frame: &DataFrame,
        columns: &DataColumns,
    ) -> PolarsResult<DataFrame> {
        let particulars = frame.column(&columns.particular)?.cast(&DataType::String)?;
        let months = frame.column(&columns.month)?.cast(&DataType::String)?;

        let mask: BooleanChunked = particulars
            .str()?
            .into_iter()
            .zip(months.str()?.into_iter())
            .map(|(particular, month)| {
                let particular_ok = match particular {
                    Some(p) => selection.particulars.contains(p.trim()),
                    None => selection.particulars.is_all(),
                };
                let month_ok = match month {
                    Some(m) => selection.months.contains(m.trim()),
                    None => selection.months.is_all(),
                };
                particular_ok && month_ok
            })
            .collect();

        frame.filter(&mask)
    }

    /// Particular pick-list options: "All" then distinct labels sorted.
    pub fn particular_options(records: &[Record]) -> Vec<String> {
        let distinct: BTreeSet<&str> = records.iter().map(|r| r.particular.as_str()).collect();
        std::iter::once(ALL_TOKEN.to_string())
            .chain(distinct.into_iter().map(str::to_string))
            .collect()
    }

    /// Month pick-list options: "All" then months in chronological rank.
    pub fn month_options(ordering: &MonthOrdering) -> Vec<String> {
        std::iter::once(ALL_TOKEN.to_string())
            .chain(ordering.labels().iter().cloned())
            .collect()
    }
}
