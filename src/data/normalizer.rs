//! Schema Normalizer Module
//! Cleans raw sheets into typed records: drops denylisted columns, coerces
//! values to numbers, and ranks months in first-seen order.

use crate::data::model::{
    CoercionReport, DataColumns, Dataset, MonthOrdering, NpaRecord, Record, MONTH_RANK_COLUMN,
};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column '{column}' cannot be both the {first} and the {second} column")]
    AmbiguousColumn {
        column: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Normalization rules for the "Data" sheet.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub columns: DataColumns,
    /// Columns removed before anything else; unknown names are ignored.
    pub dropped_columns: Vec<String>,
    /// Cell text meaning "no value", e.g. "-".
    pub placeholder_token: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            columns: DataColumns::default(),
            dropped_columns: vec![
                "S.N.".to_string(),
                "S.No.".to_string(),
                "Remarks".to_string(),
            ],
            placeholder_token: "-".to_string(),
        }
    }
}

/// Explicit NPA column names. Unset names fall back to keyword detection.
#[derive(Debug, Clone, Default)]
pub struct NpaColumnOverrides {
    pub month: Option<String>,
    pub gross: Option<String>,
    pub net: Option<String>,
}

/// Resolved NPA column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpaColumns {
    pub month: String,
    pub gross: String,
    pub net: String,
}

pub struct Normalizer;

impl Normalizer {
    /// Clean the raw "Data" sheet into a dataset.
    pub fn normalize(raw: &DataFrame, options: &NormalizeOptions) -> Result<Dataset, SchemaError> {
        let mut frame = Self::drop_columns(raw, &options.dropped_columns)?;

        let columns = &options.columns;
        Self::require_columns(
            &frame,
            &[&columns.particular, &columns.month, &columns.value],
        )?;

        let mut coercion = CoercionReport::default();

        let values = Self::coerce_values(
            frame.column(&columns.value)?,
            &options.placeholder_token,
            &mut coercion,
        )?;
        frame.with_column(Column::new(columns.value.as_str().into(), values.clone()))?;

        let particulars = Self::text_values(frame.column(&columns.particular)?)?;
        let months = Self::text_values(frame.column(&columns.month)?)?;

        let ordering = MonthOrdering::from_labels(months.iter().flatten());
        let ranks: Vec<Option<u32>> = months
            .iter()
            .map(|m| m.as_deref().and_then(|m| ordering.rank(m)).map(|r| r as u32))
            .collect();
        frame.with_column(Column::new(MONTH_RANK_COLUMN.into(), ranks))?;

        let mut records = Vec::with_capacity(frame.height());
        for ((particular, month), amount) in particulars.iter().zip(&months).zip(&values) {
            match (particular, month) {
                (Some(particular), Some(month)) => {
                    let rank = ordering.rank(month).unwrap_or(ordering.len());
                    records.push(Record::new(particular, month, rank, *amount));
                }
                _ => coercion.skipped_rows += 1,
            }
        }

        if coercion.has_warnings() {
            warn!(
                unparseable = coercion.unparseable_cells,
                skipped_rows = coercion.skipped_rows,
                "value coercion produced missing cells"
            );
        }
        debug!(
            rows = records.len(),
            months = ordering.len(),
            placeholders = coercion.placeholder_cells,
            "normalized data sheet"
        );

        Ok(Dataset {
            frame,
            records,
            months: ordering,
            columns: columns.clone(),
            coercion,
        })
    }

    /// Clean the raw "NPA" sheet into ratio records in source order.
    pub fn normalize_npa(
        raw: &DataFrame,
        overrides: &NpaColumnOverrides,
        placeholder_token: &str,
    ) -> Result<Vec<NpaRecord>, SchemaError> {
        let names: Vec<String> = raw
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = detect_npa_columns(&names, overrides)?;

        let mut coercion = CoercionReport::default();
        let months = Self::text_values(raw.column(&columns.month)?)?;
        let gross = Self::coerce_values(raw.column(&columns.gross)?, placeholder_token, &mut coercion)?;
        let net = Self::coerce_values(raw.column(&columns.net)?, placeholder_token, &mut coercion)?;

        let records: Vec<NpaRecord> = months
            .into_iter()
            .zip(gross)
            .zip(net)
            .filter_map(|((month, gross), net)| {
                Some(NpaRecord {
                    month: month?,
                    gross_npa_ratio: gross,
                    net_npa_ratio: net,
                })
            })
            .collect();

        if coercion.unparseable_cells > 0 {
            warn!(
                unparseable = coercion.unparseable_cells,
                "NPA ratio coercion produced missing cells"
            );
        }
        debug!(rows = records.len(), ?columns, "normalized NPA sheet");
        Ok(records)
    }

    /// Remove denylisted columns that are present.
    pub fn drop_columns(raw: &DataFrame, dropped: &[String]) -> Result<DataFrame, SchemaError> {
        let mut frame = raw.clone();
        for name in dropped {
            if frame.get_column_index(name).is_some() {
                frame = frame.drop(name)?;
            }
        }
        Ok(frame)
    }

    fn require_columns(frame: &DataFrame, required: &[&String]) -> Result<(), SchemaError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| frame.get_column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingColumns(missing))
        }
    }

    /// Coerce a column to numbers. Never fails on cell content.
    pub fn coerce_values(
        column: &Column,
        placeholder_token: &str,
        report: &mut CoercionReport,
    ) -> Result<Vec<Option<f64>>, SchemaError> {
        let as_str = column.cast(&DataType::String)?;
        let values = as_str
            .str()?
            .into_iter()
            .map(|cell| coerce_cell(cell, placeholder_token, report))
            .collect();
        Ok(values)
    }

    fn text_values(column: &Column) -> Result<Vec<Option<String>>, SchemaError> {
        let as_str = column.cast(&DataType::String)?;
        let values = as_str
            .str()?
            .into_iter()
            .map(|cell| {
                cell.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect();
        Ok(values)
    }
}

fn coerce_cell(cell: Option<&str>, placeholder_token: &str, report: &mut CoercionReport) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    if text == placeholder_token {
        report.placeholder_cells += 1;
        return None;
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            report.unparseable_cells += 1;
            None
        }
    }
}

/// Resolve the NPA sheet's month, gross and net ratio columns.
///
/// Configured names win; otherwise the first header containing "month",
/// "gross" or "net" (case-insensitive) that no earlier role claimed is used.
/// Two roles may never share a header.
pub fn detect_npa_columns(
    names: &[String],
    overrides: &NpaColumnOverrides,
) -> Result<NpaColumns, SchemaError> {
    let find = |explicit: &Option<String>, keyword: &str, taken: &[&Option<String>]| {
        match explicit {
            Some(name) => names.iter().find(|n| *n == name).cloned(),
            None => names
                .iter()
                .filter(|n| !taken.iter().any(|t| t.as_deref() == Some(n.as_str())))
                .find(|n| n.to_ascii_lowercase().contains(keyword))
                .cloned(),
        }
    };

    let month = find(&overrides.month, "month", &[]);
    let gross = find(&overrides.gross, "gross", &[&month]);
    let net = find(&overrides.net, "net", &[&month, &gross]);

    let roles: [(&'static str, &Option<String>); 3] =
        [("month", &month), ("gross NPA", &gross), ("net NPA", &net)];
    for (i, &(first, a)) in roles.iter().enumerate() {
        for &(second, b) in &roles[i + 1..] {
            if let (Some(column), Some(other)) = (a, b) {
                if column == other {
                    return Err(SchemaError::AmbiguousColumn {
                        column: column.clone(),
                        first,
                        second,
                    });
                }
            }
        }
    }

    match (month, gross, net) {
        (Some(month), Some(gross), Some(net)) => Ok(NpaColumns { month, gross, net }),
        (month, gross, net) => {
            let mut missing = Vec::new();
            if month.is_none() {
                missing.push(overrides.month.clone().unwrap_or_else(|| "month".to_string()));
            }
            if gross.is_none() {
                missing.push(overrides.gross.clone().unwrap_or_else(|| "gross NPA ratio".to_string()));
            }
            if net.is_none() {
                missing.push(overrides.net.clone().unwrap_or_else(|| "net NPA ratio".to_string()));
            }
            Err(SchemaError::MissingColumns(missing))
        }
    }
}
