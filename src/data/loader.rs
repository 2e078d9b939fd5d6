//! Workbook Loader Module
//! Parses the "Data" and "NPA" sheets out of raw spreadsheet bytes.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source unavailable ({source_name}): {cause}")]
    SourceUnavailable { source_name: String, cause: String },
    #[error("Failed to parse workbook: {0}")]
    Parse(String),
}

impl From<calamine::Error> for LoaderError {
    fn from(err: calamine::Error) -> Self {
        LoaderError::Parse(err.to_string())
    }
}

impl From<PolarsError> for LoaderError {
    fn from(err: PolarsError) -> Self {
        LoaderError::Parse(err.to_string())
    }
}

/// Sheet names to read from the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub data: String,
    pub npa: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            data: "Data".to_string(),
            npa: "NPA".to_string(),
        }
    }
}

/// The two raw tables of a source workbook. Every cell is text or null.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub data: DataFrame,
    pub npa: DataFrame,
}

/// Render a spreadsheet cell as text. Empty cells become `None`.
pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(v) => Some(v.to_string()),
        Data::Float(v) => Some(v.to_string()),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(v) => Some(v.to_string()),
        Data::DateTime(v) => Some(v.to_string()),
        Data::DateTimeIso(v) => Some(v.to_string()),
        Data::DurationIso(v) => Some(v.to_string()),
        Data::Error(v) => Some(format!("{v:?}")),
        Data::Empty => None,
    }
}

/// Parse both sheets out of workbook bytes (xlsx, xls or ods).
pub fn parse_workbook(bytes: Vec<u8>, sheets: &SheetNames) -> Result<Workbook, LoaderError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let available = workbook.sheet_names();

    let mut read_sheet = |wanted: &str| -> Result<DataFrame, LoaderError> {
        let name = available
            .iter()
            .find(|name| name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                LoaderError::Parse(format!(
                    "sheet '{}' not found (available: {})",
                    wanted,
                    available.join(", ")
                ))
            })?;
        let range = workbook.worksheet_range(name)?;
        let frame = range_to_frame(&range)
            .map_err(|e| match e {
                LoaderError::Parse(msg) => LoaderError::Parse(format!("sheet '{}': {}", name, msg)),
                other => other,
            })?;
        debug!(
            sheet = %name,
            rows = frame.height(),
            columns = frame.width(),
            "read sheet"
        );
        Ok(frame)
    };

    let data = read_sheet(&sheets.data)?;
    let npa = read_sheet(&sheets.npa)?;

    Ok(Workbook { data, npa })
}

/// Convert a sheet range into a frame of text columns, first row as header.
fn range_to_frame(range: &Range<Data>) -> Result<DataFrame, LoaderError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| LoaderError::Parse("sheet is empty".to_string()))?;

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell_to_string(cell) {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("column_{}", i + 1),
        })
        .collect();

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, column) in values.iter_mut().enumerate() {
            column.push(row.get(i).and_then(cell_to_string));
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name.into(), cells))
        .collect();

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::export::write_workbook;

    fn text_frame(columns: &[(&str, &[Option<&str>])]) -> DataFrame {
        DataFrame::new(
            columns
                .iter()
                .map(|(name, cells)| {
                    let cells: Vec<Option<String>> =
                        cells.iter().map(|c| c.map(str::to_string)).collect();
                    Column::new((*name).into(), cells)
                })
                .collect(),
        )
        .unwrap()
    }

    fn sample_bytes() -> Vec<u8> {
        let data = text_frame(&[
            ("Particulars", &[Some("Deposits"), Some("Loans")]),
            ("Month", &[Some("Shrawan"), Some("Shrawan")]),
            ("Rs", &[Some("100"), Some("-")]),
        ]);
        let npa = text_frame(&[
            ("Month", &[Some("Shrawan")]),
            ("Gross NPA", &[Some("0.04")]),
            ("Net NPA", &[Some("0.02")]),
        ]);
        write_workbook(&[("Data", &data), ("NPA", &npa)]).unwrap()
    }

    #[test]
    fn parses_both_sheets() {
        let workbook = parse_workbook(sample_bytes(), &SheetNames::default()).unwrap();

        assert_eq!(workbook.data.height(), 2);
        assert_eq!(workbook.data.width(), 3);
        assert_eq!(workbook.npa.height(), 1);

        let month = workbook.data.column("Month").unwrap().str().unwrap();
        assert_eq!(month.get(0), Some("Shrawan"));
    }

    #[test]
    fn sheet_names_match_case_insensitively() {
        let sheets = SheetNames {
            data: "data".to_string(),
            npa: "npa".to_string(),
        };
        assert!(parse_workbook(sample_bytes(), &sheets).is_ok());
    }

    #[test]
    fn missing_sheet_is_parse_error() {
        let sheets = SheetNames {
            data: "Data".to_string(),
            npa: "Ratios".to_string(),
        };
        let err = parse_workbook(sample_bytes(), &sheets).unwrap_err();

        assert!(matches!(err, LoaderError::Parse(_)));
        assert!(err.to_string().contains("Ratios"));
    }

    #[test]
    fn empty_sheet_is_parse_error() {
        let npa = text_frame(&[("Month", &[Some("Shrawan")])]);
        let bytes = write_workbook(&[("Data", &DataFrame::empty()), ("NPA", &npa)]).unwrap();
        let err = parse_workbook(bytes, &SheetNames::default()).unwrap_err();

        assert!(matches!(err, LoaderError::Parse(_)));
        assert_eq!(
            err.to_string(),
            "Failed to parse workbook: sheet 'Data': sheet is empty"
        );
        assert!(matches!(
            range_to_frame(&Range::<Data>::empty()),
            Err(LoaderError::Parse(_))
        ));
    }

    #[test]
    fn duplicate_headers_are_parse_error() {
        let mut range = Range::new((0, 0), (1, 2));
        range.set_value((0, 0), Data::String("Particulars".to_string()));
        range.set_value((0, 1), Data::String("Rs".to_string()));
        range.set_value((0, 2), Data::String(" Rs ".to_string()));
        range.set_value((1, 0), Data::String("Deposits".to_string()));
        range.set_value((1, 1), Data::Float(100.0));
        range.set_value((1, 2), Data::Float(200.0));

        assert!(matches!(range_to_frame(&range), Err(LoaderError::Parse(_))));
    }

    #[test]
    fn blank_headers_get_positional_names() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Particulars".to_string()));
        range.set_value((1, 0), Data::String("Deposits".to_string()));
        range.set_value((1, 1), Data::Int(7));
        let frame = range_to_frame(&range).unwrap();

        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Particulars", "column_2"]);
        let second = frame.column("column_2").unwrap().str().unwrap();
        assert_eq!(second.get(0), Some("7"));
    }

    #[test]
    fn garbage_bytes_are_parse_error() {
        let err = parse_workbook(b"not a workbook".to_vec(), &SheetNames::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse(_)));
    }
}
