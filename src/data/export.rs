//! Export Module
//! Writes filtered frames as CSV or as a single-sheet XLSX workbook.
//!
//! The workbook is produced with direct ZIP/XML generation: inline strings,
//! numeric cells, and no styles. Missing values are left out of the sheet.

use polars::prelude::*;
use std::io::{Cursor, Write};
use thiserror::Error;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

/// Sheet name used by the Excel export.
pub const EXPORT_SHEET_NAME: &str = "Filtered Data";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Zip error: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook needs at least one sheet")]
    NoSheets,
}

/// Encode a frame as UTF-8 CSV with a header row and raw values.
pub fn to_csv(frame: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut frame = frame.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut frame)?;
    Ok(buf)
}

/// Encode a frame as a workbook with one sheet named "Filtered Data".
pub fn to_xlsx(frame: &DataFrame) -> Result<Vec<u8>, ExportError> {
    write_workbook(&[(EXPORT_SHEET_NAME, frame)])
}

/// A cell ready for the sheet XML.
enum Cell {
    Number(f64),
    Text(String),
}

/// Encode several frames as sheets of one workbook, in the given order.
pub fn write_workbook(sheets: &[(&str, &DataFrame)]) -> Result<Vec<u8>, ExportError> {
    if sheets.is_empty() {
        return Err(ExportError::NoSheets);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    // 1. [Content_Types].xml
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

    // 2. _rels/.rels
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(rels_xml().as_bytes())?;

    // 3. xl/workbook.xml and its relationships
    let names: Vec<&str> = sheets.iter().map(|(name, _)| *name).collect();
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(&names).as_bytes())?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

    // 4. Worksheets
    for (idx, (_, frame)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)?;
        zip.write_all(sheet_xml(frame)?.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Read one column as sheet cells, numeric columns as numbers.
fn column_cells(column: &Column) -> Result<Vec<Option<Cell>>, ExportError> {
    if is_numeric(column.dtype()) {
        let as_f64 = column.cast(&DataType::Float64)?;
        let cells = as_f64
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()).map(Cell::Number))
            .collect();
        Ok(cells)
    } else {
        let as_str = column.cast(&DataType::String)?;
        let cells = as_str
            .str()?
            .into_iter()
            .map(|v| v.map(|s| Cell::Text(s.to_string())))
            .collect();
        Ok(cells)
    }
}

fn sheet_xml(frame: &DataFrame) -> Result<String, ExportError> {
    let columns: Vec<Vec<Option<Cell>>> = frame
        .get_columns()
        .iter()
        .map(column_cells)
        .collect::<Result<_, _>>()?;

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    // Header row
    xml.push_str(r#"<row r="1">"#);
    for (col_idx, name) in frame.get_column_names().iter().enumerate() {
        push_text_cell(&mut xml, &cell_ref(col_idx, 1), name.as_str());
    }
    xml.push_str("</row>");

    for row_idx in 0..frame.height() {
        let row_num = row_idx + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, row_num));
        for (col_idx, cells) in columns.iter().enumerate() {
            let reference = cell_ref(col_idx, row_num);
            match cells.get(row_idx) {
                Some(Some(Cell::Number(v))) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, v));
                }
                Some(Some(Cell::Text(s))) => push_text_cell(&mut xml, &reference, s),
                _ => {}
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    Ok(xml)
}

fn push_text_cell(xml: &mut String, reference: &str, text: &str) {
    xml.push_str(&format!(
        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        reference,
        escape_xml(text)
    ));
}

/// Spreadsheet cell reference, e.g. (0, 1) -> "A1", (27, 3) -> "AB3".
fn cell_ref(col_idx: usize, row_num: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col_idx + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row_num)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=sheet_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{}</Types>"#,
        overrides
    )
}

fn rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        .to_string()
}

fn workbook_xml(sheet_names: &[&str]) -> String {
    let mut sheets = String::new();
    for (i, name) in sheet_names.iter().enumerate() {
        sheets.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(name),
            i + 1,
            i + 1
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        sheets
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, i
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
}
