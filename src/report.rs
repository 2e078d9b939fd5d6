//! Report Module
//! Plain-text tables for the console host. Values are formatted here, last.

use crate::dashboard::{DetailView, Notice, OverviewView, TrendView};
use crate::data::NpaRecord;
use crate::format::{classify_column, Formatter, ValueKind};
use prettytable::{format, Cell, Row, Table};
use std::fmt::Write;

/// Label column left-aligned, value columns right-aligned.
fn table_cell(text: &str, column: usize) -> Cell {
    let cell = Cell::new(text);
    if column == 0 {
        cell
    } else {
        cell.style_spec("r")
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        headers
            .iter()
            .enumerate()
            .map(|(i, header)| table_cell(header, i))
            .collect(),
    ));
    for row in rows {
        table.add_row(Row::new(
            row.iter()
                .enumerate()
                .map(|(i, text)| table_cell(text, i))
                .collect(),
        ));
    }
    table.to_string()
}

pub fn render_notices(notices: &[Notice], fmt: &Formatter) -> String {
    let mut out = String::new();
    for notice in notices {
        match notice {
            Notice::ValueCoercion { unparseable_cells } => {
                let _ = writeln!(
                    out,
                    "note: {} value cell(s) could not be read as numbers and are shown as {}",
                    fmt.count(*unparseable_cells),
                    fmt.missing_label
                );
            }
            Notice::EmptyResult => {
                let _ = writeln!(out, "note: no rows match the current filters");
            }
        }
    }
    out
}

pub fn render_overview(view: &OverviewView, fmt: &Formatter) -> String {
    let mut out = String::new();
    out.push_str(&render_notices(&view.notices, fmt));

    let metrics = &view.metrics;
    let _ = writeln!(out, "Total Records:       {}", fmt.count(metrics.total_records));
    let _ = writeln!(
        out,
        "Total Amount:        {}",
        fmt.format(metrics.total_amount, ValueKind::Currency)
    );
    let _ = writeln!(
        out,
        "Average Amount:      {}",
        fmt.format(metrics.average_amount, ValueKind::Currency)
    );
    let _ = writeln!(out, "Unique Particulars:  {}", fmt.count(metrics.unique_particulars));

    if view.records.is_empty() {
        return out;
    }

    out.push_str("\nMonthly Summary\n");
    let rows: Vec<Vec<String>> = view
        .monthly
        .iter()
        .map(|m| {
            vec![
                m.month.clone(),
                fmt.format(m.sum, ValueKind::Decimal),
                fmt.format(m.mean, ValueKind::Decimal),
                fmt.count(m.count),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["Month", "Total Amount", "Average Amount", "Count"],
        &rows,
    ));

    out.push_str("\nTop Particulars by Amount\n");
    let rows: Vec<Vec<String>> = view
        .top_particulars
        .iter()
        .map(|t| vec![t.particular.clone(), fmt.format(t.total, ValueKind::Decimal)])
        .collect();
    out.push_str(&render_table(&["Particular", "Total Amount"], &rows));
    out
}

pub fn render_trend(view: &TrendView, fmt: &Formatter) -> String {
    let mut out = String::new();
    if view.pivot.is_empty() {
        return out;
    }

    out.push_str("Month-wise Pivot\n");
    let mut headers = vec!["Month"];
    headers.extend(view.pivot.particulars.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = view
        .pivot
        .months
        .iter()
        .zip(&view.pivot.cells)
        .map(|(month, cells)| {
            let mut row = vec![month.clone()];
            row.extend(cells.iter().map(|v| fmt.format(*v, ValueKind::Decimal)));
            row
        })
        .collect();
    out.push_str(&render_table(&headers, &rows));

    out.push_str("\nPercentage Change Summary\n");
    let rows: Vec<Vec<String>> = view
        .average_changes
        .iter()
        .map(|a| {
            vec![
                a.particular.clone(),
                fmt.format(a.average_pct_change, ValueKind::PercentPoints),
            ]
        })
        .collect();
    out.push_str(&render_table(&["Particular", "Average % Change"], &rows));
    out
}

pub fn render_detail(view: &DetailView, fmt: &Formatter) -> String {
    let mut out = String::new();
    let stats = &view.stats;
    let _ = writeln!(out, "{}", view.particular);
    let rows = vec![
        vec!["Count".to_string(), fmt.count(stats.count)],
        vec!["Mean".to_string(), fmt.format(stats.mean, ValueKind::Decimal)],
        vec!["Median".to_string(), fmt.format(stats.median, ValueKind::Decimal)],
        vec!["Min".to_string(), fmt.format(stats.min, ValueKind::Decimal)],
        vec!["Max".to_string(), fmt.format(stats.max, ValueKind::Decimal)],
        vec!["Std Dev".to_string(), fmt.format(stats.std, ValueKind::Decimal)],
    ];
    out.push_str(&render_table(&["Statistic", "Value"], &rows));

    if let Some(latest) = &view.latest {
        let _ = writeln!(
            out,
            "\nLatest Value ({}): {} ({} of average)",
            latest.month,
            fmt.format(latest.value, ValueKind::Decimal),
            fmt.format(latest.pct_of_average, ValueKind::PercentPoints)
        );
    }

    out.push_str("\nMonth-to-Month Comparison\n");
    let rows: Vec<Vec<String>> = view
        .series
        .iter()
        .map(|s| {
            vec![
                s.month.clone(),
                fmt.format(s.value, ValueKind::Decimal),
                fmt.format(s.previous, ValueKind::Decimal),
                fmt.format(s.change, ValueKind::Decimal),
                fmt.format(s.pct_change, ValueKind::PercentPoints),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["Month", "Rs", "Previous Month", "Change", "% Change"],
        &rows,
    ));
    out
}

/// NPA ratios, rendered by the column-name heuristic.
pub fn render_npa(records: &[NpaRecord], fmt: &Formatter) -> String {
    let gross_kind = classify_column("Gross NPA");
    let net_kind = classify_column("Net NPA");
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.month.clone(),
                fmt.format(r.gross_npa_ratio, gross_kind),
                fmt.format(r.net_npa_ratio, net_kind),
            ]
        })
        .collect();
    render_table(&["Month", "Gross NPA", "Net NPA"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_alignment() {
        let table = render_table(
            &["Month", "Total"],
            &[
                vec!["Jan".to_string(), "1,000.00".to_string()],
                vec!["February".to_string(), "5.00".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        let jan = lines.iter().find(|l| l.contains("Jan")).unwrap();
        let feb = lines.iter().find(|l| l.contains("February")).unwrap();

        assert!(lines[0].contains("Month") && lines[0].contains("Total"));
        assert!(lines[1].contains('-'));
        assert_eq!(jan.find("Jan"), feb.find("February"));
        assert_eq!(jan.trim_end().len(), feb.trim_end().len());
        assert!(jan.trim_end().ends_with("1,000.00"));
        assert!(feb.trim_end().ends_with("5.00"));
    }

    #[test]
    fn trend_prints_pivot_and_changes() {
        let records = vec![
            crate::data::Record::new("A", "Jan", 0, Some(100.0)),
            crate::data::Record::new("A", "Feb", 1, Some(150.0)),
            crate::data::Record::new("B", "Jan", 0, Some(10.0)),
        ];
        let particulars = vec!["A".to_string(), "B".to_string()];
        let pivot = crate::stats::Aggregator::pivot(&records, &particulars);
        let changes = crate::stats::change_matrix(&pivot);
        let view = TrendView {
            average_changes: crate::stats::average_changes(&changes),
            changes,
            pivot,
        };
        let text = render_trend(&view, &Formatter::default());

        assert!(text.contains("Month-wise Pivot"));
        let feb = text.lines().find(|l| l.contains("Feb")).unwrap();
        assert!(feb.contains("150.00"));
        assert!(feb.contains("N/A"));
        assert!(text.contains("50.00%"));
    }

    #[test]
    fn npa_as_percentages() {
        let records = vec![NpaRecord {
            month: "Shrawan".to_string(),
            gross_npa_ratio: Some(0.0425),
            net_npa_ratio: None,
        }];
        let text = render_npa(&records, &Formatter::default());
        assert!(text.contains("4.25%"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn empty_notice() {
        let text = render_notices(&[Notice::EmptyResult], &Formatter::default());
        assert_eq!(text, "note: no rows match the current filters\n");
    }
}
