//! Period Change Module
//! Period-over-period deltas and percentage changes.

use crate::data::Record;
use crate::stats::aggregator::PivotTable;

/// One step of a month-ordered series.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodChange {
    pub month: String,
    pub value: Option<f64>,
    pub previous: Option<f64>,
    pub change: Option<f64>,
    pub pct_change: Option<f64>,
}

/// Percentage changes of every pivot column, month by month.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeMatrix {
    pub months: Vec<String>,
    pub particulars: Vec<String>,
    /// `pct_changes[row][col]` in percent.
    pub pct_changes: Vec<Vec<Option<f64>>>,
}

/// Mean month-over-month % change of one particular.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageChange {
    pub particular: String,
    pub average_pct_change: Option<f64>,
}

/// `current - previous`, missing if either side is.
pub fn delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

/// Change relative to `previous`, in percent. Zero or missing previous
/// values give a missing result.
pub fn pct_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let change = delta(current, previous)?;
    let pct = change / previous? * 100.0;
    pct.is_finite().then_some(pct)
}

/// Deltas over a series already in month order. The first entry has no
/// previous value.
pub fn period_over_period(series: &[(String, Option<f64>)]) -> Vec<PeriodChange> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|(month, value)| {
            let prev = std::mem::replace(&mut previous, *value);
            PeriodChange {
                month: month.clone(),
                value: *value,
                previous: prev,
                change: delta(*value, prev),
                pct_change: pct_change(*value, prev),
            }
        })
        .collect()
}

/// Month-ordered `(month, value)` series of one particular.
///
/// Repeated months stay as separate entries, in source order.
pub fn particular_series(records: &[Record], particular: &str) -> Vec<(String, Option<f64>)> {
    let mut rows: Vec<&Record> = records
        .iter()
        .filter(|r| r.particular == particular)
        .collect();
    rows.sort_by_key(|r| r.month_rank);
    rows.into_iter()
        .map(|r| (r.month.clone(), r.amount))
        .collect()
}

/// Percentage change of every pivot column.
pub fn change_matrix(pivot: &PivotTable) -> ChangeMatrix {
    let mut pct_changes = vec![Vec::with_capacity(pivot.particulars.len()); pivot.months.len()];
    for particular in &pivot.particulars {
        let column = pivot.column(particular).unwrap_or_default();
        let series: Vec<(String, Option<f64>)> =
            pivot.months.iter().cloned().zip(column).collect();
        for (row, step) in period_over_period(&series).into_iter().enumerate() {
            pct_changes[row].push(step.pct_change);
        }
    }

    ChangeMatrix {
        months: pivot.months.clone(),
        particulars: pivot.particulars.clone(),
        pct_changes,
    }
}

/// Mean % change per particular, largest first; missing averages last.
pub fn average_changes(matrix: &ChangeMatrix) -> Vec<AverageChange> {
    let mut averages: Vec<AverageChange> = matrix
        .particulars
        .iter()
        .enumerate()
        .map(|(col, particular)| {
            let values: Vec<f64> = matrix.pct_changes.iter().filter_map(|row| row[col]).collect();
            let average_pct_change =
                (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
            AverageChange {
                particular: particular.clone(),
                average_pct_change,
            }
        })
        .collect();

    averages.sort_by(|a, b| match (a.average_pct_change, b.average_pct_change) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    averages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregator::Aggregator;

    fn series(values: &[Option<f64>]) -> Vec<(String, Option<f64>)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("M{}", i), *v))
            .collect()
    }

    #[test]
    fn deltas_and_percentages() {
        let steps = period_over_period(&series(&[Some(100.0), Some(150.0), Some(75.0)]));

        let changes: Vec<Option<f64>> = steps.iter().map(|s| s.change).collect();
        let pcts: Vec<Option<f64>> = steps.iter().map(|s| s.pct_change).collect();
        assert_eq!(changes, vec![None, Some(50.0), Some(-75.0)]);
        assert_eq!(pcts, vec![None, Some(50.0), Some(-50.0)]);
        assert_eq!(steps[2].previous, Some(150.0));
    }

    #[test]
    fn zero_previous_gives_missing_pct() {
        let steps = period_over_period(&series(&[Some(0.0), Some(10.0)]));

        assert_eq!(steps[1].change, Some(10.0));
        assert_eq!(steps[1].pct_change, None);
    }

    #[test]
    fn missing_values_propagate() {
        let steps = period_over_period(&series(&[Some(10.0), None, Some(30.0)]));

        assert_eq!(steps[1].change, None);
        assert_eq!(steps[2].previous, None);
        assert_eq!(steps[2].change, None);
        assert_eq!(steps[2].pct_change, None);
    }

    #[test]
    fn empty_series() {
        assert!(period_over_period(&[]).is_empty());
    }

    #[test]
    fn series_sorted_by_rank() {
        let records = vec![
            Record::new("A", "Feb", 1, Some(2.0)),
            Record::new("B", "Jan", 0, Some(9.0)),
            Record::new("A", "Jan", 0, Some(1.0)),
        ];
        assert_eq!(
            particular_series(&records, "A"),
            vec![("Jan".to_string(), Some(1.0)), ("Feb".to_string(), Some(2.0))]
        );
    }

    #[test]
    fn matrix_and_averages() {
        let records = vec![
            Record::new("A", "Jan", 0, Some(100.0)),
            Record::new("A", "Feb", 1, Some(150.0)),
            Record::new("A", "Mar", 2, Some(75.0)),
            Record::new("B", "Jan", 0, Some(10.0)),
            Record::new("B", "Feb", 1, Some(20.0)),
            Record::new("C", "Jan", 0, Some(5.0)),
        ];
        let particulars = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let matrix = change_matrix(&Aggregator::pivot(&records, &particulars));

        assert_eq!(matrix.pct_changes[0], vec![None, None, None]);
        assert_eq!(matrix.pct_changes[1], vec![Some(50.0), Some(100.0), None]);
        assert_eq!(matrix.pct_changes[2], vec![Some(-50.0), None, None]);

        let averages = average_changes(&matrix);
        assert_eq!(averages[0].particular, "B");
        assert_eq!(averages[0].average_pct_change, Some(100.0));
        assert_eq!(averages[1].particular, "A");
        assert_eq!(averages[1].average_pct_change, Some(0.0));
        assert_eq!(averages[2].average_pct_change, None);
    }
}
