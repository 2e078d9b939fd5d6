//! Aggregator Module
//! Grouped summaries and long-to-wide reshaping over filtered records.

use crate::data::Record;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sum, mean and count of one month's non-missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: String,
    pub month_rank: usize,
    pub sum: Option<f64>,
    pub mean: Option<f64>,
    pub count: usize,
}

/// Headline figures for a filtered record set.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewMetrics {
    pub total_records: usize,
    pub total_amount: Option<f64>,
    pub average_amount: Option<f64>,
    pub unique_particulars: usize,
}

/// Summed amount of one particular.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticularTotal {
    pub particular: String,
    pub total: Option<f64>,
}

/// Wide table: one row per month, one column per particular.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub months: Vec<String>,
    pub particulars: Vec<String>,
    /// `cells[row][col]`, missing where the input had no value.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn column(&self, particular: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.particulars.iter().position(|p| p == particular)?;
        Some(self.cells.iter().map(|row| row[idx]).collect())
    }

    pub fn get(&self, month: &str, particular: &str) -> Option<f64> {
        let row = self.months.iter().position(|m| m == month)?;
        let col = self.particulars.iter().position(|p| p == particular)?;
        self.cells[row][col]
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Long format again: one `(month, particular, value)` per present cell.
    pub fn melt(&self) -> Vec<(String, String, f64)> {
        let mut long = Vec::new();
        for (month, row) in self.months.iter().zip(&self.cells) {
            for (particular, cell) in self.particulars.iter().zip(row) {
                if let Some(value) = cell {
                    long.push((month.clone(), particular.clone(), *value));
                }
            }
        }
        long
    }
}

/// Handles grouped sums, means, counts and pivots.
pub struct Aggregator;

impl Aggregator {
    /// Per-month sum, mean and count, sorted by month rank.
    ///
    /// Missing values are skipped. A month with no values has count 0 and
    /// missing sum and mean.
    pub fn group_summary(records: &[Record]) -> Vec<MonthSummary> {
        let mut by_rank: BTreeMap<usize, (String, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let entry = by_rank
                .entry(record.month_rank)
                .or_insert_with(|| (record.month.clone(), Vec::new()));
            if let Some(amount) = record.amount {
                entry.1.push(amount);
            }
        }

        by_rank
            .into_iter()
            .map(|(month_rank, (month, values))| {
                let count = values.len();
                let sum = (count > 0).then(|| values.iter().sum::<f64>());
                MonthSummary {
                    month,
                    month_rank,
                    sum,
                    mean: sum.map(|s| s / count as f64),
                    count,
                }
            })
            .collect()
    }

    /// Headline figures over the filtered set.
    pub fn overview(records: &[Record]) -> OverviewMetrics {
        let values: Vec<f64> = records.iter().filter_map(|r| r.amount).collect();
        let total_amount = (!values.is_empty()).then(|| values.iter().sum::<f64>());
        let unique: HashSet<&str> = records.iter().map(|r| r.particular.as_str()).collect();

        OverviewMetrics {
            total_records: records.len(),
            total_amount,
            average_amount: total_amount.map(|t| t / values.len() as f64),
            unique_particulars: unique.len(),
        }
    }

    /// Particulars ranked by summed amount, largest first, at most `limit`.
    ///
    /// Particulars without any value sort last; ties keep name order.
    pub fn top_particulars(records: &[Record], limit: usize) -> Vec<ParticularTotal> {
        let mut totals: BTreeMap<&str, Option<f64>> = BTreeMap::new();
        for record in records {
            let total = totals.entry(record.particular.as_str()).or_insert(None);
            if let Some(amount) = record.amount {
                *total = Some(total.unwrap_or(0.0) + amount);
            }
        }

        let mut ranked: Vec<ParticularTotal> = totals
            .into_iter()
            .map(|(particular, total)| ParticularTotal {
                particular: particular.to_string(),
                total,
            })
            .collect();
        ranked.sort_by(|a, b| match (a.total, b.total) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked.truncate(limit);
        ranked
    }

    /// Distinct particulars of a record set, sorted by name.
    pub fn particulars(records: &[Record]) -> Vec<String> {
        let distinct: std::collections::BTreeSet<&str> =
            records.iter().map(|r| r.particular.as_str()).collect();
        distinct.into_iter().map(str::to_string).collect()
    }

    /// Reshape long rows into one row per month and one column per
    /// requested particular, in request order.
    ///
    /// Only months present in `records` get a row. Cells sum the
    /// non-missing values of their (month, particular); an absent
    /// combination stays missing.
    pub fn pivot(records: &[Record], particulars: &[String]) -> PivotTable {
        let column_of: HashMap<&str, usize> = particulars
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();

        let mut rows: BTreeMap<usize, (String, Vec<Option<f64>>)> = BTreeMap::new();
        for record in records {
            let Some(&col) = column_of.get(record.particular.as_str()) else {
                continue;
            };
            let row = rows
                .entry(record.month_rank)
                .or_insert_with(|| (record.month.clone(), vec![None; particulars.len()]));
            if let Some(amount) = record.amount {
                row.1[col] = Some(row.1[col].unwrap_or(0.0) + amount);
            }
        }

        let (months, cells) = rows.into_values().unzip();
        PivotTable {
            months,
            particulars: particulars.to_vec(),
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new("A", "Jan", 0, Some(100.0)),
            Record::new("A", "Feb", 1, Some(200.0)),
            Record::new("B", "Jan", 0, Some(50.0)),
            Record::new("B", "Mar", 2, None),
            Record::new("C", "Feb", 1, Some(30.0)),
        ]
    }

    #[test]
    fn group_summary_by_month_rank() {
        let summary = Aggregator::group_summary(&records());

        let months: Vec<&str> = summary.iter().map(|s| s.month.as_str()).collect();
        assert_eq!(months, vec!["Jan", "Feb", "Mar"]);

        assert_eq!(summary[0].sum, Some(150.0));
        assert_eq!(summary[0].mean, Some(75.0));
        assert_eq!(summary[0].count, 2);

        assert_eq!(summary[1].sum, Some(230.0));
        assert_eq!(summary[1].count, 2);

        assert_eq!(summary[2].sum, None);
        assert_eq!(summary[2].mean, None);
        assert_eq!(summary[2].count, 0);
    }

    #[test]
    fn group_summary_of_nothing() {
        assert!(Aggregator::group_summary(&[]).is_empty());
    }

    #[test]
    fn overview_skips_missing() {
        let overview = Aggregator::overview(&records());

        assert_eq!(overview.total_records, 5);
        assert_eq!(overview.total_amount, Some(380.0));
        assert_eq!(overview.average_amount, Some(95.0));
        assert_eq!(overview.unique_particulars, 3);

        let empty = Aggregator::overview(&[]);
        assert_eq!(empty.total_amount, None);
        assert_eq!(empty.average_amount, None);
    }

    #[test]
    fn top_particulars_ranked() {
        let mut rows = records();
        rows.push(Record::new("D", "Jan", 0, None));
        let top = Aggregator::top_particulars(&rows, 3);

        let names: Vec<&str> = top.iter().map(|t| t.particular.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(top[0].total, Some(300.0));

        let all = Aggregator::top_particulars(&rows, 10);
        assert_eq!(all.last().unwrap().particular, "D");
        assert_eq!(all.last().unwrap().total, None);
    }

    #[test]
    fn pivot_missing_combination_is_missing() {
        let particulars = vec!["A".to_string(), "B".to_string()];
        let pivot = Aggregator::pivot(&records(), &particulars);

        assert_eq!(pivot.months, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(pivot.get("Jan", "A"), Some(100.0));
        assert_eq!(pivot.get("Jan", "B"), Some(50.0));
        assert_eq!(pivot.get("Feb", "B"), None);
        assert_eq!(pivot.get("Mar", "B"), None);
        assert_eq!(pivot.column("A"), Some(vec![Some(100.0), Some(200.0), None]));
    }

    #[test]
    fn pivot_sums_duplicates() {
        let rows = vec![
            Record::new("A", "Jan", 0, Some(1.0)),
            Record::new("A", "Jan", 0, Some(2.5)),
        ];
        let pivot = Aggregator::pivot(&rows, &["A".to_string()]);
        assert_eq!(pivot.get("Jan", "A"), Some(3.5));
    }

    #[test]
    fn pivot_then_melt_recovers_triples() {
        let rows = vec![
            Record::new("A", "Jan", 0, Some(100.0)),
            Record::new("B", "Feb", 1, Some(20.0)),
            Record::new("A", "Feb", 1, Some(200.0)),
            Record::new("C", "Jan", 0, Some(7.0)),
        ];
        let particulars = Aggregator::particulars(&rows);
        let mut melted = Aggregator::pivot(&rows, &particulars).melt();
        melted.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

        let mut expected: Vec<(String, String, f64)> = rows
            .iter()
            .map(|r| (r.month.clone(), r.particular.clone(), r.amount.unwrap()))
            .collect();
        expected.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

        assert_eq!(melted, expected);
    }
}
