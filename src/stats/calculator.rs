//! Statistics Calculator Module
//! Descriptive statistics and latest-versus-average figures for one particular.

use crate::data::Record;
use statrs::statistics::Statistics;

/// Descriptive statistics of one particular's non-missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticularStats {
    pub particular: String,
    /// Rows for the particular, including those with missing values.
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sample standard deviation; needs two values.
    pub std: Option<f64>,
}

/// Most recent value of a particular compared with its average.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestValue {
    pub month: String,
    pub value: Option<f64>,
    pub average: Option<f64>,
    pub max: Option<f64>,
    /// `value / average * 100`.
    pub pct_of_average: Option<f64>,
}

/// Handles descriptive statistics over records.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for one particular.
    pub fn describe(records: &[Record], particular: &str) -> ParticularStats {
        let rows: Vec<&Record> = records
            .iter()
            .filter(|r| r.particular == particular)
            .collect();
        let values: Vec<f64> = rows.iter().filter_map(|r| r.amount).collect();

        let mut stats = ParticularStats {
            particular: particular.to_string(),
            count: rows.len(),
            mean: None,
            median: None,
            min: None,
            max: None,
            std: None,
        };
        if values.is_empty() {
            return stats;
        }

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        stats.mean = Some(Statistics::mean(&values));
        stats.median = Some(Self::percentile(&sorted, 50.0));
        stats.min = Some(Statistics::min(&values));
        stats.max = Some(Statistics::max(&values));
        if values.len() > 1 {
            stats.std = Some(Statistics::std_dev(&values));
        }
        stats
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Latest month's value of a particular against its average and maximum.
    ///
    /// Returns `None` when the particular has no rows.
    pub fn latest_value(records: &[Record], particular: &str) -> Option<LatestValue> {
        let latest = records
            .iter()
            .filter(|r| r.particular == particular)
            .max_by_key(|r| r.month_rank)?;

        let stats = Self::describe(records, particular);
        let pct_of_average = match (latest.amount, stats.mean) {
            (Some(value), Some(mean)) if mean != 0.0 => Some(value / mean * 100.0),
            _ => None,
        };

        Some(LatestValue {
            month: latest.month.clone(),
            value: latest.amount,
            average: stats.mean,
            max: stats.max,
            pct_of_average,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new("A", "Jan", 0, Some(10.0)),
            Record::new("A", "Feb", 1, Some(30.0)),
            Record::new("A", "Mar", 2, None),
            Record::new("A", "Apr", 3, Some(20.0)),
            Record::new("B", "Jan", 0, Some(99.0)),
        ]
    }

    #[test]
    fn describes_one_particular() {
        let stats = StatsCalculator::describe(&records(), "A");

        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, Some(20.0));
        assert_eq!(stats.median, Some(20.0));
        assert_eq!(stats.min, Some(10.0));
        assert_eq!(stats.max, Some(30.0));
        assert!((stats.std.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_value_has_no_std() {
        let stats = StatsCalculator::describe(&records(), "B");
        assert_eq!(stats.mean, Some(99.0));
        assert_eq!(stats.std, None);
    }

    #[test]
    fn unknown_particular_is_empty() {
        let stats = StatsCalculator::describe(&records(), "Z");
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, None);
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn latest_against_average() {
        let latest = StatsCalculator::latest_value(&records(), "A").unwrap();

        assert_eq!(latest.month, "Apr");
        assert_eq!(latest.value, Some(20.0));
        assert_eq!(latest.average, Some(20.0));
        assert_eq!(latest.max, Some(30.0));
        assert_eq!(latest.pct_of_average, Some(100.0));

        assert!(StatsCalculator::latest_value(&records(), "Z").is_none());
    }
}
