//! Presentation Formatter Module
//! Display strings for numbers. Formatting never touches the values themselves.

use num_format::{Locale, ToFormattedString};

/// How a number is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Rounded, grouped, no decimals: `1,234,567`.
    PlainInteger,
    /// Grouped, two decimals: `1,234.50`.
    Decimal,
    /// `Decimal` with the currency symbol: `Rs 1,234.50`.
    Currency,
    /// A fraction shown as percent: `0.1025` -> `10.25%`.
    Percentage,
    /// A value already in percent: `12.5` -> `12.50%`.
    PercentPoints,
}

/// Renders numbers for tables and metric cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pub missing_label: String,
    pub currency_symbol: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            missing_label: "N/A".to_string(),
            currency_symbol: "Rs".to_string(),
        }
    }
}

impl Formatter {
    pub fn new(missing_label: &str, currency_symbol: &str) -> Self {
        Self {
            missing_label: missing_label.to_string(),
            currency_symbol: currency_symbol.to_string(),
        }
    }

    /// Render `value`; missing and non-finite values become the placeholder.
    pub fn format(&self, value: Option<f64>, kind: ValueKind) -> String {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            return self.missing_label.clone();
        };

        match kind {
            ValueKind::PlainInteger => grouped(value, 0),
            ValueKind::Decimal => grouped(value, 2),
            ValueKind::Currency if self.currency_symbol.is_empty() => grouped(value, 2),
            ValueKind::Currency => format!("{} {}", self.currency_symbol, grouped(value, 2)),
            ValueKind::Percentage => format!("{:.2}%", value * 100.0),
            ValueKind::PercentPoints => format!("{:.2}%", value),
        }
    }

    /// Render a count.
    pub fn count(&self, count: usize) -> String {
        count.to_formatted_string(&Locale::en)
    }
}

/// Grouped thousands with a fixed number of decimals.
fn grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, group_digits(whole), fraction),
        None => format!("{}{}", sign, group_digits(whole)),
    }
}

/// Insert thousands separators into a run of ASCII digits.
fn group_digits(digits: &str) -> String {
    if let Ok(n) = digits.parse::<u128>() {
        return n.to_formatted_string(&Locale::en);
    }

    let separator = Locale::en.separator();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Guess how a column should be displayed from its name.
///
/// "npa", "ratio" or "%" mean a stored fraction; "count" or "records" mean
/// a whole number; anything else is a decimal amount.
pub fn classify_column(name: &str) -> ValueKind {
    let lower = name.to_ascii_lowercase();
    if lower.contains("npa") || lower.contains("ratio") || lower.contains('%') {
        ValueKind::Percentage
    } else if lower.contains("count") || lower.contains("records") {
        ValueKind::PlainInteger
    } else {
        ValueKind::Decimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage() {
        let f = Formatter::default();
        assert_eq!(f.format(Some(0.1025), ValueKind::Percentage), "10.25%");
        assert_eq!(f.format(Some(-0.05), ValueKind::Percentage), "-5.00%");
        assert_eq!(f.format(Some(12.5), ValueKind::PercentPoints), "12.50%");
    }

    #[test]
    fn plain_integer() {
        let f = Formatter::default();
        assert_eq!(f.format(Some(1234567.0), ValueKind::PlainInteger), "1,234,567");
        assert_eq!(f.format(Some(999.6), ValueKind::PlainInteger), "1,000");
        assert_eq!(f.format(Some(-1234.0), ValueKind::PlainInteger), "-1,234");
        assert_eq!(f.format(Some(0.0), ValueKind::PlainInteger), "0");
    }

    #[test]
    fn decimal_and_currency() {
        let f = Formatter::default();
        assert_eq!(f.format(Some(1234.5), ValueKind::Decimal), "1,234.50");
        assert_eq!(f.format(Some(-0.004), ValueKind::Decimal), "0.00");
        assert_eq!(f.format(Some(1234.5), ValueKind::Currency), "Rs 1,234.50");
        assert_eq!(
            Formatter::new("-", "").format(Some(7.0), ValueKind::Currency),
            "7.00"
        );
    }

    #[test]
    fn large_values_keep_every_digit() {
        let f = Formatter::default();
        assert_eq!(
            f.format(Some(1e17), ValueKind::Decimal),
            "100,000,000,000,000,000.00"
        );
        assert_eq!(
            f.format(Some(2e19), ValueKind::PlainInteger),
            "20,000,000,000,000,000,000"
        );
        assert_eq!(
            f.format(Some(-3e17), ValueKind::Currency),
            "Rs -300,000,000,000,000,000.00"
        );

        assert_eq!(
            f.format(Some(2f64.powi(130)), ValueKind::PlainInteger),
            "1,361,129,467,683,753,853,853,498,429,727,072,845,824"
        );
    }

    #[test]
    fn missing_values_use_placeholder() {
        let f = Formatter::default();
        for kind in [
            ValueKind::PlainInteger,
            ValueKind::Decimal,
            ValueKind::Currency,
            ValueKind::Percentage,
            ValueKind::PercentPoints,
        ] {
            assert_eq!(f.format(None, kind), "N/A");
            assert_eq!(f.format(Some(f64::NAN), kind), "N/A");
        }
        assert_eq!(Formatter::new("--", "Rs").format(None, ValueKind::Decimal), "--");
    }

    #[test]
    fn formatting_leaves_value_untouched() {
        let value = Some(0.1025);
        let _ = Formatter::default().format(value, ValueKind::Percentage);
        assert_eq!(value, Some(0.1025));
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(Formatter::default().count(12345), "12,345");
    }

    #[test]
    fn column_classification() {
        assert_eq!(classify_column("Gross NPA"), ValueKind::Percentage);
        assert_eq!(classify_column("Capital Adequacy Ratio"), ValueKind::Percentage);
        assert_eq!(classify_column("Count"), ValueKind::PlainInteger);
        assert_eq!(classify_column("Rs"), ValueKind::Decimal);
    }
}
