//! Configuration Module
//! Dashboard settings loaded from an optional JSON file plus environment overrides.

use crate::data::{DataColumns, NormalizeOptions, NpaColumnOverrides, SheetNames};
use crate::format::Formatter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Names a JSON config file.
pub const CONFIG_ENV: &str = "BANK_DASHBOARD_CONFIG";
/// Overrides the configured source locator.
pub const SOURCE_ENV: &str = "BANK_DASHBOARD_SOURCE";

pub const DEFAULT_SOURCE: &str = "https://github.com/sudbrl/baselreport/raw/main/baseldata.xlsx";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// User settings for the dashboard pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// URL or local path of the workbook.
    pub source: String,
    pub data_sheet: String,
    pub npa_sheet: String,
    pub particular_column: String,
    pub month_column: String,
    pub value_column: String,
    pub dropped_columns: Vec<String>,
    pub placeholder_token: String,
    pub missing_label: String,
    pub currency_symbol: String,
    pub request_timeout_secs: u64,
    pub top_n: usize,
    pub npa_month_column: Option<String>,
    pub gross_npa_column: Option<String>,
    pub net_npa_column: Option<String>,
    /// Where the console host writes `filtered.csv` and `filtered.xlsx`.
    pub export_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let columns = DataColumns::default();
        let sheets = SheetNames::default();
        let normalize = NormalizeOptions::default();
        let formatter = Formatter::default();
        Self {
            source: DEFAULT_SOURCE.to_string(),
            data_sheet: sheets.data,
            npa_sheet: sheets.npa,
            particular_column: columns.particular,
            month_column: columns.month,
            value_column: columns.value,
            dropped_columns: normalize.dropped_columns,
            placeholder_token: normalize.placeholder_token,
            missing_label: formatter.missing_label,
            currency_symbol: formatter.currency_symbol,
            request_timeout_secs: 30,
            top_n: 10,
            npa_month_column: None,
            gross_npa_column: None,
            net_npa_column: None,
            export_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the file named by `BANK_DASHBOARD_CONFIG`, then
    /// `BANK_DASHBOARD_SOURCE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Ok(source) = std::env::var(SOURCE_ENV) {
            if !source.trim().is_empty() {
                config.source = source;
            }
        }
        Ok(config)
    }

    pub fn sheet_names(&self) -> SheetNames {
        SheetNames {
            data: self.data_sheet.clone(),
            npa: self.npa_sheet.clone(),
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            columns: DataColumns {
                particular: self.particular_column.clone(),
                month: self.month_column.clone(),
                value: self.value_column.clone(),
            },
            dropped_columns: self.dropped_columns.clone(),
            placeholder_token: self.placeholder_token.clone(),
        }
    }

    pub fn npa_overrides(&self) -> NpaColumnOverrides {
        NpaColumnOverrides {
            month: self.npa_month_column.clone(),
            gross: self.gross_npa_column.clone(),
            net: self.net_npa_column.clone(),
        }
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(&self.missing_label, &self.currency_symbol)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
