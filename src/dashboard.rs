//! Dashboard Module
//! Runs the load -> normalize -> filter -> aggregate pipeline for one interaction.
//!
//! A `Dashboard` is built once per refresh and is read-only afterwards; every
//! view is a fresh derivation from it and the caller's `FilterSelection`.

use crate::config::DashboardConfig;
use crate::data::{
    export, Dataset, FilterEngine, FilterSelection, LoaderError, Normalizer, NpaRecord, Record,
    SchemaError, Selection, SourceCache, SourceLocator, Workbook,
};
use crate::stats::{
    average_changes, change_matrix, linear_trend, particular_series, period_over_period,
    Aggregator, AverageChange, ChangeMatrix, LatestValue, LinearTrend, MonthSummary,
    OverviewMetrics, ParticularStats, ParticularTotal, PeriodChange, PivotTable, StatsCalculator,
};
use polars::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Export(#[from] export::ExportError),
}

/// Non-fatal conditions attached to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Cells that failed numeric coercion and are shown as missing.
    ValueCoercion { unparseable_cells: usize },
    /// The selection matched no rows; charts and aggregates are skipped.
    EmptyResult,
}

/// Overview tab: KPI figures, monthly summary, top particulars.
#[derive(Debug, Clone)]
pub struct OverviewView {
    pub selection: FilterSelection,
    pub records: Vec<Record>,
    pub metrics: OverviewMetrics,
    pub monthly: Vec<MonthSummary>,
    pub top_particulars: Vec<ParticularTotal>,
    pub notices: Vec<Notice>,
}

/// Trend tab: pivot of the chosen particulars and their % changes.
#[derive(Debug, Clone)]
pub struct TrendView {
    pub pivot: PivotTable,
    pub changes: ChangeMatrix,
    pub average_changes: Vec<AverageChange>,
}

/// Detail tab for one particular.
#[derive(Debug, Clone)]
pub struct DetailView {
    pub particular: String,
    pub series: Vec<PeriodChange>,
    pub trend: Option<LinearTrend>,
    pub stats: ParticularStats,
    pub latest: Option<LatestValue>,
}

/// A loaded and normalized source, shared read-only for a session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub dataset: Dataset,
    pub npa: Vec<NpaRecord>,
    top_n: usize,
}

impl Dashboard {
    /// Load (or reuse the cached) workbook and normalize it.
    pub fn load(cache: &SourceCache, config: &DashboardConfig) -> Result<Self, DashboardError> {
        let locator = SourceLocator::parse(&config.source);
        let workbook = cache.load(&locator)?;
        Self::from_workbook(&workbook, config)
    }

    /// Drop the cached workbook and load the source again.
    pub fn refresh(cache: &SourceCache, config: &DashboardConfig) -> Result<Self, DashboardError> {
        let locator = SourceLocator::parse(&config.source);
        cache.invalidate(&locator);
        info!(source = %locator, "refreshing source");
        Self::load(cache, config)
    }

    pub fn from_workbook(workbook: &Workbook, config: &DashboardConfig) -> Result<Self, DashboardError> {
        let dataset = Normalizer::normalize(&workbook.data, &config.normalize_options())?;
        let npa = Normalizer::normalize_npa(
            &workbook.npa,
            &config.npa_overrides(),
            &config.placeholder_token,
        )?;
        info!(
            records = dataset.records.len(),
            months = dataset.months.len(),
            npa_rows = npa.len(),
            "dashboard loaded"
        );
        Ok(Self {
            dataset,
            npa,
            top_n: config.top_n,
        })
    }

    /// Pick-list options for both filter widgets.
    pub fn filter_options(&self) -> (Vec<String>, Vec<String>) {
        (
            FilterEngine::particular_options(&self.dataset.records),
            FilterEngine::month_options(&self.dataset.months),
        )
    }

    pub fn overview(&self, selection: &FilterSelection) -> OverviewView {
        let records = FilterEngine::apply(selection, &self.dataset.records);

        let mut notices = Vec::new();
        if self.dataset.coercion.unparseable_cells > 0 {
            notices.push(Notice::ValueCoercion {
                unparseable_cells: self.dataset.coercion.unparseable_cells,
            });
        }
        if records.is_empty() {
            warn!(?selection, "selection matched no rows");
            notices.push(Notice::EmptyResult);
        }

        OverviewView {
            selection: selection.clone(),
            metrics: Aggregator::overview(&records),
            monthly: Aggregator::group_summary(&records),
            top_particulars: Aggregator::top_particulars(&records, self.top_n),
            records,
            notices,
        }
    }

    /// Trend over the chosen particulars, all months.
    ///
    /// `Selection::All` pivots every particular, sorted by name.
    pub fn trend(&self, particulars: &Selection) -> TrendView {
        let selection = FilterSelection::default().with_particulars(particulars.clone());
        let records = FilterEngine::apply(&selection, &self.dataset.records);
        let columns = match particulars {
            Selection::All => Aggregator::particulars(&records),
            Selection::Only(labels) => labels.iter().cloned().collect(),
        };

        let pivot = Aggregator::pivot(&records, &columns);
        let changes = change_matrix(&pivot);
        let average_changes = average_changes(&changes);
        TrendView {
            pivot,
            changes,
            average_changes,
        }
    }

    /// Month-to-month detail of one particular over the whole dataset.
    pub fn detail(&self, particular: &str) -> DetailView {
        let series = particular_series(&self.dataset.records, particular);
        let values: Vec<Option<f64>> = series.iter().map(|(_, v)| *v).collect();

        DetailView {
            particular: particular.to_string(),
            trend: linear_trend(&values),
            series: period_over_period(&series),
            stats: StatsCalculator::describe(&self.dataset.records, particular),
            latest: StatsCalculator::latest_value(&self.dataset.records, particular),
        }
    }

    /// The cleaned frame restricted to the selection, all columns kept.
    pub fn filtered_frame(&self, selection: &FilterSelection) -> PolarsResult<DataFrame> {
        FilterEngine::apply_frame(selection, &self.dataset.frame, &self.dataset.columns)
    }

    pub fn export_csv(&self, selection: &FilterSelection) -> Result<Vec<u8>, DashboardError> {
        let frame = self.filtered_frame(selection).map_err(export::ExportError::from)?;
        Ok(export::to_csv(&frame)?)
    }

    pub fn export_xlsx(&self, selection: &FilterSelection) -> Result<Vec<u8>, DashboardError> {
        let frame = self.filtered_frame(selection).map_err(export::ExportError::from)?;
        Ok(export::to_xlsx(&frame)?)
    }
}
