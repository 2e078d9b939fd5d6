//! Bank Dashboard - console report
//!
//! Runs the pipeline once over the configured source with no filters and
//! prints the overview, trend summary and NPA tables.

use anyhow::{Context, Result};
use bank_dashboard::data::{FilterSelection, Selection, SourceCache};
use bank_dashboard::{report, Dashboard, DashboardConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = DashboardConfig::from_env().context("failed to load configuration")?;
    let cache = SourceCache::new(config.sheet_names(), config.request_timeout());
    let dashboard = Dashboard::load(&cache, &config)
        .with_context(|| format!("failed to load {}", config.source))?;
    let formatter = config.formatter();

    let selection = FilterSelection::default();
    let overview = dashboard.overview(&selection);
    println!("Banking Data Overview\n");
    println!("{}", report::render_overview(&overview, &formatter));

    let trend = dashboard.trend(&Selection::All);
    println!("{}", report::render_trend(&trend, &formatter));

    if let Some(top) = overview.top_particulars.first() {
        println!("{}", report::render_detail(&dashboard.detail(&top.particular), &formatter));
    }

    println!("NPA Ratios\n");
    println!("{}", report::render_npa(&dashboard.npa, &formatter));

    if let Some(dir) = &config.export_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let csv_path = dir.join("filtered.csv");
        std::fs::write(&csv_path, dashboard.export_csv(&selection)?)
            .with_context(|| format!("failed to write {}", csv_path.display()))?;

        let xlsx_path = dir.join("filtered.xlsx");
        std::fs::write(&xlsx_path, dashboard.export_xlsx(&selection)?)
            .with_context(|| format!("failed to write {}", xlsx_path.display()))?;

        info!(dir = %dir.display(), "exported filtered data");
    }

    Ok(())
}
