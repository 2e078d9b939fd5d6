//! Data module - loading, cleaning, filtering and export

pub mod export;
mod filter;
mod loader;
mod model;
mod normalizer;
mod source;

pub use filter::{FilterEngine, FilterSelection, Selection, ALL_TOKEN};
pub use loader::{cell_to_string, parse_workbook, LoaderError, SheetNames, Workbook};
pub use model::{
    CoercionReport, DataColumns, Dataset, MonthOrdering, NpaRecord, Record, MONTH_RANK_COLUMN,
};
pub use normalizer::{
    detect_npa_columns, NormalizeOptions, Normalizer, NpaColumnOverrides, NpaColumns, SchemaError,
};
pub use source::{fetch_bytes, SourceCache, SourceLocator};
