//! Source Module
//! Fetches workbook bytes from a URL or local path and memoizes parsed workbooks.

use crate::data::loader::{parse_workbook, LoaderError, SheetNames, Workbook};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Where the workbook lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceLocator {
    Url(String),
    Path(PathBuf),
}

impl SourceLocator {
    /// `http://` and `https://` locators are URLs, anything else is a path.
    pub fn parse(locator: &str) -> Self {
        let trimmed = locator.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceLocator::Url(trimmed.to_string())
        } else {
            SourceLocator::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::Url(url) => write!(f, "{}", url),
            SourceLocator::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Retrieve raw bytes from the source.
pub fn fetch_bytes(locator: &SourceLocator, timeout: Duration) -> Result<Vec<u8>, LoaderError> {
    let unavailable = |cause: String| LoaderError::SourceUnavailable {
        source_name: locator.to_string(),
        cause,
    };

    let bytes = match locator {
        SourceLocator::Url(url) => {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| unavailable(e.to_string()))?;
            let response = client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| unavailable(e.to_string()))?;
            response
                .bytes()
                .map_err(|e| unavailable(e.to_string()))?
                .to_vec()
        }
        SourceLocator::Path(path) => std::fs::read(path).map_err(|e| unavailable(e.to_string()))?,
    };

    info!(source = %locator, bytes = bytes.len(), "fetched source");
    Ok(bytes)
}

/// Memoized workbooks keyed by source locator.
///
/// Entries are shared read-only; a refresh replaces the entry wholesale.
pub struct SourceCache {
    sheets: SheetNames,
    timeout: Duration,
    entries: Mutex<HashMap<SourceLocator, Arc<Workbook>>>,
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new(SheetNames::default(), Duration::from_secs(30))
    }
}

impl SourceCache {
    pub fn new(sheets: SheetNames, timeout: Duration) -> Self {
        Self {
            sheets,
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached workbook, fetching and parsing it on first use.
    pub fn load(&self, locator: &SourceLocator) -> Result<Arc<Workbook>, LoaderError> {
        if let Some(workbook) = self.lock().get(locator) {
            debug!(source = %locator, "source cache hit");
            return Ok(Arc::clone(workbook));
        }

        debug!(source = %locator, "source cache miss");
        let bytes = fetch_bytes(locator, self.timeout)?;
        let workbook = Arc::new(parse_workbook(bytes, &self.sheets)?);

        // A concurrent loader may have won the race; keep whichever landed first.
        let mut entries = self.lock();
        let entry = entries
            .entry(locator.clone())
            .or_insert_with(|| Arc::clone(&workbook));
        Ok(Arc::clone(entry))
    }

    /// Drop one cached workbook so the next `load` re-fetches it.
    pub fn invalidate(&self, locator: &SourceLocator) -> bool {
        self.lock().remove(locator).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, locator: &SourceLocator) -> bool {
        self.lock().contains_key(locator)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SourceLocator, Arc<Workbook>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
