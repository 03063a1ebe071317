//! Sequential page loader with the degrade-to-empty failure policy

use serde_json::Value;
use std::time::Instant;

use crate::core::Record;
use crate::error::FetchError;
use crate::source::{FormKind, RecordSource};

/// Upper bound on pages fetched in one run
pub(crate) const DEFAULT_MAX_PAGES: u32 = 1000;

/// Loading result with statistics
#[derive(Debug, Default)]
pub(crate) struct LoadResult {
    pub(crate) records: Vec<Record>,
    pub(crate) elapsed_ms: f64,
}

/// Fetch pages 1, 2, ... one after another until a page comes back empty,
/// concatenating the results. Any failure aborts the whole fetch.
///
/// Returns the raw objects and the number of non-empty pages.
pub(crate) fn fetch_all_pages(
    source: &dyn RecordSource,
    max_pages: u32,
) -> Result<(Vec<Value>, u32), FetchError> {
    let mut all = Vec::new();
    let mut page = 1u32;

    loop {
        if page > max_pages {
            tracing::warn!(
                source = %source.describe(),
                max_pages,
                "page limit reached, stopping pagination"
            );
            break;
        }
        let data = source.fetch_page(page)?;
        if data.is_empty() {
            break;
        }
        tracing::debug!(page, records = data.len(), "fetched page");
        all.extend(data);
        page += 1;
    }

    Ok((all, page - 1))
}

/// Load every record from `source`. A failed fetch is logged and yields an
/// empty result instead of an error.
pub(crate) fn load_records(source: &dyn RecordSource, kind: FormKind, max_pages: u32) -> LoadResult {
    let start = Instant::now();

    match fetch_all_pages(source, max_pages) {
        Ok((values, pages)) => {
            let records: Vec<Record> = values.into_iter().map(|v| kind.to_record(v)).collect();
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            tracing::info!(
                source = %source.describe(),
                kind = kind.display_name(),
                records = records.len(),
                pages,
                "loaded records in {elapsed_ms:.2}ms"
            );
            LoadResult {
                records,
                elapsed_ms,
            }
        }
        Err(e) => {
            tracing::warn!(
                source = %source.describe(),
                kind = kind.display_name(),
                "failed to fetch records, continuing without data: {e}"
            );
            LoadResult {
                records: Vec::new(),
                elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
            }
        }
    }
}
