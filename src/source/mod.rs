//! Record source abstraction layer
//!
//! A source hands out raw record objects one page at a time. The loader
//! walks the pages sequentially and turns them into [`Record`]s.

pub(crate) mod file;
pub(crate) mod form_api;
pub(crate) mod loader;

use serde_json::Value;

use crate::core::Record;
use crate::error::FetchError;

/// Which upstream form a source reads; decides how raw objects become records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormKind {
    /// Maintenance and cost estimates (`Loco_Description`, `Next_Due_Date`, ...)
    Maintenance,
    /// Service events (`Locomotive_Number.Name`, `Plan_Start`, ...)
    ServiceEvent,
    /// Wheelset measurements, with locomotive and work-order lookups
    Wheelset,
}

impl FormKind {
    pub(crate) fn to_record(self, value: Value) -> Record {
        match self {
            FormKind::Maintenance => Record::from_json(value),
            FormKind::ServiceEvent => Record::from_service_event(value),
            FormKind::Wheelset => Record::from_wheelset(value),
        }
    }

    pub(crate) fn display_name(self) -> &'static str {
        match self {
            FormKind::Maintenance => "maintenance",
            FormKind::ServiceEvent => "service event",
            FormKind::Wheelset => "wheelset measurement",
        }
    }
}

/// Paginated record source
pub(crate) trait RecordSource {
    /// Short description for log messages
    fn describe(&self) -> String;

    /// Fetch one page (1-based). An empty page ends pagination.
    fn fetch_page(&self, page: u32) -> Result<Vec<Value>, FetchError>;
}

pub(crate) use file::FileSource;
pub(crate) use form_api::{Credentials, FormApiSource};
pub(crate) use loader::{LoadResult, load_records};
