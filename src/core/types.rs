//! Record and filter types shared by all views
//!
//! A record keeps the full upstream object so that every extra field is
//! passed through to listings and exports untouched.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::consts::{UNKNOWN, fields, service_fields, wheelset_fields};
use crate::core::parse::{DueDate, parse_calendar_date, parse_due_date_value};

/// One maintenance or cost event
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Record {
    /// Opaque upstream id (empty when absent)
    pub(crate) id: String,
    /// Trimmed description as written, "Unknown" when absent, null or blank
    pub(crate) description: String,
    /// Raw due date, kept only when it is a JSON string
    pub(crate) due_date: Option<String>,
    /// Full upstream object
    pub(crate) raw: Map<String, Value>,
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl Record {
    /// Build a record from a maintenance-form object. Non-objects become an
    /// empty record rather than an error.
    pub(crate) fn from_json(value: Value) -> Self {
        let raw = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = text_of(raw.get(fields::ID)).unwrap_or_default();
        let description = text_of(raw.get(fields::DESCRIPTION))
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let due_date = match raw.get(fields::DUE_DATE) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Record {
            id,
            description,
            due_date,
            raw,
        }
    }

    /// Build a record from a service-event-form object, mapping its fields
    /// onto the maintenance-form names.
    pub(crate) fn from_service_event(value: Value) -> Self {
        let mut raw = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let locomotive = raw.get(service_fields::LOCOMOTIVE).cloned();
        let name = locomotive
            .as_ref()
            .and_then(|l| l.get(service_fields::NAME))
            .cloned()
            .unwrap_or(Value::Null);
        let loco_id = locomotive
            .as_ref()
            .and_then(|l| l.get(fields::ID))
            .cloned()
            .unwrap_or(Value::Null);
        let plan_start = raw
            .get(service_fields::PLAN_START)
            .cloned()
            .unwrap_or(Value::Null);
        let event = raw
            .get(service_fields::EVENT_SERVICE)
            .cloned()
            .unwrap_or(Value::Null);

        raw.insert(fields::ID.to_string(), loco_id);
        raw.insert(fields::DESCRIPTION.to_string(), name);
        raw.insert(fields::DUE_DATE.to_string(), plan_start);
        raw.insert(fields::PM_DESCRIPTION.to_string(), event);
        raw.insert(fields::SERVICE_FLAG.to_string(), Value::Bool(true));

        Self::from_json(Value::Object(raw))
    }

    /// Build a record from a wheelset-measurement-form object. The locomotive
    /// and work-order lookups are lifted into flat fields appended after the
    /// remaining ones; the locomotive name becomes the description.
    pub(crate) fn from_wheelset(value: Value) -> Self {
        let source = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let locomotive = source.get(wheelset_fields::LOCOMOTIVE).cloned();
        let work_order = source.get(wheelset_fields::WORK_ORDER).cloned();

        let mut raw: Map<String, Value> = source
            .into_iter()
            .filter(|(key, _)| {
                key != wheelset_fields::LOCOMOTIVE && key != wheelset_fields::WORK_ORDER
            })
            .collect();
        for (target, lookup, field) in [
            (wheelset_fields::NAME, &locomotive, wheelset_fields::NAME),
            (
                wheelset_fields::HOMOLOGATION_DATE,
                &locomotive,
                wheelset_fields::HOMOLOGATION_DATE,
            ),
            (
                wheelset_fields::LOCOMOTIVE,
                &locomotive,
                wheelset_fields::LOCOMOTIVE,
            ),
            (wheelset_fields::WORK_ORDER_NAME, &work_order, wheelset_fields::NAME),
            (
                wheelset_fields::WORK_ORDER_NUMBER,
                &work_order,
                wheelset_fields::WORK_ORDER_NUMBER_SOURCE,
            ),
        ] {
            let value = lookup
                .as_ref()
                .and_then(|l| l.get(field))
                .cloned()
                .unwrap_or(Value::Null);
            raw.insert(target.to_string(), value);
        }

        let name = text_of(raw.get(wheelset_fields::NAME))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let mut record = Self::from_json(Value::Object(raw));
        record.description = name;
        record
    }

    /// Key that rollup rows and drill-downs group by
    pub(crate) fn description_key(&self) -> String {
        description_key(&self.description)
    }

    pub(crate) fn field(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Field rendered as display text; `None` for absent, null or empty values
    pub(crate) fn field_text(&self, name: &str) -> Option<String> {
        text_of(self.raw.get(name)).filter(|s| !s.is_empty())
    }

    pub(crate) fn due(&self) -> Option<DueDate> {
        parse_due_date_value(self.raw.get(fields::DUE_DATE))
    }

    pub(crate) fn due_calendar_date(&self) -> Option<NaiveDate> {
        self.due_date.as_deref().and_then(parse_calendar_date)
    }

    pub(crate) fn is_service_event(&self) -> bool {
        matches!(self.raw.get(fields::SERVICE_FLAG), Some(Value::Bool(true)))
    }
}

/// Canonical grouping form of a description: trimmed and case-folded, so
/// "LocoA" and " locoa " land in the same row.
pub(crate) fn description_key(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Scalar JSON value as text; objects and arrays are not text
fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Date filter for queries
#[derive(Debug, Clone, Default)]
pub(crate) struct DateFilter {
    pub(crate) since: Option<NaiveDate>,
    pub(crate) until: Option<NaiveDate>,
}

impl DateFilter {
    pub(crate) fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    pub(crate) fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        if let Some(s) = self.since
            && date < s
        {
            return false;
        }
        if let Some(u) = self.until
            && date > u
        {
            return false;
        }
        true
    }
}

/// User-selected record filters: descriptions and a due-date range
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordFilter {
    /// Empty means "all descriptions"
    pub(crate) descriptions: HashSet<String>,
    pub(crate) dates: DateFilter,
}

impl RecordFilter {
    pub(crate) fn matches(&self, record: &Record) -> bool {
        if !self.descriptions.is_empty() {
            let key = record.description_key();
            if !self.descriptions.iter().any(|d| description_key(d) == key) {
                return false;
            }
        }
        if self.dates.is_unbounded() {
            return true;
        }
        record
            .due_calendar_date()
            .is_some_and(|date| self.dates.contains(date))
    }

    pub(crate) fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Sort by due date, ascending unless `descending`; undated records always
/// sort last. Stable, so equal dates keep input order.
pub(crate) fn sort_by_due_date(records: &mut [Record], descending: bool) {
    records.sort_by(|a, b| match (a.due_calendar_date(), b.due_calendar_date()) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Distinct descriptions in first-seen order and spelling, skipping records
/// that had none
pub(crate) fn known_descriptions(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| {
            r.field_text(fields::DESCRIPTION)
                .is_some_and(|d| !d.trim().is_empty())
        })
        .filter(|r| seen.insert(r.description_key()))
        .map(|r| r.description.clone())
        .collect()
}
