//! Hierarchical cost aggregation
//!
//! Folds flat records into a description -> year -> quarter -> month tree,
//! one tree per cost dimension, plus a combined "Total Cost" tree.
//!
//! Only month leaves are accumulated. Quarter and year totals are derived
//! from their children when a tree is built, so every tree satisfies
//! `year.total == Σ quarter.total` and `quarter.total == Σ months` exactly.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::consts::{TOTAL_LABEL, fields};
use crate::core::parse::CostParser;
use crate::core::quarter::{Bucket, QuarterMapping};
use crate::core::types::{Record, description_key};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct QuarterNode {
    pub(crate) total: f64,
    pub(crate) months: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct YearNode {
    pub(crate) total: f64,
    pub(crate) quarters: BTreeMap<String, QuarterNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct DescriptionNode {
    pub(crate) description: String,
    pub(crate) years: BTreeMap<String, YearNode>,
}

impl DescriptionNode {
    pub(crate) fn year_total(&self, year: &str) -> f64 {
        self.years.get(year).map_or(0.0, |y| y.total)
    }

    pub(crate) fn quarter_total(&self, year: &str, quarter: &str) -> f64 {
        self.years
            .get(year)
            .and_then(|y| y.quarters.get(quarter))
            .map_or(0.0, |q| q.total)
    }

    pub(crate) fn month_total(&self, year: &str, quarter: &str, month: &str) -> f64 {
        self.years
            .get(year)
            .and_then(|y| y.quarters.get(quarter))
            .and_then(|q| q.months.get(month))
            .copied()
            .unwrap_or(0.0)
    }

    pub(crate) fn total(&self) -> f64 {
        self.years.values().map(|y| y.total).sum()
    }
}

/// Aggregation result for one cost dimension, keyed by the folded
/// description (see [`description_key`])
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct AggregationTree {
    descriptions: BTreeMap<String, DescriptionNode>,
}

impl AggregationTree {
    #[cfg(test)]
    pub(crate) fn get(&self, description: &str) -> Option<&DescriptionNode> {
        self.descriptions.get(&description_key(description))
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &DescriptionNode> {
        self.descriptions.values()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.descriptions.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn total(&self) -> f64 {
        self.nodes().map(DescriptionNode::total).sum()
    }

    /// Description nodes in case-insensitive alphabetical order
    pub(crate) fn into_details(self) -> Vec<DescriptionNode> {
        self.descriptions.into_values().collect()
    }
}

/// Month leaves of one row, shown under the first spelling seen
#[derive(Debug, Default)]
struct RowLeaves {
    display: String,
    months: BTreeMap<Bucket, f64>,
}

/// Accumulates month-level leaves and derives all totals on `build`
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    rows: BTreeMap<String, RowLeaves>,
}

impl TreeBuilder {
    pub(crate) fn add(&mut self, description: &str, bucket: &Bucket, value: f64) {
        let row = self
            .rows
            .entry(description_key(description))
            .or_insert_with(|| RowLeaves {
                display: description.trim().to_string(),
                months: BTreeMap::new(),
            });
        *row.months.entry(bucket.clone()).or_insert(0.0) += value;
    }

    /// Add every month leaf of an existing tree
    pub(crate) fn absorb(&mut self, tree: &AggregationTree) {
        for node in tree.nodes() {
            for (year, year_node) in &node.years {
                for (quarter, quarter_node) in &year_node.quarters {
                    for (month, value) in &quarter_node.months {
                        let bucket = Bucket {
                            year: year.clone(),
                            quarter: quarter.clone(),
                            month: month.clone(),
                        };
                        self.add(&node.description, &bucket, *value);
                    }
                }
            }
        }
    }

    pub(crate) fn build(self) -> AggregationTree {
        let descriptions = self
            .rows
            .into_iter()
            .map(|(key, row)| {
                let mut years: BTreeMap<String, YearNode> = BTreeMap::new();
                for (bucket, value) in row.months {
                    years
                        .entry(bucket.year)
                        .or_default()
                        .quarters
                        .entry(bucket.quarter)
                        .or_default()
                        .months
                        .insert(bucket.month, value);
                }
                for year in years.values_mut() {
                    for quarter in year.quarters.values_mut() {
                        quarter.total = quarter.months.values().sum();
                    }
                    year.total = year.quarters.values().map(|q| q.total).sum();
                }
                let node = DescriptionNode {
                    description: row.display,
                    years,
                };
                (key, node)
            })
            .collect();
        AggregationTree { descriptions }
    }
}

/// Fold `records` into a tree for one cost field.
///
/// Records without a usable due date (or whose month has no quarter) are
/// left out entirely; unparseable costs count as 0.
pub(crate) fn aggregate(
    records: &[Record],
    cost_field: &str,
    mapping: &QuarterMapping,
    parser: &CostParser,
) -> AggregationTree {
    let mut builder = TreeBuilder::default();
    let mut skipped = 0usize;

    for record in records {
        let Some(bucket) = record
            .due()
            .and_then(|date| Bucket::from_due_date(&date, mapping))
        else {
            tracing::trace!(id = %record.id, "no usable due date");
            skipped += 1;
            continue;
        };
        let value = parser.parse_value(record.field(cost_field));
        builder.add(&record.description, &bucket, value);
    }

    if skipped > 0 {
        tracing::debug!(
            cost_field,
            skipped,
            "records without a usable due date left out of rollup"
        );
    }
    builder.build()
}

/// Pointwise sum of trees over the union of their keys
pub(crate) fn combine(trees: &[AggregationTree]) -> AggregationTree {
    let mut builder = TreeBuilder::default();
    for tree in trees {
        builder.absorb(tree);
    }
    builder.build()
}

/// A named cost field, e.g. "Labor Cost" -> `Estimated_Labor_Cost`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct CostDimension {
    pub(crate) label: String,
    pub(crate) field: String,
}

impl CostDimension {
    pub(crate) fn new(label: impl Into<String>, field: impl Into<String>) -> Self {
        CostDimension {
            label: label.into(),
            field: field.into(),
        }
    }

    pub(crate) fn standard() -> Vec<CostDimension> {
        vec![
            CostDimension::new("Labor Cost", fields::LABOR_COST),
            CostDimension::new("Tool Cost", fields::TOOL_COST),
            CostDimension::new("Service Cost", fields::SERVICE_COST),
            CostDimension::new("Item Cost", fields::ITEM_COST),
        ]
    }
}

/// One row group of the rollup: a dimension label and its description nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CostGroup {
    pub(crate) label: String,
    pub(crate) details: Vec<DescriptionNode>,
}

impl CostGroup {
    pub(crate) fn year_total(&self, year: &str) -> f64 {
        self.details.iter().map(|d| d.year_total(year)).sum()
    }

    pub(crate) fn quarter_total(&self, year: &str, quarter: &str) -> f64 {
        self.details
            .iter()
            .map(|d| d.quarter_total(year, quarter))
            .sum()
    }

    pub(crate) fn month_total(&self, year: &str, quarter: &str, month: &str) -> f64 {
        self.details
            .iter()
            .map(|d| d.month_total(year, quarter, month))
            .sum()
    }

    pub(crate) fn total(&self) -> f64 {
        self.details.iter().map(DescriptionNode::total).sum()
    }

    pub(crate) fn is_total(&self) -> bool {
        self.label == TOTAL_LABEL
    }
}

/// One group per dimension, followed by the combined "Total Cost" group.
pub(crate) fn label_groups(
    dimensions: &[CostDimension],
    records: &[Record],
    mapping: &QuarterMapping,
    parser: &CostParser,
) -> Vec<CostGroup> {
    let trees: Vec<AggregationTree> = dimensions
        .par_iter()
        .map(|dim| aggregate(records, &dim.field, mapping, parser))
        .collect();
    let total = combine(&trees);

    let mut groups: Vec<CostGroup> = dimensions
        .iter()
        .zip(trees)
        .map(|(dim, tree)| CostGroup {
            label: dim.label.clone(),
            details: tree.into_details(),
        })
        .collect();
    groups.push(CostGroup {
        label: TOTAL_LABEL.to_string(),
        details: total.into_details(),
    });
    groups
}

/// Sorted union of all year keys across groups
pub(crate) fn all_years(groups: &[CostGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.details.iter())
        .flat_map(|d| d.years.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
