use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::ColumnNames;
use crate::data::model::Table;

/// Row count for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub category: String,
    pub count: usize,
}

/// Mean of a metric within one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMean {
    pub category: String,
    pub mean: f64,
    /// Rows that contributed a numeric metric value.
    pub count: usize,
}

/// Rows per category value, most frequent first (ties: category ascending).
///
/// Categories are the cells' display strings; rows with no value are counted
/// under `<null>`, so the counts always add up to the row count.
pub fn distribution(table: &Table, category: &str) -> Vec<DistributionEntry> {
    if !table.has_columns(&[category]) {
        return Vec::new();
    }
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in &table.rows {
        *counts.entry(row.label(category)).or_default() += 1;
    }
    let mut entries: Vec<DistributionEntry> = counts
        .into_iter()
        .map(|(category, count)| DistributionEntry { category, count })
        .collect();
    // BTreeMap order is ascending by category; a stable sort keeps it for ties.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

pub fn role_distribution(table: &Table, columns: &ColumnNames) -> Vec<DistributionEntry> {
    distribution(table, &columns.role)
}

pub fn team_distribution(table: &Table, columns: &ColumnNames) -> Vec<DistributionEntry> {
    distribution(table, &columns.team)
}

/// Per-category mean of `metric`, in ascending category order.
///
/// Rows with a non-numeric metric count neither towards the mean nor the
/// category's count; a category without any numeric row is omitted. Rows
/// with a null or missing category belong to no category.
pub fn mean_by_category(table: &Table, category: &str, metric: &str) -> Vec<CategoryMean> {
    if !table.has_columns(&[category, metric]) {
        return Vec::new();
    }
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in &table.rows {
        let Some(v) = row.number(metric) else { continue };
        if row.get(category).is_null() {
            continue;
        }
        let slot = sums.entry(row.label(category)).or_insert((0.0, 0));
        slot.0 += v;
        slot.1 += 1;
    }
    sums.into_iter()
        .map(|(category, (sum, count))| CategoryMean {
            category,
            mean: sum / count as f64,
            count,
        })
        .collect()
}

/// [`mean_by_category`] ranked by mean descending (ties: category ascending),
/// truncated to `n`.
pub fn top_categories_by_mean(
    table: &Table,
    category: &str,
    metric: &str,
    n: usize,
) -> Vec<CategoryMean> {
    let mut means = mean_by_category(table, category, metric);
    means.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    means.truncate(n);
    means
}

/// Number of distinct non-null values in `column`.
pub fn distinct_count(table: &Table, column: &str) -> usize {
    if !table.has_columns(&[column]) {
        return 0;
    }
    table
        .rows
        .iter()
        .map(|row| row.get(column))
        .filter(|v| !v.is_null())
        .collect::<BTreeSet<_>>()
        .len()
}
