use serde::{Deserialize, Serialize};

use crate::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Top-N selection
// ---------------------------------------------------------------------------

/// Up to `n` rows sorted by `column` descending.
///
/// Rows whose value is not numeric are left out of the ranking. Ties keep
/// table order. A missing column yields an empty table.
pub fn top_n(table: &Table, column: &str, n: usize) -> Table {
    if !table.has_columns(&[column]) {
        return Table::default();
    }
    let mut ranked = table.numeric_cells(column);
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    table.subset(ranked.into_iter().map(|(i, _)| i))
}

/// Every row of `table`, ordered by `column`.
///
/// Numeric cells compare as numbers and come first, other values follow in
/// their natural order, nulls always last. `descending` flips the order within
/// the numeric and non-numeric groups only. Ties keep table order; a missing
/// column leaves the table as is.
pub fn sort_by_column(table: &Table, column: &str, descending: bool) -> Table {
    if !table.has_columns(&[column]) {
        return table.clone();
    }
    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| {
        let va = table.rows[a].get(column);
        let vb = table.rows[b].get(column);
        sort_group(va).cmp(&sort_group(vb)).then_with(|| {
            let ord = match (va.as_f64(), vb.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => va.cmp(vb),
            };
            if descending {
                ord.reverse()
            } else {
                ord
            }
        })
    });
    table.subset(order)
}

fn sort_group(v: &CellValue) -> u8 {
    if v.as_f64().is_some() {
        0
    } else if v.is_null() {
        2
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics over the numeric values of one column.
///
/// `count == 0` marks the empty summary; every other field is then zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

impl StatSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// The numeric values of `column`, in row order. Non-coercible cells dropped.
pub fn numeric_values(table: &Table, column: &str) -> Vec<f64> {
    table
        .numeric_cells(column)
        .into_iter()
        .map(|(_, v)| v)
        .collect()
}

pub fn stat_summary(table: &Table, column: &str) -> StatSummary {
    if !table.has_columns(&[column]) {
        return StatSummary::default();
    }
    summarize(numeric_values(table, column))
}

/// Summary of raw values.
pub fn summarize(mut values: Vec<f64>) -> StatSummary {
    if values.is_empty() {
        return StatSummary::default();
    }
    values.sort_by(f64::total_cmp);

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std_dev = if n < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    };

    StatSummary {
        count: n,
        mean,
        median: percentile(&values, 0.5),
        std_dev,
        min: values[0],
        max: values[n - 1],
        p25: percentile(&values, 0.25),
        p75: percentile(&values, 0.75),
    }
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, 0.5)
}
