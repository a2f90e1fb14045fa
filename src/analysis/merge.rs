//! Joining the current and previous season tables on the player name.
//!
//! The key is compared exactly as loaded: no case folding, no trimming, no
//! accent stripping. Two different players sharing a name match each other,
//! and duplicate names produce every pairing.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::data::model::{CellValue, PlayerRecord, Table};

/// Inner join of `left` and `right` on `key`.
///
/// Non-key columns present on both sides get `left_suffix` / `right_suffix`
/// appended; columns unique to one side keep their name. Output rows follow
/// left order, each left row followed by all its right matches in right order.
/// Empty inputs or a missing key column yield an empty table.
pub fn merge_on_identity(
    left: &Table,
    right: &Table,
    key: &str,
    left_suffix: &str,
    right_suffix: &str,
) -> Table {
    if left.is_empty() || right.is_empty() || !left.has_columns(&[key]) || !right.has_columns(&[key]) {
        return Table::default();
    }

    let shared: BTreeSet<&str> = left
        .column_names
        .iter()
        .filter(|c| c.as_str() != key && right.has_column(c))
        .map(String::as_str)
        .collect();

    let rename = |col: &str, suffix: &str| -> String {
        if shared.contains(col) {
            format!("{col}{suffix}")
        } else {
            col.to_string()
        }
    };

    let mut header = vec![key.to_string()];
    header.extend(
        left.column_names
            .iter()
            .filter(|c| c.as_str() != key)
            .map(|c| rename(c, left_suffix)),
    );
    header.extend(
        right
            .column_names
            .iter()
            .filter(|c| c.as_str() != key)
            .map(|c| rename(c, right_suffix)),
    );

    let mut right_index: HashMap<&CellValue, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows.iter().enumerate() {
        let k = row.get(key);
        if !k.is_null() {
            right_index.entry(k).or_default().push(i);
        }
    }

    let mut rows = Vec::new();
    for lrow in &left.rows {
        let k = lrow.get(key);
        let Some(matches) = right_index.get(k) else { continue };
        for &ri in matches {
            let rrow = &right.rows[ri];
            let mut merged = PlayerRecord::new();
            merged.insert(key, k.clone());
            for (col, val) in &lrow.cells {
                if col != key {
                    merged.insert(rename(col, left_suffix), val.clone());
                }
            }
            for (col, val) in &rrow.cells {
                if col != key {
                    merged.insert(rename(col, right_suffix), val.clone());
                }
            }
            rows.push(merged);
        }
    }

    log::debug!(
        "merged {} x {} rows on '{key}' into {} rows",
        left.len(),
        right.len(),
        rows.len()
    );
    Table::with_columns(header, rows)
}

/// How the distinct player names of two tables overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOverlap {
    pub left_total: usize,
    pub right_total: usize,
    pub common: usize,
    pub left_only: usize,
    pub right_only: usize,
}

/// `None` when either table is empty. A table without `key` contributes no names.
pub fn player_overlap(left: &Table, right: &Table, key: &str) -> Option<PlayerOverlap> {
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let names = |t: &Table| -> BTreeSet<String> {
        if !t.has_columns(&[key]) {
            return BTreeSet::new();
        }
        t.rows
            .iter()
            .map(|r| r.get(key))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect()
    };
    let l = names(left);
    let r = names(right);
    let common = l.intersection(&r).count();
    Some(PlayerOverlap {
        left_total: l.len(),
        right_total: r.len(),
        common,
        left_only: l.len() - common,
        right_only: r.len() - common,
    })
}

/// Columns present in both tables, in `left` order. Empty if either table is.
pub fn common_columns(left: &Table, right: &Table) -> Vec<String> {
    if left.is_empty() || right.is_empty() {
        return Vec::new();
    }
    left.column_names
        .iter()
        .filter(|c| right.has_column(c))
        .cloned()
        .collect()
}
