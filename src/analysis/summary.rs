//! Page-level aggregates: metric cards, quick stats, insights and the player
//! lookup used by the comparison page.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::classify::{self, QuickStat};
use super::distribution::{distinct_count, top_categories_by_mean};
use super::ranking::stat_summary;
use crate::config::ColumnNames;
use crate::data::filter::{self, FilterCriteria};
use crate::data::model::{PlayerRecord, Table};

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_players: usize,
    /// `None` when the table has no numeric convenience values.
    pub avg_convenience: Option<f64>,
    pub top_convenience: Option<f64>,
    pub teams_covered: usize,
}

pub fn overview_metrics(table: &Table, columns: &ColumnNames) -> OverviewMetrics {
    let conv = stat_summary(table, &columns.convenience);
    let (avg_convenience, top_convenience) = if conv.is_empty() {
        (None, None)
    } else {
        (Some(conv.mean), Some(conv.max))
    };
    OverviewMetrics {
        total_players: table.len(),
        avg_convenience,
        top_convenience,
        teams_covered: distinct_count(table, &columns.team),
    }
}

// ---------------------------------------------------------------------------
// Comparison quick stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickStats {
    pub best_value: QuickStat,
    pub hidden_gem: QuickStat,
    pub trending_up: QuickStat,
    pub most_consistent: QuickStat,
}

impl Default for QuickStats {
    fn default() -> Self {
        Self {
            best_value: QuickStat::NotAvailable,
            hidden_gem: QuickStat::NotAvailable,
            trending_up: QuickStat::NotImplemented,
            most_consistent: QuickStat::NotImplemented,
        }
    }
}

/// Quick-stat cards for `table`, optionally narrowed to one role first.
pub fn comparison_quick_stats(
    table: &Table,
    role_focus: Option<&str>,
    columns: &ColumnNames,
    gem_pool: usize,
) -> QuickStats {
    let focused;
    let table = match role_focus {
        Some(role) => {
            let criteria = FilterCriteria {
                roles: [role.to_string()].into(),
                ..Default::default()
            };
            focused = filter::apply(table, &criteria, columns);
            &focused
        }
        None => table,
    };

    QuickStats {
        best_value: QuickStat::from_record(classify::best_value(table, columns), &columns.name),
        hidden_gem: QuickStat::from_record(
            classify::hidden_gem(table, columns, gem_pool),
            &columns.name,
        ),
        trending_up: classify::trending_up(table),
        most_consistent: classify::most_consistent(table),
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_players: usize,
    pub avg_convenience: Option<f64>,
    /// Role with the highest mean convenience.
    pub best_role: Option<String>,
    /// Team with the highest mean convenience.
    pub best_team: Option<String>,
}

pub fn insights(table: &Table, columns: &ColumnNames) -> Insights {
    let best_by = |category: &str| {
        top_categories_by_mean(table, category, &columns.convenience, 1)
            .into_iter()
            .next()
            .map(|m| m.category)
    };
    Insights {
        total_players: table.len(),
        avg_convenience: overview_metrics(table, columns).avg_convenience,
        best_role: best_by(&columns.role),
        best_team: best_by(&columns.team),
    }
}

// ---------------------------------------------------------------------------
// Player lookup
// ---------------------------------------------------------------------------

/// Which season(s) a player lookup searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Current,
    Previous,
    /// Current first, previous as fallback.
    #[default]
    Both,
}

/// First row whose `key` equals `name` exactly.
pub fn find_player<'a>(table: &'a Table, key: &str, name: &str) -> Option<&'a PlayerRecord> {
    if !table.has_columns(&[key]) {
        return None;
    }
    table.rows.iter().find(|r| r.label(key) == name)
}

pub fn find_in_season<'a>(
    current: &'a Table,
    previous: &'a Table,
    season: Season,
    key: &str,
    name: &str,
) -> Option<&'a PlayerRecord> {
    match season {
        Season::Current => find_player(current, key, name),
        Season::Previous => find_player(previous, key, name),
        Season::Both => {
            find_player(current, key, name).or_else(|| find_player(previous, key, name))
        }
    }
}

/// The subset of `candidates` that `table` actually has, in candidate order.
pub fn available_metrics(table: &Table, candidates: &[&str]) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| table.has_column(c))
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    /// `(metric, value)` with values clamped to `[0, 100]`; missing is 0.
    pub values: Vec<(String, f64)>,
}

pub fn player_profile(record: &PlayerRecord, name_column: &str, metrics: &[String]) -> PlayerProfile {
    PlayerProfile {
        name: record.label(name_column),
        values: metrics
            .iter()
            .map(|m| (m.clone(), record.number(m).map_or(0.0, |v| v.clamp(0.0, 100.0))))
            .collect(),
    }
}

/// Sorted distinct names across both tables, optionally restricted to `role`.
pub fn player_names(
    current: &Table,
    previous: &Table,
    columns: &ColumnNames,
    role: Option<&str>,
) -> Vec<String> {
    let mut names = BTreeSet::new();
    for table in [current, previous] {
        if !table.has_columns(&[columns.name.as_str()]) {
            continue;
        }
        let role_applies = role.is_some() && table.has_columns(&[columns.role.as_str()]);
        for row in &table.rows {
            if role_applies && role != Some(row.label(&columns.role).as_str()) {
                continue;
            }
            let name = row.get(&columns.name);
            if !name.is_null() {
                names.insert(name.to_string());
            }
        }
    }
    names.into_iter().collect()
}
