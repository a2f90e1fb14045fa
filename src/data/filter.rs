use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::Table;
use crate::config::ColumnNames;

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Pre-selection on the convenience score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvenienceMode {
    #[default]
    All,
    Top50,
    Top100,
    AboveAverage,
}

impl ConvenienceMode {
    pub const MODES: [ConvenienceMode; 4] = [
        ConvenienceMode::All,
        ConvenienceMode::Top50,
        ConvenienceMode::Top100,
        ConvenienceMode::AboveAverage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConvenienceMode::All => "All Players",
            ConvenienceMode::Top50 => "Top 50",
            ConvenienceMode::Top100 => "Top 100",
            ConvenienceMode::AboveAverage => "Above Average",
        }
    }
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Everything the filter widgets can select.
/// Empty sets and `None` ranges mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub roles: BTreeSet<String>,
    pub teams: BTreeSet<String>,
    pub convenience_mode: ConvenienceMode,
    pub convenience_range: Option<NumericRange>,
    pub potential_range: Option<NumericRange>,
}

// ---------------------------------------------------------------------------
// Predicate application
// ---------------------------------------------------------------------------

/// Apply `criteria` to `table`.
///
/// Predicates run in a fixed order: role, team, convenience mode, convenience
/// range, potential-convenience range. A predicate whose column is missing
/// from the table, or whose parameter is empty, passes every row. Surviving
/// rows keep their input order.
pub fn apply(table: &Table, criteria: &FilterCriteria, columns: &ColumnNames) -> Table {
    let mut keep: Vec<usize> = (0..table.len()).collect();

    if !criteria.roles.is_empty() && table.has_columns(&[columns.role.as_str()]) {
        keep.retain(|&i| criteria.roles.contains(&table.rows[i].label(&columns.role)));
    }

    if !criteria.teams.is_empty() && table.has_columns(&[columns.team.as_str()]) {
        keep.retain(|&i| criteria.teams.contains(&table.rows[i].label(&columns.team)));
    }

    if table.has_columns(&[columns.convenience.as_str()]) {
        keep = select_by_mode(table, keep, criteria.convenience_mode, &columns.convenience);
    }

    for (range, column) in [
        (criteria.convenience_range, &columns.convenience),
        (criteria.potential_range, &columns.potential_convenience),
    ] {
        let Some(range) = range else { continue };
        if !table.has_columns(&[column.as_str()]) {
            continue;
        }
        keep.retain(|&i| {
            table.rows[i]
                .number(column)
                .is_some_and(|v| range.contains(v))
        });
    }

    table.subset(keep)
}

fn select_by_mode(table: &Table, keep: Vec<usize>, mode: ConvenienceMode, column: &str) -> Vec<usize> {
    match mode {
        ConvenienceMode::All => keep,
        ConvenienceMode::Top50 => largest_in_order(table, keep, column, 50),
        ConvenienceMode::Top100 => largest_in_order(table, keep, column, 100),
        ConvenienceMode::AboveAverage => {
            let values: Vec<f64> = keep
                .iter()
                .filter_map(|&i| table.rows[i].number(column))
                .collect();
            if values.is_empty() {
                return Vec::new();
            }
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            keep.into_iter()
                .filter(|&i| table.rows[i].number(column).is_some_and(|v| v > mean))
                .collect()
        }
    }
}

/// The `n` rows with the largest numeric `column`, ties by position, returned
/// in their original order.
fn largest_in_order(table: &Table, keep: Vec<usize>, column: &str, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = keep
        .into_iter()
        .filter_map(|i| table.rows[i].number(column).map(|v| (i, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);

    let mut chosen: Vec<usize> = ranked.into_iter().map(|(i, _)| i).collect();
    chosen.sort_unstable();
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, PlayerRecord};

    fn player(name: &str, role: &str, team: &str, conv: f64) -> PlayerRecord {
        PlayerRecord::new()
            .with("Nome", name)
            .with("Ruolo", role)
            .with("Squadra", team)
            .with("Convenienza", conv)
    }

    fn names(table: &Table) -> Vec<String> {
        table.rows.iter().map(|r| r.label("Nome")).collect()
    }

    fn sample() -> Table {
        Table::from_records(vec![
            player("A", "D", "Inter", 80.0),
            player("B", "D", "Milan", 40.0),
            player("C", "A", "Inter", 60.0),
            player("D", "C", "Roma", 20.0),
        ])
    }

    #[test]
    fn default_criteria_is_identity() {
        let table = sample();
        let out = apply(&table, &FilterCriteria::default(), &ColumnNames::default());
        assert_eq!(out, table);
    }

    #[test]
    fn roles_and_teams_intersect() {
        let criteria = FilterCriteria {
            roles: ["D".to_string()].into(),
            teams: ["Inter".to_string()].into(),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &ColumnNames::default());
        assert_eq!(names(&out), vec!["A"]);
    }

    #[test]
    fn above_average_is_strict() {
        let table = Table::from_records(vec![
            player("A", "D", "X", 80.0),
            player("B", "D", "X", 40.0),
            player("C", "A", "X", 60.0),
        ]);
        let criteria = FilterCriteria {
            convenience_mode: ConvenienceMode::AboveAverage,
            ..Default::default()
        };
        let out = apply(&table, &criteria, &ColumnNames::default());
        assert_eq!(names(&out), vec!["A"]);
    }

    #[test]
    fn above_average_uses_rows_filtered_so_far() {
        // Defenders only: mean of 80 and 40 is 60, so only A survives.
        let criteria = FilterCriteria {
            roles: ["D".to_string()].into(),
            convenience_mode: ConvenienceMode::AboveAverage,
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &ColumnNames::default());
        assert_eq!(names(&out), vec!["A"]);
    }

    #[test]
    fn top50_keeps_input_order_and_breaks_ties_by_position() {
        let mut rows: Vec<PlayerRecord> = (0..60)
            .map(|i| player(&format!("P{i}"), "C", "X", i as f64))
            .collect();
        // P10 and Late10 tie at the cut; the earlier row wins.
        rows.push(player("Late10", "C", "X", 10.0));
        let table = Table::from_records(rows);
        let criteria = FilterCriteria {
            convenience_mode: ConvenienceMode::Top50,
            ..Default::default()
        };
        let out = apply(&table, &criteria, &ColumnNames::default());
        let got = names(&out);
        assert_eq!(got.len(), 50);
        assert_eq!(got.first().map(String::as_str), Some("P10"));
        assert!(!got.contains(&"Late10".to_string()));
        assert_eq!(got.last().map(String::as_str), Some("P59"));
    }

    #[test]
    fn top100_on_small_table_keeps_everything_numeric() {
        let mut table = sample();
        table.rows.push(PlayerRecord::new().with("Nome", "E").with("Convenienza", "n/a"));
        let table = Table::from_records(table.rows);
        let criteria = FilterCriteria {
            convenience_mode: ConvenienceMode::Top100,
            ..Default::default()
        };
        let out = apply(&table, &criteria, &ColumnNames::default());
        assert_eq!(names(&out), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn range_is_inclusive_and_drops_nulls() {
        let mut rows = sample().rows;
        rows.push(PlayerRecord::new().with("Nome", "E").with("Convenienza", CellValue::Null));
        let table = Table::from_records(rows);
        let criteria = FilterCriteria {
            convenience_range: Some(NumericRange::new(40.0, 60.0)),
            ..Default::default()
        };
        let out = apply(&table, &criteria, &ColumnNames::default());
        assert_eq!(names(&out), vec!["B", "C"]);
    }

    #[test]
    fn predicates_on_missing_columns_pass_through() {
        let table = Table::from_records(vec![
            PlayerRecord::new().with("Nome", "A").with("Gol", 3i64),
            PlayerRecord::new().with("Nome", "B").with("Gol", 1i64),
        ]);
        let criteria = FilterCriteria {
            roles: ["D".to_string()].into(),
            teams: ["Inter".to_string()].into(),
            convenience_mode: ConvenienceMode::AboveAverage,
            convenience_range: Some(NumericRange::new(0.0, 1.0)),
            potential_range: Some(NumericRange::new(0.0, 1.0)),
        };
        let out = apply(&table, &criteria, &ColumnNames::default());
        assert_eq!(out, table);
    }

    #[test]
    fn potential_range_applies_after_convenience() {
        let table = Table::from_records(vec![
            player("A", "D", "X", 80.0).with("Convenienza Potenziale", 90.0),
            player("B", "D", "X", 70.0).with("Convenienza Potenziale", 10.0),
            player("C", "D", "X", 10.0).with("Convenienza Potenziale", 95.0),
        ]);
        let criteria = FilterCriteria {
            convenience_range: Some(NumericRange::new(50.0, 100.0)),
            potential_range: Some(NumericRange::new(50.0, 100.0)),
            ..Default::default()
        };
        let out = apply(&table, &criteria, &ColumnNames::default());
        assert_eq!(names(&out), vec!["A"]);
    }

    #[test]
    fn empty_table_stays_empty() {
        let criteria = FilterCriteria {
            convenience_mode: ConvenienceMode::Top50,
            ..Default::default()
        };
        let out = apply(&Table::default(), &criteria, &ColumnNames::default());
        assert!(out.is_empty());
    }
}
