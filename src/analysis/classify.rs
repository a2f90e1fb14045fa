use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ranking::median;
use crate::config::ColumnNames;
use crate::data::model::{PlayerRecord, Table};

// ---------------------------------------------------------------------------
// Quick-stat cohorts
// ---------------------------------------------------------------------------

/// Result of a quick-stat card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickStat {
    Player(String),
    /// Defined, but nothing qualifies (or the data lacks the columns).
    NotAvailable,
    /// No formula is defined for this card.
    NotImplemented,
}

impl QuickStat {
    pub fn from_record(record: Option<&PlayerRecord>, name_column: &str) -> Self {
        match record {
            Some(r) => QuickStat::Player(r.label(name_column)),
            None => QuickStat::NotAvailable,
        }
    }
}

/// Row with the highest convenience; the first one on ties.
pub fn best_value<'a>(table: &'a Table, columns: &ColumnNames) -> Option<&'a PlayerRecord> {
    if !table.has_columns(&[columns.convenience.as_str()]) {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in table.numeric_cells(&columns.convenience) {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| &table.rows[i])
}

/// High potential, low current convenience.
///
/// Scans the top `pool` rows by potential convenience (highest first) and
/// returns the first one that also sits in the bottom half of the table by
/// convenience.
pub fn hidden_gem<'a>(
    table: &'a Table,
    columns: &ColumnNames,
    pool: usize,
) -> Option<&'a PlayerRecord> {
    let conv = columns.convenience.as_str();
    let pot = columns.potential_convenience.as_str();
    if !table.has_columns(&[conv, pot]) {
        return None;
    }

    let mut by_potential = table.numeric_cells(pot);
    by_potential.sort_by(|a, b| b.1.total_cmp(&a.1));
    by_potential.truncate(pool);

    let mut by_convenience = table.numeric_cells(conv);
    by_convenience.sort_by(|a, b| a.1.total_cmp(&b.1));
    by_convenience.truncate(table.len() / 2);
    let bottom_half: HashSet<usize> = by_convenience.into_iter().map(|(i, _)| i).collect();

    by_potential
        .into_iter()
        .find(|(i, _)| bottom_half.contains(i))
        .map(|(i, _)| &table.rows[i])
}

/// "Trending up" has no agreed formula yet.
pub fn trending_up(_table: &Table) -> QuickStat {
    QuickStat::NotImplemented
}

/// "Most consistent" has no agreed formula yet.
pub fn most_consistent(_table: &Table) -> QuickStat {
    QuickStat::NotImplemented
}

// ---------------------------------------------------------------------------
// Quadrant classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// High X, high Y.
    Stars,
    /// Low X, high Y.
    HiddenGems,
    /// High X, low Y.
    Potential,
    /// Low X, low Y.
    Risky,
}

impl Quadrant {
    pub fn classify(x: f64, y: f64, x_median: f64, y_median: f64) -> Self {
        match (x >= x_median, y >= y_median) {
            (true, true) => Quadrant::Stars,
            (false, true) => Quadrant::HiddenGems,
            (true, false) => Quadrant::Potential,
            (false, false) => Quadrant::Risky,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Quadrant::Stars => "Stars",
            Quadrant::HiddenGems => "Hidden Gems",
            Quadrant::Potential => "Potential",
            Quadrant::Risky => "Risky",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    /// Index of the row in the classified table.
    pub row: usize,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub quadrant: Quadrant,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadrantSplit {
    pub x_median: f64,
    pub y_median: f64,
    pub points: Vec<ScatterPoint>,
}

/// Label every row whose `x` and `y` are both numeric by its quadrant around
/// the medians of the plotted rows. Values equal to a median count as high.
pub fn classify_quadrants(table: &Table, x: &str, y: &str, label: &str) -> QuadrantSplit {
    if !table.has_columns(&[x, y]) {
        return QuadrantSplit::default();
    }
    let plotted: Vec<(usize, f64, f64)> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| Some((i, row.number(x)?, row.number(y)?)))
        .collect();
    if plotted.is_empty() {
        return QuadrantSplit::default();
    }

    let xs: Vec<f64> = plotted.iter().map(|p| p.1).collect();
    let ys: Vec<f64> = plotted.iter().map(|p| p.2).collect();
    let x_median = median(&xs);
    let y_median = median(&ys);

    let points = plotted
        .into_iter()
        .map(|(i, xv, yv)| ScatterPoint {
            row: i,
            label: table.rows[i].label(label),
            x: xv,
            y: yv,
            quadrant: Quadrant::classify(xv, yv, x_median, y_median),
        })
        .collect();

    QuadrantSplit {
        x_median,
        y_median,
        points,
    }
}

pub fn quadrant_counts(points: &[ScatterPoint]) -> BTreeMap<Quadrant, usize> {
    let mut counts = BTreeMap::new();
    for p in points {
        *counts.entry(p.quadrant).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn player(name: &str, conv: f64, pot: f64) -> PlayerRecord {
        PlayerRecord::new()
            .with("Nome", name)
            .with("Convenienza", conv)
            .with("Convenienza Potenziale", pot)
    }

    #[test]
    fn best_value_first_on_ties() {
        let table = Table::from_records(vec![
            player("A", 50.0, 0.0),
            player("B", 90.0, 0.0),
            player("C", 90.0, 0.0),
            PlayerRecord::new().with("Nome", "D").with("Convenienza", "99 points"),
        ]);
        let best = best_value(&table, &ColumnNames::default()).unwrap();
        assert_eq!(best.label("Nome"), "B");
    }

    #[test]
    fn best_value_none_without_column() {
        let table = Table::from_records(vec![PlayerRecord::new().with("Nome", "A")]);
        assert!(best_value(&table, &ColumnNames::default()).is_none());
        assert!(best_value(&Table::default(), &ColumnNames::default()).is_none());
    }

    #[test]
    fn hidden_gem_high_potential_low_convenience() {
        let table = Table::from_records(vec![
            player("Star", 95.0, 99.0),
            player("Gem", 10.0, 90.0),
            player("Meh", 20.0, 5.0),
            player("Solid", 80.0, 70.0),
        ]);
        let gem = hidden_gem(&table, &ColumnNames::default(), 20).unwrap();
        assert_eq!(gem.label("Nome"), "Gem");
    }

    #[test]
    fn hidden_gem_pool_limits_search() {
        let table = Table::from_records(vec![
            player("Star", 95.0, 99.0),
            player("Gem", 10.0, 90.0),
            player("Meh", 20.0, 5.0),
            player("Solid", 80.0, 70.0),
        ]);
        assert!(hidden_gem(&table, &ColumnNames::default(), 1).is_none());
    }

    #[test]
    fn hidden_gem_none_when_no_intersection() {
        let table = Table::from_records(vec![
            player("A", 90.0, 90.0),
            player("B", 10.0, 10.0),
        ]);
        assert!(hidden_gem(&table, &ColumnNames::default(), 1).is_none());
        let no_pot = Table::from_records(vec![PlayerRecord::new().with("Convenienza", 1.0)]);
        assert!(hidden_gem(&no_pot, &ColumnNames::default(), 20).is_none());
    }

    #[test]
    fn placeholders_are_not_implemented() {
        assert_eq!(trending_up(&Table::default()), QuickStat::NotImplemented);
        assert_eq!(most_consistent(&Table::default()), QuickStat::NotImplemented);
    }

    #[test]
    fn quadrants_around_medians_ties_high() {
        let table = Table::from_records(vec![
            PlayerRecord::new().with("Nome", "hh").with("x", 10.0).with("y", 10.0),
            PlayerRecord::new().with("Nome", "lh").with("x", 1.0).with("y", 9.0),
            PlayerRecord::new().with("Nome", "hl").with("x", 9.0).with("y", 1.0),
            PlayerRecord::new().with("Nome", "ll").with("x", 2.0).with("y", 2.0),
            PlayerRecord::new().with("Nome", "med").with("x", 5.0).with("y", 5.0),
            PlayerRecord::new().with("Nome", "skip").with("x", CellValue::Null).with("y", 3.0),
        ]);
        let split = classify_quadrants(&table, "x", "y", "Nome");
        assert_eq!(split.x_median, 5.0);
        assert_eq!(split.y_median, 5.0);
        let got: Vec<(&str, Quadrant)> = split
            .points
            .iter()
            .map(|p| (p.label.as_str(), p.quadrant))
            .collect();
        assert_eq!(
            got,
            vec![
                ("hh", Quadrant::Stars),
                ("lh", Quadrant::HiddenGems),
                ("hl", Quadrant::Potential),
                ("ll", Quadrant::Risky),
                ("med", Quadrant::Stars),
            ]
        );
        let counts = quadrant_counts(&split.points);
        assert_eq!(counts.get(&Quadrant::Stars), Some(&2));
        assert_eq!(counts.values().sum::<usize>(), 5);
    }

    #[test]
    fn quadrants_empty_without_columns() {
        let split = classify_quadrants(&Table::default(), "x", "y", "Nome");
        assert!(split.points.is_empty());
    }
}
