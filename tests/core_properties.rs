//! End-to-end checks of the analysis pipeline against the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fanta_dash::analysis::classify::{self, Quadrant};
use fanta_dash::analysis::distribution;
use fanta_dash::analysis::merge;
use fanta_dash::analysis::ranking;
use fanta_dash::analysis::summary;
use fanta_dash::config::{ColumnNames, DashboardConfig};
use fanta_dash::data::filter::{self, ConvenienceMode, FilterCriteria, NumericRange};
use fanta_dash::data::loader::{self, LoadError};
use fanta_dash::data::model::{CellValue, PlayerRecord, Table};
use fanta_dash::store::{DatasetStore, Source, TableLoader};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn player(name: &str, role: &str, team: &str, conv: impl Into<CellValue>, pot: f64) -> PlayerRecord {
    PlayerRecord::new()
        .with("Nome", name)
        .with("Ruolo", role)
        .with("Squadra", team)
        .with("Convenienza", conv)
        .with("Convenienza Potenziale", pot)
}

fn squad() -> Table {
    Table::from_records(vec![
        player("Sommer", "P", "Inter", 55.0, 40.0),
        player("Di Lorenzo", "D", "Napoli", 62.0, 58.0),
        player("Bastoni", "D", "Inter", 71.0, 66.0),
        player("Barella", "C", "Inter", 68.0, 72.0),
        player("Kone", "C", "Roma", 18.0, 85.0),
        player("Lautaro", "A", "Inter", 92.0, 90.0),
        player("Retegui", "A", "Atalanta", 80.0, 75.0),
        player("Unknown", "A", "Como", CellValue::Null, 30.0),
    ])
}

fn names(table: &Table) -> Vec<String> {
    table.rows.iter().map(|r| r.label("Nome")).collect()
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn empty_criteria_return_the_input() {
    let table = squad();
    let out = filter::apply(&table, &FilterCriteria::default(), &ColumnNames::default());
    assert_eq!(out, table);
}

#[test]
fn above_average_keeps_strictly_greater_in_input_order() {
    let table = Table::from_records(vec![
        player("A", "A", "X", 80.0, 0.0),
        player("B", "A", "X", 40.0, 0.0),
        player("C", "A", "X", 60.0, 0.0),
    ]);
    let criteria = FilterCriteria {
        convenience_mode: ConvenienceMode::AboveAverage,
        ..Default::default()
    };
    let out = filter::apply(&table, &criteria, &ColumnNames::default());
    assert_eq!(names(&out), vec!["A"]);
}

#[test]
fn filters_compose_and_output_is_a_subsequence() {
    let table = squad();
    let criteria = FilterCriteria {
        teams: ["Inter".to_string()].into(),
        convenience_range: Some(NumericRange::new(60.0, 100.0)),
        potential_range: Some(NumericRange::new(65.0, 100.0)),
        ..Default::default()
    };
    let out = filter::apply(&table, &criteria, &ColumnNames::default());
    assert_eq!(names(&out), vec!["Bastoni", "Barella", "Lautaro"]);

    let mut cursor = table.rows.iter();
    for row in &out.rows {
        assert!(cursor.any(|r| r == row), "output rows must keep input order");
    }
}

#[test]
fn filter_is_idempotent() {
    let cols = ColumnNames::default();
    let criteria = FilterCriteria {
        roles: ["A".to_string(), "C".to_string()].into(),
        convenience_mode: ConvenienceMode::Top50,
        ..Default::default()
    };
    let once = filter::apply(&squad(), &criteria, &cols);
    let twice = filter::apply(&once, &criteria, &cols);
    assert_eq!(once, twice);
    assert!(!names(&once).contains(&"Unknown".to_string()));
}

// ---------------------------------------------------------------------------
// Ranking and statistics
// ---------------------------------------------------------------------------

#[test]
fn top_n_bounds_and_order() {
    let table = squad();
    for n in [0, 1, 3, 7, 50] {
        let top = ranking::top_n(&table, "Convenienza", n);
        assert!(top.len() <= n.min(table.len()));
        let values: Vec<f64> = top.rows.iter().filter_map(|r| r.number("Convenienza")).collect();
        assert!(values.windows(2).all(|w| w[0] >= w[1]));

        let kept = names(&top);
        let excluded_max = table
            .rows
            .iter()
            .filter(|r| !kept.contains(&r.label("Nome")))
            .filter_map(|r| r.number("Convenienza"))
            .fold(f64::NEG_INFINITY, f64::max);
        let kept_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(kept_min >= excluded_max, "n = {n}");

        assert_eq!(ranking::top_n(&top, "Convenienza", n), top);
    }
    assert_eq!(names(&ranking::top_n(&table, "Convenienza", 2)), vec!["Lautaro", "Retegui"]);
    assert!(ranking::top_n(&table, "Missing", 5).is_empty());
}

#[test]
fn stat_summary_matches_linear_percentiles() {
    let table = Table::from_records(
        [10.0, 20.0, 30.0, 40.0]
            .into_iter()
            .map(|v| PlayerRecord::new().with("v", v))
            .collect(),
    );
    let s = ranking::stat_summary(&table, "v");
    assert_eq!(s.count, 4);
    assert_eq!(s.mean, 25.0);
    assert_eq!(s.median, 25.0);
    assert_eq!(s.min, 10.0);
    assert_eq!(s.max, 40.0);
    assert_eq!(s.p25, 17.5);
    assert_eq!(s.p75, 32.5);
}

#[test]
fn distribution_counts_sum_to_row_count() {
    let mut rows = squad().rows;
    rows.push(PlayerRecord::new().with("Nome", "Roleless"));
    let table = Table::from_records(rows);
    let dist = distribution::distribution(&table, "Ruolo");
    assert_eq!(dist.iter().map(|e| e.count).sum::<usize>(), table.len());
    assert_eq!(dist[0].category, "A");
    assert_eq!(dist[0].count, 3);
}

// ---------------------------------------------------------------------------
// Merge and classification
// ---------------------------------------------------------------------------

#[test]
fn merge_row_count_is_sum_of_key_products() {
    let left = Table::from_records(vec![
        PlayerRecord::new().with("Nome", "X").with("a", 1i64),
        PlayerRecord::new().with("Nome", "X").with("a", 2i64),
        PlayerRecord::new().with("Nome", "Y").with("a", 3i64),
        PlayerRecord::new().with("Nome", "Z").with("a", 4i64),
    ]);
    let right = Table::from_records(vec![
        PlayerRecord::new().with("Nome", "X").with("a", 10i64),
        PlayerRecord::new().with("Nome", "X").with("a", 20i64),
        PlayerRecord::new().with("Nome", "X").with("a", 30i64),
        PlayerRecord::new().with("Nome", "Y").with("a", 40i64),
    ]);
    let merged = merge::merge_on_identity(&left, &right, "Nome", "_current", "_previous");
    // X: 2 * 3, Y: 1 * 1, Z: 1 * 0.
    assert_eq!(merged.len(), 7);
    assert!(merged.has_columns(&["a_current", "a_previous"]));
}

#[test]
fn comparison_page_aggregates() {
    let table = squad();
    let cols = ColumnNames::default();

    let stats = summary::comparison_quick_stats(&table, None, &cols, 20);
    assert_eq!(stats.best_value, classify::QuickStat::Player("Lautaro".into()));
    assert_eq!(stats.hidden_gem, classify::QuickStat::Player("Kone".into()));

    let split = classify::classify_quadrants(&table, "Convenienza Potenziale", "Convenienza", "Nome");
    assert_eq!(split.points.len(), 7);
    let kone = split.points.iter().find(|p| p.label == "Kone").unwrap();
    assert_eq!(kone.quadrant, Quadrant::Potential);
    let counts = classify::quadrant_counts(&split.points);
    assert_eq!(counts.values().sum::<usize>(), 7);
}

// ---------------------------------------------------------------------------
// Loading and the store
// ---------------------------------------------------------------------------

#[test]
fn csv_on_disk_feeds_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("previous.csv");
    std::fs::write(
        &path,
        "Nome,Ruolo,Squadra,Convenienza\n\
         Rossi,D,\"{'id': 1, 'name': 'Inter'}\",50\n\
         Verdi,A,\"{'id': 2, 'name': 'Milan'}\",\n",
    )
    .unwrap();

    let table = loader::load_file(&path, &ColumnNames::default()).unwrap();
    assert_eq!(table.distinct_labels("Squadra"), vec!["Inter", "Milan"]);
    let metrics = summary::overview_metrics(&table, &ColumnNames::default());
    assert_eq!(metrics.total_players, 2);
    assert_eq!(metrics.avg_convenience, Some(50.0));
}

struct CountingLoader(Arc<AtomicUsize>);

impl TableLoader for CountingLoader {
    fn load(&self, _source: Source) -> Result<Table, LoadError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(squad())
    }
}

#[test]
fn invalidate_then_reload_calls_loader_again() {
    let calls = Arc::new(AtomicUsize::new(0));
    let store = DatasetStore::new(CountingLoader(Arc::clone(&calls)));

    store.load(Source::Current);
    store.load(Source::Current);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    store.invalidate();
    let table = store.load(Source::Current);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(table.len(), 8);
}

#[test]
fn default_config_points_at_expected_files() {
    let config = DashboardConfig::default();
    assert!(config.current_path().ends_with("current.parquet"));
    assert!(config.previous_path().ends_with("previous.csv"));
}
