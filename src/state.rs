use std::collections::BTreeMap;
use std::sync::Arc;

use fanta_dash::analysis::classify::{self, Quadrant, QuadrantSplit};
use fanta_dash::analysis::distribution::{self, CategoryMean, DistributionEntry};
use fanta_dash::analysis::merge::{self, PlayerOverlap};
use fanta_dash::analysis::ranking::{self, StatSummary};
use fanta_dash::analysis::summary::{self, Insights, OverviewMetrics, PlayerProfile, QuickStats, Season};
use fanta_dash::config::DashboardConfig;
use fanta_dash::data::filter::{self, FilterCriteria};
use fanta_dash::data::model::Table;
use fanta_dash::store::{DatasetStore, Source};

use crate::color::CategoryColors;

/// Metrics offered for the comparison profile, when present.
pub const PROFILE_METRICS: [&str; 3] = ["Convenienza", "Punteggio", "Convenienza Potenziale"];

/// Fewer profile metrics than this is not worth comparing.
pub const MIN_PROFILE_METRICS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Players,
    Comparison,
}

// ---------------------------------------------------------------------------
// Derived view data
// ---------------------------------------------------------------------------

/// Everything the Overview page shows for one source.
#[derive(Debug, Clone, Default)]
pub struct OverviewView {
    pub metrics: OverviewMetrics,
    pub roles: Vec<DistributionEntry>,
    pub teams: Vec<DistributionEntry>,
    pub convenience: StatSummary,
    pub top_players: Table,
}

/// The Players page: option lists, filtered table and its cards.
#[derive(Debug, Clone, Default)]
pub struct PlayersView {
    pub role_options: Vec<String>,
    pub team_options: Vec<String>,
    pub filtered: Table,
    pub metrics: OverviewMetrics,
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonView {
    pub quick_stats: QuickStats,
    pub player_names: Vec<String>,
    pub profile_metrics: Vec<String>,
    pub profiles: Vec<PlayerProfile>,
    pub metric_options: Vec<String>,
    pub quadrants: QuadrantSplit,
    pub quadrant_counts: BTreeMap<Quadrant, usize>,
    pub team_means: Vec<CategoryMean>,
    pub role_breakdown: Vec<DistributionEntry>,
    pub opportunities: Table,
    pub insights: Insights,
    pub overlap: Option<PlayerOverlap>,
    pub merged_rows: usize,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub store: Arc<DatasetStore>,
    pub page: Page,

    /// Source shown on the Overview and Players pages.
    pub source: Source,
    /// Players page filters.
    pub criteria: FilterCriteria,
    /// Players table ordering: `(column, descending)`.
    pub players_sort: Option<(String, bool)>,

    /// Comparison page controls.
    pub role_focus: Option<String>,
    pub season: Season,
    pub compare: [Option<String>; 2],
    pub x_metric: String,
    pub y_metric: String,
    pub top50_only: bool,

    pub overview: OverviewView,
    pub players: PlayersView,
    pub comparison: ComparisonView,
    pub role_colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let store = Arc::new(DatasetStore::from_config(&config));
        let x_metric = config.columns.potential_convenience.clone();
        let y_metric = config.columns.convenience.clone();
        let mut state = Self {
            config,
            store,
            page: Page::Overview,
            source: Source::Current,
            criteria: FilterCriteria::default(),
            players_sort: None,
            role_focus: None,
            season: Season::Both,
            compare: [None, None],
            x_metric,
            y_metric,
            top50_only: false,
            overview: OverviewView::default(),
            players: PlayersView::default(),
            comparison: ComparisonView::default(),
            role_colors: CategoryColors::default(),
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Re-read both files on the next access and recompute every view.
    pub fn reload(&mut self) {
        self.store.invalidate();
        self.refresh();
        self.status_message = Some("Data refreshed".to_string());
    }

    /// Point the store at another data directory.
    pub fn set_data_dir(&mut self, dir: std::path::PathBuf) {
        log::info!("Switching data directory to {}", dir.display());
        self.config.data_dir = dir;
        self.store = Arc::new(DatasetStore::from_config(&self.config));
        self.criteria = FilterCriteria::default();
        self.players_sort = None;
        self.compare = [None, None];
        self.refresh();
    }

    /// Show another season on the Overview and Players pages. Role and team
    /// selections belong to the old season, so the filters start over.
    pub fn select_source(&mut self, source: Source) {
        self.source = source;
        self.criteria = FilterCriteria::default();
        self.refresh_overview();
        self.refresh_players();
    }

    /// Sort the Players table by `column`; clicking the same column again
    /// flips the direction.
    pub fn toggle_players_sort(&mut self, column: &str) {
        self.players_sort = match self.players_sort.take() {
            Some((current, descending)) if current == column => Some((current, !descending)),
            _ => Some((column.to_string(), true)),
        };
        self.refresh_players();
    }

    /// Recompute all derived views from the cached tables.
    pub fn refresh(&mut self) {
        self.refresh_overview();
        self.refresh_players();
        self.refresh_comparison();
    }

    pub fn refresh_overview(&mut self) {
        let cols = &self.config.columns;
        let table = self.store.load(self.source);

        let mut teams = distribution::team_distribution(&table, cols);
        teams.truncate(self.config.display.top_teams);

        self.overview = OverviewView {
            metrics: summary::overview_metrics(&table, cols),
            roles: distribution::role_distribution(&table, cols),
            teams,
            convenience: ranking::stat_summary(&table, &cols.convenience),
            top_players: ranking::top_n(&table, &cols.convenience, self.config.display.top_players),
        };
    }

    pub fn refresh_players(&mut self) {
        let cols = &self.config.columns;
        let table = self.store.load(self.source);
        let mut filtered = filter::apply(&table, &self.criteria, cols);
        if let Some((column, descending)) = &self.players_sort {
            filtered = ranking::sort_by_column(&filtered, column, *descending);
        }
        let role_options = table.distinct_labels(&cols.role);
        self.role_colors = CategoryColors::new(&role_options);

        self.players = PlayersView {
            team_options: table.distinct_labels(&cols.team),
            role_options,
            metrics: summary::overview_metrics(&filtered, cols),
            filtered,
        };
        if self.players.filtered.is_empty() && !table.is_empty() {
            log::debug!("No players match {:?}", self.criteria);
        }
    }

    pub fn refresh_comparison(&mut self) {
        let cols = &self.config.columns;
        let (current, previous) = self.store.load_both();
        let focus = self.role_focus.as_deref();

        // Current season is the primary dataset; previous covers for it when empty.
        let primary = if current.is_empty() { &previous } else { &current };
        let criteria = FilterCriteria {
            roles: focus.map(|r| [r.to_string()].into()).unwrap_or_default(),
            convenience_mode: if self.top50_only {
                filter::ConvenienceMode::Top50
            } else {
                filter::ConvenienceMode::All
            },
            ..Default::default()
        };
        let analysed = filter::apply(primary, &criteria, cols);

        let profile_metrics = summary::available_metrics(&current, &PROFILE_METRICS);
        let profiles = self
            .compare
            .iter()
            .flatten()
            .filter_map(|name| {
                summary::find_in_season(&current, &previous, self.season, &cols.name, name)
            })
            .map(|record| summary::player_profile(record, &cols.name, &profile_metrics))
            .collect();

        let quadrants = classify::classify_quadrants(&analysed, &self.x_metric, &self.y_metric, &cols.name);
        let quadrant_counts = classify::quadrant_counts(&quadrants.points);

        let merged = merge::merge_on_identity(
            &current,
            &previous,
            &cols.name,
            &self.config.merge.left_suffix,
            &self.config.merge.right_suffix,
        );

        self.comparison = ComparisonView {
            quick_stats: summary::comparison_quick_stats(
                &current,
                focus,
                cols,
                self.config.analysis.hidden_gem_pool,
            ),
            player_names: summary::player_names(&current, &previous, cols, focus),
            profile_metrics,
            profiles,
            metric_options: numeric_columns(&analysed),
            quadrants,
            quadrant_counts,
            team_means: distribution::top_categories_by_mean(
                &analysed,
                &cols.team,
                &cols.convenience,
                self.config.display.top_teams,
            ),
            role_breakdown: distribution::role_distribution(&analysed, cols),
            opportunities: ranking::top_n(&analysed, &cols.convenience, self.config.display.top_players),
            insights: summary::insights(&analysed, cols),
            overlap: merge::player_overlap(&current, &previous, &cols.name),
            merged_rows: merged.len(),
        };
    }
}

/// Columns with at least one numeric value, for the metric pickers.
fn numeric_columns(table: &Table) -> Vec<String> {
    table
        .column_names
        .iter()
        .filter(|c| !ranking::numeric_values(table, c).is_empty())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanta_dash::data::filter::ConvenienceMode;

    fn state_with_data() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("current.csv"),
            "Nome,Ruolo,Squadra,Convenienza\nA,D,Inter,10\nB,C,Milan,30\nC,D,Roma,20\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("previous.csv"),
            "Nome,Ruolo,Squadra,Convenienza\nA,P,Inter,5\nD,A,Lazio,15\n",
        )
        .unwrap();
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            current_file: "current.csv".to_string(),
            ..Default::default()
        };
        (dir, AppState::new(config))
    }

    fn player_names(state: &AppState) -> Vec<String> {
        state.players.filtered.rows.iter().map(|r| r.label("Nome")).collect()
    }

    #[test]
    fn switching_source_resets_filters() {
        let (_dir, mut state) = state_with_data();
        state.criteria.roles = ["D".to_string()].into();
        state.criteria.convenience_mode = ConvenienceMode::Top50;
        state.refresh_players();
        assert_eq!(player_names(&state), vec!["A", "C"]);

        state.select_source(Source::Previous);
        assert_eq!(state.criteria, FilterCriteria::default());
        assert_eq!(player_names(&state), vec!["A", "D"]);
        assert_eq!(state.overview.metrics.total_players, 2);
    }

    #[test]
    fn players_sort_toggles_direction() {
        let (_dir, mut state) = state_with_data();
        assert_eq!(player_names(&state), vec!["A", "B", "C"]);

        state.toggle_players_sort("Convenienza");
        assert_eq!(player_names(&state), vec!["B", "C", "A"]);
        state.toggle_players_sort("Convenienza");
        assert_eq!(player_names(&state), vec!["A", "C", "B"]);

        state.toggle_players_sort("Nome");
        assert_eq!(state.players_sort, Some(("Nome".to_string(), true)));
        assert_eq!(player_names(&state), vec!["C", "B", "A"]);
    }
}
