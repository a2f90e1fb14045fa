use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use fanta_dash::analysis::classify::{Quadrant, QuickStat};
use fanta_dash::analysis::distribution::DistributionEntry;
use fanta_dash::analysis::ranking::StatSummary;
use fanta_dash::analysis::summary::OverviewMetrics;
use fanta_dash::data::model::{CellValue, Table};

use crate::color::{quadrant_color, CategoryColors};
use crate::state::{AppState, MIN_PROFILE_METRICS};

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn fmt_num(v: f64, decimals: usize) -> String {
    format!("{v:.decimals$}")
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| fmt_num(v, decimals))
}

fn fmt_cell(v: &CellValue, decimals: usize) -> String {
    match v {
        CellValue::Float(f) => fmt_num(*f, decimals),
        other => other.to_string(),
    }
}

fn quick_stat_text(stat: &QuickStat) -> &str {
    match stat {
        QuickStat::Player(name) => name,
        QuickStat::NotAvailable | QuickStat::NotImplemented => "N/A",
    }
}

fn empty_notice(ui: &mut Ui, what: &str) {
    ui.label(RichText::new(format!("No {what} available")).italics().weak());
}

// ---------------------------------------------------------------------------
// Reusable widgets
// ---------------------------------------------------------------------------

fn metric_card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(150.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(title).small().weak());
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

fn metric_cards(ui: &mut Ui, metrics: &OverviewMetrics, decimals: usize) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        metric_card(ui, "Total Players", &metrics.total_players.to_string());
        metric_card(ui, "Avg Convenience", &fmt_opt(metrics.avg_convenience, decimals));
        metric_card(ui, "Top Convenience", &fmt_opt(metrics.top_convenience, decimals));
        metric_card(ui, "Teams Covered", &metrics.teams_covered.to_string());
    });
}

fn distribution_grid(ui: &mut Ui, id: &str, entries: &[DistributionEntry], colors: Option<&CategoryColors>) {
    if entries.is_empty() {
        empty_notice(ui, "data");
        return;
    }
    let total: usize = entries.iter().map(|e| e.count).sum();
    egui::Grid::new(id).striped(true).num_columns(3).show(ui, |ui: &mut Ui| {
        for e in entries {
            let mut label = RichText::new(&e.category);
            if let Some(c) = colors {
                label = label.color(c.color_for(&e.category));
            }
            ui.label(label);
            ui.label(e.count.to_string());
            ui.add(
                egui::ProgressBar::new(e.count as f32 / total as f32)
                    .desired_width(160.0)
                    .show_percentage(),
            );
            ui.end_row();
        }
    });
}

fn summary_grid(ui: &mut Ui, summary: &StatSummary, decimals: usize) {
    if summary.is_empty() {
        empty_notice(ui, "convenience values");
        return;
    }
    egui::Grid::new("convenience_summary").num_columns(2).show(ui, |ui: &mut Ui| {
        for (name, value) in [
            ("Mean", summary.mean),
            ("Median", summary.median),
            ("Std. dev.", summary.std_dev),
            ("Min", summary.min),
            ("25%", summary.p25),
            ("75%", summary.p75),
            ("Max", summary.max),
        ] {
            ui.label(name);
            ui.monospace(fmt_num(value, decimals));
            ui.end_row();
        }
    });
}

/// Column order for player tables: the configured identity and score
/// columns first, then everything else the table carries.
fn display_columns(table: &Table, state: &AppState) -> Vec<String> {
    let cols = &state.config.columns;
    let preferred = [
        &cols.name,
        &cols.role,
        &cols.team,
        &cols.convenience,
        &cols.potential_convenience,
    ];
    let mut out: Vec<String> = preferred
        .iter()
        .filter(|c| table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    out.extend(
        table
            .column_names
            .iter()
            .filter(|c| !out.contains(c))
            .cloned()
            .collect::<Vec<_>>(),
    );
    out
}

/// Renders `table`. With `sort` set the headers become buttons and the
/// clicked column, if any, is returned.
fn player_table(
    ui: &mut Ui,
    id: &str,
    table: &Table,
    state: &AppState,
    max_height: f32,
    sort: Option<Option<&(String, bool)>>,
) -> Option<String> {
    if table.is_empty() {
        empty_notice(ui, "players");
        return None;
    }
    let mut clicked = None;
    let columns = display_columns(table, state);
    let role_col = &state.config.columns.role;
    let decimals = state.config.display.decimal_places;

    TableBuilder::new(ui)
        .id_salt(id)
        .striped(true)
        .resizable(true)
        .max_scroll_height(max_height)
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(22.0, |mut header| {
            for c in &columns {
                header.col(|ui: &mut Ui| match sort {
                    Some(active) => {
                        let marker = match active {
                            Some((col, true)) if col == c => " ⬇",
                            Some((col, false)) if col == c => " ⬆",
                            _ => "",
                        };
                        if ui.button(RichText::new(format!("{c}{marker}")).strong()).clicked() {
                            clicked = Some(c.clone());
                        }
                    }
                    None => {
                        ui.strong(c);
                    }
                });
            }
        })
        .body(|body| {
            body.rows(20.0, table.len(), |mut row| {
                let record = &table.rows[row.index()];
                for c in &columns {
                    row.col(|ui: &mut Ui| {
                        let text = fmt_cell(record.get(c), decimals);
                        if c == role_col {
                            let color = state.role_colors.color_for(&text);
                            ui.label(RichText::new(text).color(color).strong());
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
    clicked
}

// ---------------------------------------------------------------------------
// Overview page
// ---------------------------------------------------------------------------

pub fn overview_page(ui: &mut Ui, state: &AppState) {
    let view = &state.overview;
    let decimals = state.config.display.decimal_places;

    ui.heading(format!("Overview: {}", state.source.label()));
    if view.metrics.total_players == 0 {
        ui.label(
            RichText::new("No data loaded. Check the data folder and press Refresh Data.")
                .color(Color32::YELLOW),
        );
    }
    metric_cards(ui, &view.metrics, decimals);
    ui.separator();

    ui.columns(3, |cols| {
        cols[0].strong("Players by Role");
        distribution_grid(&mut cols[0], "role_dist", &view.roles, Some(&state.role_colors));
        cols[1].strong(format!("Top {} Teams", state.config.display.top_teams));
        distribution_grid(&mut cols[1], "team_dist", &view.teams, None);
        cols[2].strong("Convenience Distribution");
        summary_grid(&mut cols[2], &view.convenience, decimals);
    });
    ui.separator();

    ui.strong(format!("Top {} Players by Convenience", state.config.display.top_players));
    player_table(ui, "overview_top", &view.top_players, state, 420.0, None);
}

// ---------------------------------------------------------------------------
// Players page
// ---------------------------------------------------------------------------

pub fn players_page(ui: &mut Ui, state: &mut AppState) {
    let view = &state.players;
    ui.heading(format!("Players: {}", state.source.label()));
    metric_cards(ui, &view.metrics, state.config.display.decimal_places);
    ui.separator();
    ui.label(format!("{} players match the current filters", view.filtered.len()));
    let clicked = player_table(
        ui,
        "players_table",
        &view.filtered,
        state,
        600.0,
        Some(state.players_sort.as_ref()),
    );
    if let Some(column) = clicked {
        state.toggle_players_sort(&column);
    }
}

// ---------------------------------------------------------------------------
// Comparison page
// ---------------------------------------------------------------------------

pub fn comparison_page(ui: &mut Ui, state: &AppState) {
    let view = &state.comparison;
    let decimals = state.config.display.decimal_places;

    ui.heading("Season Comparison");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        let stats = &view.quick_stats;
        metric_card(ui, "Best Value", quick_stat_text(&stats.best_value));
        metric_card(ui, "Hidden Gem", quick_stat_text(&stats.hidden_gem));
        metric_card(ui, "Trending Up", quick_stat_text(&stats.trending_up));
        metric_card(ui, "Most Consistent", quick_stat_text(&stats.most_consistent));
    });
    ui.separator();

    // ---- Head to head ----
    ui.strong("Player Comparison");
    if view.profile_metrics.len() < MIN_PROFILE_METRICS {
        empty_notice(ui, "comparison metrics");
    } else if view.profiles.is_empty() {
        ui.label(RichText::new("Select players in the side panel").weak());
    } else {
        egui::Grid::new("profiles").striped(true).show(ui, |ui: &mut Ui| {
            ui.label("");
            for p in &view.profiles {
                ui.strong(&p.name);
            }
            ui.end_row();
            for (i, metric) in view.profile_metrics.iter().enumerate() {
                ui.label(metric);
                for p in &view.profiles {
                    ui.monospace(fmt_num(p.values[i].1, decimals));
                }
                ui.end_row();
            }
        });
    }
    ui.separator();

    // ---- Quadrants ----
    ui.strong(format!("Performance Quadrants: {} vs {}", state.x_metric, state.y_metric));
    if view.quadrants.points.is_empty() {
        empty_notice(ui, "data for the selected metrics");
    } else {
        ui.label(format!(
            "Medians: {} = {}, {} = {}",
            state.x_metric,
            fmt_num(view.quadrants.x_median, decimals),
            state.y_metric,
            fmt_num(view.quadrants.y_median, decimals)
        ));
        egui::Grid::new("quadrant_counts").num_columns(2).show(ui, |ui: &mut Ui| {
            for q in [Quadrant::Stars, Quadrant::HiddenGems, Quadrant::Potential, Quadrant::Risky] {
                ui.label(RichText::new(q.name()).color(quadrant_color(q)).strong());
                ui.label(view.quadrant_counts.get(&q).copied().unwrap_or(0).to_string());
                ui.end_row();
            }
        });
        egui::CollapsingHeader::new("Classified players")
            .id_salt("quadrant_points")
            .show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .id_salt("quadrant_table")
                    .striped(true)
                    .max_scroll_height(300.0)
                    .columns(Column::auto().at_least(80.0), 4)
                    .header(22.0, |mut header| {
                        for h in ["Player", state.x_metric.as_str(), state.y_metric.as_str(), "Quadrant"] {
                            header.col(|ui: &mut Ui| {
                                ui.strong(h);
                            });
                        }
                    })
                    .body(|body| {
                        body.rows(20.0, view.quadrants.points.len(), |mut row| {
                            let p = &view.quadrants.points[row.index()];
                            row.col(|ui: &mut Ui| {
                                ui.label(&p.label);
                            });
                            row.col(|ui: &mut Ui| {
                                ui.monospace(fmt_num(p.x, decimals));
                            });
                            row.col(|ui: &mut Ui| {
                                ui.monospace(fmt_num(p.y, decimals));
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(RichText::new(p.quadrant.name()).color(quadrant_color(p.quadrant)));
                            });
                        });
                    });
            });
    }
    ui.separator();

    // ---- Teams and roles ----
    ui.columns(2, |cols| {
        cols[0].strong(format!("Top {} Teams by Avg Convenience", state.config.display.top_teams));
        if view.team_means.is_empty() {
            empty_notice(&mut cols[0], "data");
        } else {
            egui::Grid::new("team_means").striped(true).show(&mut cols[0], |ui: &mut Ui| {
                for m in &view.team_means {
                    ui.label(&m.category);
                    ui.monospace(fmt_num(m.mean, decimals));
                    ui.label(RichText::new(format!("({} players)", m.count)).weak());
                    ui.end_row();
                }
            });
        }
        cols[1].strong("Role Breakdown");
        distribution_grid(&mut cols[1], "role_breakdown", &view.role_breakdown, Some(&state.role_colors));
    });
    ui.separator();

    ui.strong(format!("Top {} Opportunities", state.config.display.top_players));
    player_table(ui, "opportunities", &view.opportunities, state, 360.0, None);
    ui.separator();

    // ---- Insights ----
    ui.strong("Insights");
    let insights = &view.insights;
    if insights.total_players == 0 {
        empty_notice(ui, "insights");
    } else {
        ui.label(format!("Players analysed: {}", insights.total_players));
        ui.label(format!(
            "Average convenience: {}",
            fmt_opt(insights.avg_convenience, decimals)
        ));
        if let Some(role) = &insights.best_role {
            ui.label(format!("Best value role: {role}"));
        }
        if let Some(team) = &insights.best_team {
            ui.label(format!("Best value team: {team}"));
        }
    }
    ui.separator();

    // ---- Dataset overlap ----
    ui.strong("Dataset Overlap");
    match &view.overlap {
        Some(o) => {
            egui::Grid::new("overlap").num_columns(2).show(ui, |ui: &mut Ui| {
                for (label, n) in [
                    ("Current season players", o.left_total),
                    ("Previous season players", o.right_total),
                    ("In both seasons", o.common),
                    ("Only current", o.left_only),
                    ("Only previous", o.right_only),
                    ("Merged rows", view.merged_rows),
                ] {
                    ui.label(label);
                    ui.monospace(n.to_string());
                    ui.end_row();
                }
            });
        }
        None => empty_notice(ui, "overlap (one of the datasets is empty)"),
    }
}
