use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use fanta_dash::analysis::ranking;
use fanta_dash::analysis::summary::Season;
use fanta_dash::data::filter::{ConvenienceMode, NumericRange};
use fanta_dash::store::Source;

use crate::color::CategoryColors;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Page navigation, data folder selection and the refresh button.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for (page, label) in [
            (Page::Overview, "Overview"),
            (Page::Players, "Players"),
            (Page::Comparison, "Comparison"),
        ] {
            if ui.selectable_label(state.page == page, label).clicked() {
                state.page = page;
            }
        }

        ui.separator();

        if ui.button("Refresh Data").clicked() {
            state.reload();
        }

        ui.label(
            RichText::new(state.config.data_dir.display().to_string())
                .small()
                .weak(),
        );

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::LIGHT_GREEN));
        }
    });
}

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Select the data output folder")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        state.set_data_dir(dir);
        state.status_message = Some(format!(
            "Loaded {} / {} players",
            state.store.load(Source::Current).len(),
            state.store.load(Source::Previous).len()
        ));
    }
}

/// Radio buttons choosing which season the Overview and Players pages show.
fn source_selector(ui: &mut Ui, state: &mut AppState) {
    let mut selected = state.source;
    ui.strong("Data Source");
    for source in [Source::Current, Source::Previous] {
        ui.radio_value(&mut selected, source, source.label());
    }
    ui.separator();
    if selected != state.source {
        state.select_source(selected);
    }
}

// ---------------------------------------------------------------------------
// Overview controls
// ---------------------------------------------------------------------------

pub fn overview_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Overview");
    ui.separator();
    source_selector(ui, state);
}

// ---------------------------------------------------------------------------
// Players filter panel
// ---------------------------------------------------------------------------

/// Role and team checkboxes, convenience pre-selection and ranges.
pub fn filter_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    source_selector(ui, state);
    let mut changed = false;

    let roles = state.players.role_options.clone();
    let teams = state.players.team_options.clone();
    let table = state.store.load(state.source);
    let role_colors = state.role_colors.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Convenience");
            egui::ComboBox::from_id_salt("convenience_mode")
                .selected_text(state.criteria.convenience_mode.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for mode in ConvenienceMode::MODES {
                        changed |= ui
                            .selectable_value(&mut state.criteria.convenience_mode, mode, mode.label())
                            .changed();
                    }
                });
            ui.separator();

            let conv_col = state.config.columns.convenience.clone();
            let pot_col = state.config.columns.potential_convenience.clone();
            changed |= range_editor(
                ui,
                "Convenience range",
                &mut state.criteria.convenience_range,
                &ranking::stat_summary(&table, &conv_col),
            );
            changed |= range_editor(
                ui,
                "Potential range",
                &mut state.criteria.potential_range,
                &ranking::stat_summary(&table, &pot_col),
            );
            ui.separator();

            changed |= category_checkboxes(
                ui,
                "Roles",
                &roles,
                &mut state.criteria.roles,
                Some(&role_colors),
            );
            changed |= category_checkboxes(ui, "Teams", &teams, &mut state.criteria.teams, None);
        });

    if changed {
        state.refresh_players();
    }
}

/// Collapsible checkbox list. An empty selection means "all".
fn category_checkboxes(
    ui: &mut Ui,
    title: &str,
    options: &[String],
    selected: &mut BTreeSet<String>,
    colors: Option<&CategoryColors>,
) -> bool {
    let mut changed = false;
    let header = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(title == "Roles")
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    selected.extend(options.iter().cloned());
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for option in options {
                let mut checked = selected.contains(option);
                let mut text = RichText::new(option);
                if let Some(c) = colors {
                    text = text.color(c.color_for(option));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    if checked {
                        selected.insert(option.clone());
                    } else {
                        selected.remove(option);
                    }
                    changed = true;
                }
            }
        });
    changed
}

/// Optional min/max bounds, seeded from the column's observed range.
fn range_editor(
    ui: &mut Ui,
    title: &str,
    range: &mut Option<NumericRange>,
    observed: &ranking::StatSummary,
) -> bool {
    let mut changed = false;
    let mut enabled = range.is_some();
    let toggle = ui.add_enabled(!observed.is_empty(), egui::Checkbox::new(&mut enabled, title));
    if toggle.changed() {
        *range = enabled.then(|| NumericRange::new(observed.min, observed.max));
        changed = true;
    }

    if let Some(r) = range {
        ui.horizontal(|ui: &mut Ui| {
            changed |= ui
                .add(egui::DragValue::new(&mut r.min).speed(0.5).prefix("min "))
                .changed();
            changed |= ui
                .add(egui::DragValue::new(&mut r.max).speed(0.5).prefix("max "))
                .changed();
        });
    }
    changed
}

// ---------------------------------------------------------------------------
// Comparison controls
// ---------------------------------------------------------------------------

pub fn comparison_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Comparison");
    ui.separator();

    let mut changed = false;
    let roles = state.store.load(Source::Current).distinct_labels(&state.config.columns.role);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Role focus");
            egui::ComboBox::from_id_salt("role_focus")
                .selected_text(state.role_focus.as_deref().unwrap_or("All Roles"))
                .show_ui(ui, |ui: &mut Ui| {
                    changed |= ui
                        .selectable_value(&mut state.role_focus, None, "All Roles")
                        .changed();
                    for role in &roles {
                        changed |= ui
                            .selectable_value(&mut state.role_focus, Some(role.clone()), role)
                            .changed();
                    }
                });
            changed |= ui
                .checkbox(&mut state.top50_only, "Top 50 by convenience only")
                .changed();
            ui.separator();

            ui.strong("Players");
            let names = state.comparison.player_names.clone();
            for (i, slot) in state.compare.iter_mut().enumerate() {
                egui::ComboBox::from_id_salt(("compare", i))
                    .selected_text(slot.as_deref().unwrap_or("Select a player"))
                    .width(200.0)
                    .show_ui(ui, |ui: &mut Ui| {
                        changed |= ui.selectable_value(slot, None, "(none)").changed();
                        for name in &names {
                            changed |= ui
                                .selectable_value(slot, Some(name.clone()), name)
                                .changed();
                        }
                    });
            }
            ui.horizontal(|ui: &mut Ui| {
                for (season, label) in [
                    (Season::Current, "Current"),
                    (Season::Previous, "Previous"),
                    (Season::Both, "Both"),
                ] {
                    changed |= ui.radio_value(&mut state.season, season, label).changed();
                }
            });
            ui.separator();

            ui.strong("Scatter axes");
            let metrics = state.comparison.metric_options.clone();
            for (id, axis) in [("x_metric", &mut state.x_metric), ("y_metric", &mut state.y_metric)] {
                egui::ComboBox::from_id_salt(id)
                    .selected_text(axis.as_str())
                    .show_ui(ui, |ui: &mut Ui| {
                        for m in &metrics {
                            changed |= ui.selectable_value(axis, m.clone(), m).changed();
                        }
                    });
            }
        });

    if changed {
        state.refresh_comparison();
    }
}
