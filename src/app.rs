use eframe::egui;
use fanta_dash::config::DashboardConfig;

use crate::state::{AppState, Page};
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FantaDashApp {
    pub state: AppState,
}

impl FantaDashApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for FantaDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: navigation and refresh ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: page controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| match self.state.page {
                Page::Overview => panels::overview_controls(ui, &mut self.state),
                Page::Players => panels::filter_panel(ui, &mut self.state),
                Page::Comparison => panels::comparison_controls(ui, &mut self.state),
            });

        // ---- Central panel: page content ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.page {
                    Page::Overview => views::overview_page(ui, &self.state),
                    Page::Players => views::players_page(ui, &mut self.state),
                    Page::Comparison => views::comparison_page(ui, &self.state),
                });
        });
    }
}
