use eframe::egui::{self, ScrollArea, Ui};

use batting_dashboard::state::AppState;

use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BattingDashboardApp {
    pub state: AppState,
}

impl BattingDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BattingDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: game detail ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| game_view(ui, &mut self.state));
        });
    }
}

fn game_view(ui: &mut Ui, state: &mut AppState) {
    ui.heading("⚾ MLB 2025 - Daily Batting Info");
    ui.label(egui::RichText::new("Data: Baseball Savant – MLB 2025 Regular Season").weak());
    ui.separator();

    if let Some(notice) = &state.notice {
        panels::notice(ui, notice);
    }

    let Some(detail) = &state.detail else {
        if state.season.is_none() && state.status_message.is_none() {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Load a season file to begin  (File → Open season file…)");
            });
        }
        return;
    };

    ui.heading(detail.headline());
    ui.add_space(8.0);

    ui.strong("Pitch Details");
    tables::pitch_details(ui, state);
    ui.add_space(12.0);

    ui.strong("Batting Info");
    if let Some(filter) = tables::description_selector(ui, state) {
        state.select_description(filter);
    }
    tables::batting_info(ui, state);
    ui.add_space(12.0);

    ui.strong("Pitch Location Chart");
    plot::location_plot(ui, state);
}
