mod app;
mod ui;

use app::BattingDashboardApp;
use batting_dashboard::config::DashboardConfig;
use batting_dashboard::state::AppState;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load().unwrap_or_else(|e| {
        log::error!("Config: {e:#}; falling back to defaults");
        DashboardConfig::default()
    });

    // Season and reference tables are loaded once, before the first frame.
    let mut state = AppState::new(config);
    state.load_all();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MLB Batting Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BattingDashboardApp::new(state)))),
    )
}
