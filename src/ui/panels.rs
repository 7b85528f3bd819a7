use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use batting_dashboard::data::error::PipelineError;
use batting_dashboard::state::{AppState, IdentityKind};

// ---------------------------------------------------------------------------
// Left side panel – cascading selectors
// ---------------------------------------------------------------------------

/// Render the selector panel: division → team → batter → date.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    if state.season.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone the option lists so the selectors can mutate state.
    let opts = state.options.clone();
    let selection = state.selection.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Division");
            let current = selection.division.as_deref();
            if let Some(choice) = combo(ui, "division", current, &opts.divisions) {
                state.select_division(choice);
            }
            ui.add_space(6.0);

            ui.strong("Team");
            if let Some(choice) = combo(ui, "team", selection.team.as_deref(), &opts.teams) {
                state.select_team(choice);
            }
            ui.add_space(6.0);

            ui.strong(format!("Batter  ({})", opts.batters.len()));
            if let Some(choice) = combo(ui, "batter", selection.batter.as_deref(), &opts.batters) {
                state.select_batter(choice);
            }
            ui.add_space(6.0);

            ui.strong(format!("Date  ({})", opts.dates.len()));
            let current = selection.date.as_ref().map(|d| d.to_string());
            let labels: Vec<String> = opts.dates.iter().map(|d| d.to_string()).collect();
            if let Some(choice) = combo(ui, "date", current.as_deref(), &labels) {
                if let Some(date) = opts.dates.iter().find(|d| d.to_string() == choice) {
                    state.select_date(date.clone());
                }
            }

            ui.separator();
            legend(ui, state);
        });
}

/// A combo box over `items`; returns the newly clicked item, if any.
fn combo(ui: &mut Ui, id: &str, current: Option<&str>, items: &[String]) -> Option<String> {
    let mut picked = None;
    ui.add_enabled_ui(!items.is_empty(), |ui: &mut Ui| {
        egui::ComboBox::from_id_salt(id)
            .width(ui.available_width())
            .selected_text(current.unwrap_or("—"))
            .show_ui(ui, |ui: &mut Ui| {
                for item in items {
                    if ui
                        .selectable_label(current == Some(item.as_str()), item)
                        .clicked()
                        && current != Some(item.as_str())
                    {
                        picked = Some(item.clone());
                    }
                }
            });
    });
    picked
}

fn legend(ui: &mut Ui, state: &AppState) {
    ui.strong("Pitch colors");
    for (name, color) in state.palette.legend_entries() {
        ui.label(RichText::new(format!("● {name}")).color(color));
    }
}

/// Yellow warning for empty results, grey prompt for missing choices.
pub fn notice(ui: &mut Ui, notice: &PipelineError) {
    match notice {
        PipelineError::MissingSelection(stage) => {
            ui.label(RichText::new(format!("Select a {stage} to continue.")).weak());
        }
        other => {
            ui.label(RichText::new(format!("⚠ {other}")).color(Color32::from_rgb(230, 160, 0)));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload").clicked() {
                state.load_all();
                ui.close_menu();
            }
            if ui.button("Open season file…").clicked() {
                open_season_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open batter IDs…").clicked() {
                open_identity_dialog(state, IdentityKind::Batters);
                ui.close_menu();
            }
            if ui.button("Open pitcher IDs…").clicked() {
                open_identity_dialog(state, IdentityKind::Pitchers);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(season) = &state.season {
            let span = season
                .date_span()
                .map(|(a, b)| format!(", {a} – {b}"))
                .unwrap_or_default();
            ui.label(format!("{} pitches loaded{span}", season.len()));
        }

        ui.separator();

        let source = if state.config.offline { "offline" } else { "Baseball Savant" };
        ui.label(RichText::new(format!("lookup: {source}")).weak());

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_season_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open season play-by-play")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening season file {}", path.display());
        state.open_season_file(path);
    }
}

pub fn open_identity_dialog(state: &mut AppState, kind: IdentityKind) {
    let title = match kind {
        IdentityKind::Batters => "Open batter ID table",
        IdentityKind::Pitchers => "Open pitcher ID table",
    };
    let file = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Spreadsheets", &["xlsx", "xls", "ods", "csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_identity_file(kind, path);
    }
}
