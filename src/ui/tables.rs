use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use batting_dashboard::data::projection::{
    DescriptionFilter, LOOKUP_HEADERS, description_options, detail_rows, filter_by_description,
    lookup_row,
};
use batting_dashboard::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Pitch detail table (season rows)
// ---------------------------------------------------------------------------

pub fn pitch_details(ui: &mut Ui, state: &AppState) {
    let Some(detail) = &state.detail else {
        return;
    };
    let headers = state.config.detail_labels.as_array();
    let rows = detail_rows(&detail.pitches);

    ui.push_id("pitch_details", |ui: &mut Ui| {
        string_table(ui, &headers, &rows);
    });
}

// ---------------------------------------------------------------------------
// Batting info (lookup rows) + description filter
// ---------------------------------------------------------------------------

/// Description selector; returns the new filter when it changed.
pub fn description_selector(ui: &mut Ui, state: &AppState) -> Option<DescriptionFilter> {
    let detail = state.detail.as_ref()?;
    let mut picked = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Description");
        egui::ComboBox::from_id_salt("description")
            .selected_text(state.description.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for option in description_options(&detail.lookup) {
                    let selected = option == state.description;
                    if ui.selectable_label(selected, option.to_string()).clicked() && !selected {
                        picked = Some(option);
                    }
                }
            });
    });
    picked
}

pub fn batting_info(ui: &mut Ui, state: &AppState) {
    let Some(detail) = &state.detail else {
        return;
    };
    let rows: Vec<[String; 12]> = filter_by_description(&detail.lookup, &state.description)
        .into_iter()
        .map(lookup_row)
        .collect();

    ui.push_id("batting_info", |ui: &mut Ui| {
        string_table(ui, &LOOKUP_HEADERS, &rows);
    });
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn string_table<const N: usize>(ui: &mut Ui, headers: &[&str; N], rows: &[[String; N]]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .columns(Column::auto().at_least(36.0), N)
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for title in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(ROW_HEIGHT, |mut table_row| {
                    for cell in row {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}
