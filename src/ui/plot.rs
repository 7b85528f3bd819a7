use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};

use batting_dashboard::data::projection::{STRIKE_ZONE, filter_by_description, group_by_pitch};
use batting_dashboard::state::AppState;

// ---------------------------------------------------------------------------
// Pitch location chart
// ---------------------------------------------------------------------------

/// Scatter of pitch locations (catcher's view) around the strike zone.
pub fn location_plot(ui: &mut Ui, state: &AppState) {
    let Some(detail) = &state.detail else {
        return;
    };
    let events = filter_by_description(&detail.lookup, &state.description);
    let groups = group_by_pitch(events);
    let (x_range, z_range) = STRIKE_ZONE.view_bounds();
    let label_color = ui.visuals().text_color();

    Plot::new("location_plot")
        .legend(Legend::default())
        .width(550.0)
        .height(600.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .include_x(x_range[0])
        .include_x(x_range[1])
        .include_y(z_range[0])
        .include_y(z_range[1])
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(STRIKE_ZONE.outline()))
                    .stroke(Stroke::new(2.0, Color32::GRAY)),
            );

            for group in &groups {
                let color = state.palette.color_for(&group.pitch);
                let coords: Vec<[f64; 2]> = group.points.iter().map(|p| [p.x, p.z]).collect();
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(&group.pitch)
                        .color(color)
                        .filled(true)
                        .shape(MarkerShape::Circle)
                        .radius(6.0),
                );
                for point in &group.points {
                    plot_ui.text(Text::new(
                        PlotPoint::new(point.x, point.z + 0.15),
                        RichText::new(&point.label).color(label_color),
                    ));
                }
            }
        });
}
