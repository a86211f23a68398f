use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::generate_palette;
use crate::data::chart::bar_series;
use crate::state::Session;

/// Horizontal space one row's group of bars takes up.
const GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Bar chart (central panel)
// ---------------------------------------------------------------------------

/// Render the numeric columns of the projected table as grouped bars: one
/// category per row, one series per column.
pub fn bar_chart(ui: &mut Ui, session: &Session) {
    let Some(table) = session.projected() else {
        return;
    };

    let series = bar_series(&table);
    if series.is_empty() {
        ui.label("No numeric columns to chart.");
        return;
    }

    let colors = generate_palette(series.len());
    let bar_width = GROUP_WIDTH / series.len() as f64;

    Plot::new("bar_chart")
        .legend(Legend::default())
        .x_axis_label("Row")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (k, (s, color)) in series.iter().zip(colors).enumerate() {
                // Shift each series inside its row's group.
                let offset = (k as f64 + 0.5) * bar_width - GROUP_WIDTH / 2.0;
                let bars: Vec<Bar> = s
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, v)| {
                        v.map(|value| Bar::new(row as f64 + offset, value).width(bar_width))
                    })
                    .collect();

                let chart = BarChart::new(bars).name(&s.name).color(color);
                plot_ui.bar_chart(chart);
            }
        });
}
