use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::Session;

/// Render the first rows of the active table as a striped grid.
pub fn preview_table(ui: &mut Ui, session: &Session) {
    let (Some(entry), Some(rows)) = (session.active(), session.preview()) else {
        return;
    };
    let columns = &entry.table.columns;

    ui.strong(format!(
        "{}  ({} rows × {} columns)",
        entry.name,
        entry.table.len(),
        entry.table.width()
    ));

    if columns.is_empty() {
        ui.label("The table has no columns.");
        return;
    }

    ui.push_id("preview", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::auto())
            .columns(Column::auto().at_least(60.0), columns.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for name in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for (i, row) in rows.iter().enumerate() {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(i.to_string());
                        });
                        for cell in row {
                            table_row.col(|ui: &mut Ui| {
                                if cell.is_null() {
                                    ui.label(RichText::new(cell.to_string()).weak());
                                } else {
                                    ui.label(cell.to_string());
                                }
                            });
                        }
                    });
                }
            });
    });
}
