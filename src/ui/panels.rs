use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::app::Command;
use crate::data::export::ExportFormat;
use crate::data::loader::UploadedFile;
use crate::state::{Action, NoticeLevel, Session};
use crate::store::{SessionId, SessionStore};

// ---------------------------------------------------------------------------
// Left side panel – cleaning, columns, export
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, session: &Session, commands: &mut Vec<Command>) {
    ui.heading("Data Sweeper");
    ui.separator();

    let Some(active) = session.active() else {
        ui.label("No files loaded.");
        ui.label("Use File → Open… or drop CSV / Excel files on the window.");
        return;
    };
    let active_name = active.name.clone();
    let columns = active.table.columns.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Table selector ----
            ui.strong("File");
            egui::ComboBox::from_id_salt("table_select")
                .selected_text(&active_name)
                .show_ui(ui, |ui: &mut Ui| {
                    for name in session.registry.names() {
                        if ui.selectable_label(name == active_name, name).clicked() {
                            commands.push(Command::Act(Action::SelectTable(name.to_string())));
                        }
                    }
                });
            ui.separator();

            // ---- Cleaning ----
            ui.strong("Cleaning");
            ui.horizontal_wrapped(|ui: &mut Ui| {
                if ui.button("Remove duplicates").clicked() {
                    commands.push(Command::Act(Action::RemoveDuplicates));
                }
                if ui.button("Fill missing values").clicked() {
                    commands.push(Command::Act(Action::FillMissing));
                }
                if ui.small_button("Revert").clicked() {
                    commands.push(Command::Act(Action::Revert));
                }
            });
            ui.separator();

            // ---- Column selection (collapsible) ----
            let header_text = format!("Columns  ({}/{})", session.columns.len(), columns.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("columns")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            commands.push(Command::Act(Action::SelectAllColumns));
                        }
                        if ui.small_button("None").clicked() {
                            commands.push(Command::Act(Action::SelectNoColumns));
                        }
                    });
                    for col in &columns {
                        let mut checked = session.columns.contains(col);
                        if ui.checkbox(&mut checked, col).changed() {
                            commands.push(Command::Act(Action::ToggleColumn(col.clone())));
                        }
                    }
                });
            ui.separator();

            // ---- Visualisation ----
            let mut show_chart = session.show_chart;
            if ui.checkbox(&mut show_chart, "Show bar chart").changed() {
                commands.push(Command::Act(Action::SetShowChart(show_chart)));
            }
            ui.separator();

            // ---- Conversion ----
            ui.strong("Convert file to");
            let current = session.export_format();
            let mut chosen = current;
            ui.horizontal(|ui: &mut Ui| {
                for format in ExportFormat::ALL {
                    ui.radio_value(&mut chosen, format, format.to_string());
                }
            });
            if chosen != current {
                commands.push(Command::Act(Action::SetExportFormat(chosen)));
            }
            if ui.button(format!("Download {current}")).clicked() {
                commands.push(Command::Act(Action::Download));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(
    ui: &mut Ui,
    store: &SessionStore,
    current: SessionId,
    status_message: Option<&str>,
    commands: &mut Vec<Command>,
) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(commands);
                ui.close_menu();
            }
            if ui.button("Clear files").clicked() {
                commands.push(Command::Act(Action::Clear));
                ui.close_menu();
            }
            ui.separator();
            if ui.button("New session").clicked() {
                commands.push(Command::NewSession);
                ui.close_menu();
            }
            if ui.button("Close session").clicked() {
                commands.push(Command::CloseSession);
                ui.close_menu();
            }
        });

        ui.separator();

        egui::ComboBox::from_id_salt("session_select")
            .selected_text(current.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for id in store.ids() {
                    if ui.selectable_label(id == current, id.to_string()).clicked() {
                        commands.push(Command::SwitchSession(id));
                    }
                }
            });

        let Ok(session) = store.get(current) else {
            return;
        };

        ui.separator();
        ui.label(format!("{} files loaded", session.registry.len()));

        for notice in &session.notices {
            ui.separator();
            let color = match notice.level {
                NoticeLevel::Success => Color32::LIGHT_GREEN,
                NoticeLevel::Error => Color32::RED,
            };
            ui.label(RichText::new(&notice.text).color(color));
        }

        if let Some(msg) = status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(commands: &mut Vec<Command>) {
    let Some(paths) = rfd::FileDialog::new()
        .set_title("Upload CSV or Excel files")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_files()
    else {
        return;
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        match UploadedFile::from_path(path) {
            Ok(file) => files.push(file),
            Err(e) => {
                log::error!("Failed to read file: {e:#}");
                commands.push(Command::Report(format!("Error: {e:#}")));
            }
        }
    }
    if !files.is_empty() {
        commands.push(Command::Act(Action::Upload(files)));
    }
}
