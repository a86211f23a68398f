use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui;

use crate::data::export::Artifact;
use crate::data::loader::UploadedFile;
use crate::state::{Action, Reply};
use crate::store::{SessionId, SessionStore};
use crate::ui::{panels, plot, preview};

/// Something the panels asked for during a frame. Applied after drawing.
#[derive(Debug)]
pub enum Command {
    Act(Action),
    NewSession,
    CloseSession,
    SwitchSession(SessionId),
    /// Shell-level failure (e.g. an unreadable path) to show in the top bar.
    Report(String),
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataSweeperApp {
    store: SessionStore,
    current: SessionId,
    /// Status / error message not tied to a session action.
    status_message: Option<String>,
}

impl Default for DataSweeperApp {
    fn default() -> Self {
        let mut store = SessionStore::default();
        let current = store.create();
        Self {
            store,
            current,
            status_message: None,
        }
    }
}

impl DataSweeperApp {
    fn apply(&mut self, command: Command) {
        match command {
            Command::Act(action) => {
                self.status_message = None;
                match self.store.dispatch(self.current, action) {
                    Ok(Reply::Done) => {}
                    Ok(Reply::Download(artifact)) => self.deliver(&artifact),
                    Err(e) => {
                        log::error!("{e}");
                        self.status_message = Some(format!("Error: {e}"));
                    }
                }
            }
            Command::NewSession => self.current = self.store.create(),
            Command::CloseSession => {
                if let Err(e) = self.store.close(self.current) {
                    log::warn!("{e}");
                }
                let newest = self.store.ids().last();
                self.current = match newest {
                    Some(id) => id,
                    None => self.store.create(),
                };
            }
            Command::SwitchSession(id) => {
                if self.store.get(id).is_ok() {
                    self.current = id;
                }
            }
            Command::Report(msg) => self.status_message = Some(msg),
        }
    }

    /// Hand a download to the user through a native save dialog.
    fn deliver(&mut self, artifact: &Artifact) {
        let saved = save_artifact(artifact);
        let Ok(session) = self.store.get_mut(self.current) else {
            return;
        };
        match saved {
            Ok(Some(path)) => {
                log::info!("Saved {} to {}", artifact.file_name, path.display());
                session.success(format!("{} saved to {}", artifact.file_name, path.display()));
            }
            Ok(None) => log::debug!("Save of {} cancelled", artifact.file_name),
            Err(e) => {
                log::error!("Saving {} failed: {e:#}", artifact.file_name);
                session.error(format!("Error: {e:#}"));
            }
        }
    }
}

fn save_artifact(artifact: &Artifact) -> Result<Option<PathBuf>> {
    let extension = artifact.file_name.rsplit('.').next().unwrap_or_default();
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(&artifact.file_name)
        .add_filter(artifact.mime, &[extension])
        .save_file()
    else {
        return Ok(None);
    };
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}

/// Files dropped on the window, as uploads. Unreadable ones are reported.
fn dropped_uploads(ctx: &egui::Context, commands: &mut Vec<Command>) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    if dropped.is_empty() {
        return;
    }
    let mut files = Vec::with_capacity(dropped.len());
    for file in dropped {
        if let Some(bytes) = file.bytes {
            files.push(UploadedFile::new(file.name, bytes.to_vec()));
        } else if let Some(path) = file.path {
            match UploadedFile::from_path(&path) {
                Ok(upload) => files.push(upload),
                Err(e) => {
                    log::error!("Failed to read dropped file: {e:#}");
                    commands.push(Command::Report(format!("Error: {e:#}")));
                }
            }
        }
    }
    if !files.is_empty() {
        commands.push(Command::Act(Action::Upload(files)));
    }
}

impl eframe::App for DataSweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut commands = Vec::new();
        dropped_uploads(ctx, &mut commands);

        if self.store.get(self.current).is_err() {
            self.current = self.store.create();
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(
                ui,
                &self.store,
                self.current,
                self.status_message.as_deref(),
                &mut commands,
            );
        });

        if let Ok(session) = self.store.get(self.current) {
            // ---- Left side panel: cleaning / columns / export ----
            egui::SidePanel::left("control_panel")
                .default_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, session, &mut commands);
                });

            // ---- Central panel: preview and chart ----
            egui::CentralPanel::default().show(ctx, |ui| {
                if session.active().is_none() {
                    ui.centered_and_justified(|ui| {
                        ui.heading("Upload CSV or Excel files to begin  (File → Open…)");
                    });
                    return;
                }
                preview::preview_table(ui, session);
                if session.show_chart {
                    ui.separator();
                    plot::bar_chart(ui, session);
                }
            });
        }

        if !commands.is_empty() {
            for command in commands {
                self.apply(command);
            }
            ctx.request_repaint();
        }
    }
}
