use crate::data::clean::{fill_missing_with_mean, remove_duplicates};
use crate::data::columns::{ColumnSelection, init_selection, project, toggle};
use crate::data::export::{Artifact, ExportFormat, export};
use crate::data::loader::{UploadedFile, load_upload};
use crate::data::model::{Cell, Table};

/// Rows shown by the preview grid.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Registry: uploaded file name → table
// ---------------------------------------------------------------------------

/// A table in the registry together with what is needed to rebuild it.
#[derive(Debug, Clone)]
pub struct RegisteredTable {
    pub name: String,
    /// Working copy, mutated by the cleaning actions.
    pub table: Table,
    /// The table exactly as ingested.
    pristine: Table,
    /// Target of the "Convert file to" radio, remembered per file.
    pub export_format: ExportFormat,
}

/// Uploaded tables in upload order. Re-uploading a name replaces the table
/// and keeps its position.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<RegisteredTable>,
}

impl Registry {
    pub fn insert(&mut self, name: String, table: Table) {
        let entry = RegisteredTable {
            name: name.clone(),
            pristine: table.clone(),
            table,
            export_format: ExportFormat::default(),
        };
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTable> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RegisteredTable> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Actions, replies and notices
// ---------------------------------------------------------------------------

/// One user interaction.
#[derive(Debug, Clone)]
pub enum Action {
    Upload(Vec<UploadedFile>),
    SelectTable(String),
    RemoveDuplicates,
    FillMissing,
    Revert,
    ToggleColumn(String),
    SelectAllColumns,
    SelectNoColumns,
    SetShowChart(bool),
    SetExportFormat(ExportFormat),
    Download,
    Clear,
}

/// What the shell has to do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Done,
    Download(Artifact),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Inline message produced by the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Everything one user has loaded and chosen, independent of rendering.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub registry: Registry,

    /// Name of the active table (None until something is uploaded).
    pub selected: Option<String>,

    /// Columns kept for chart and export.
    pub columns: ColumnSelection,

    /// Whether the bar chart is shown.
    pub show_chart: bool,

    /// Messages from the last handled action.
    pub notices: Vec<Notice>,
}

impl Session {
    /// Apply one action. Notices from the previous action are discarded
    /// first.
    pub fn handle(&mut self, action: Action) -> Reply {
        self.notices.clear();
        match action {
            Action::Upload(files) => self.upload(files),
            Action::SelectTable(name) => self.select_table(&name),
            Action::RemoveDuplicates => self.remove_duplicates(),
            Action::FillMissing => self.fill_missing(),
            Action::Revert => self.revert(),
            Action::ToggleColumn(column) => toggle(&mut self.columns, &column),
            Action::SelectAllColumns => self.select_all_columns(),
            Action::SelectNoColumns => self.columns.clear(),
            Action::SetShowChart(show) => self.show_chart = show,
            Action::SetExportFormat(format) => self.set_export_format(format),
            Action::Download => {
                if let Some(artifact) = self.export() {
                    return Reply::Download(artifact);
                }
            }
            Action::Clear => self.clear(),
        }
        Reply::Done
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Success,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        });
    }

    /// Ingest uploads. Bad files are reported and skipped; the rest are
    /// registered, last write wins.
    pub fn upload(&mut self, files: Vec<UploadedFile>) {
        for file in files {
            match load_upload(&file) {
                Ok(table) => {
                    log::info!(
                        "Loaded {} with {} rows and columns {:?}",
                        file.name,
                        table.len(),
                        table.columns
                    );
                    let replaces_active = self.selected.as_deref() == Some(file.name.as_str());
                    self.registry.insert(file.name.clone(), table);
                    if replaces_active {
                        self.select_table(&file.name);
                    }
                }
                Err(e) => {
                    log::warn!("Skipping {}: {e}", file.name);
                    self.error(e.to_string());
                }
            }
        }

        if self.selected.is_none() {
            let first = self.registry.names().next().map(str::to_string);
            if let Some(first) = first {
                self.select_table(&first);
            }
        }
    }

    /// Make `name` the active table and reset the column selection to all of
    /// its columns.
    pub fn select_table(&mut self, name: &str) {
        let Some(entry) = self.registry.get(name) else {
            log::warn!("Ignoring selection of unknown table {name}");
            return;
        };
        self.columns = init_selection(&entry.table);
        self.selected = Some(name.to_string());
    }

    /// The active table, if any.
    pub fn active(&self) -> Option<&RegisteredTable> {
        self.selected
            .as_deref()
            .and_then(|name| self.registry.get(name))
    }

    fn active_mut(&mut self) -> Option<&mut RegisteredTable> {
        let name = self.selected.as_deref()?;
        self.registry.get_mut(name)
    }

    /// First [`PREVIEW_ROWS`] rows of the active table.
    pub fn preview(&self) -> Option<&[Vec<Cell>]> {
        self.active().map(|entry| entry.table.head(PREVIEW_ROWS))
    }

    pub fn remove_duplicates(&mut self) {
        let Some(entry) = self.active_mut() else {
            return;
        };
        let removed = remove_duplicates(&mut entry.table);
        log::info!("Removed {removed} duplicate rows from {}", entry.name);
        self.success(format!("Duplicates removed ({removed} rows)"));
    }

    pub fn fill_missing(&mut self) {
        let Some(entry) = self.active_mut() else {
            return;
        };
        let report = fill_missing_with_mean(&mut entry.table);
        log::info!(
            "Filled {} cells in {} columns of {}",
            report.cells,
            report.columns,
            entry.name
        );
        self.success(format!(
            "Missing values filled ({} cells in {} columns)",
            report.cells, report.columns
        ));
    }

    /// Restore the active table to what was uploaded.
    pub fn revert(&mut self) {
        let Some(entry) = self.active_mut() else {
            return;
        };
        entry.table = entry.pristine.clone();
        let name = entry.name.clone();
        log::info!("Reverted {name}");
        self.success(format!("{name} restored as uploaded"));
    }

    pub fn select_all_columns(&mut self) {
        if let Some(entry) = self.active() {
            self.columns = init_selection(&entry.table);
        }
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        if let Some(entry) = self.active_mut() {
            entry.export_format = format;
        }
    }

    /// Export format of the active table.
    pub fn export_format(&self) -> ExportFormat {
        self.active()
            .map(|entry| entry.export_format)
            .unwrap_or_default()
    }

    /// The active table narrowed to the selected columns.
    pub fn projected(&self) -> Option<Table> {
        self.active()
            .map(|entry| project(&entry.table, &self.columns))
    }

    /// Serialize the projected table in the chosen format.
    pub fn export(&mut self) -> Option<Artifact> {
        let entry = self.active()?;
        let format = entry.export_format;
        let table = project(&entry.table, &self.columns);
        match export(&table, &entry.name, format) {
            Ok(artifact) => {
                log::info!(
                    "Exported {} as {} ({} bytes)",
                    entry.name,
                    artifact.file_name,
                    artifact.bytes.len()
                );
                Some(artifact)
            }
            Err(e) => {
                log::error!("Export of {} failed: {e:#}", entry.name);
                self.error(format!("Export failed: {e:#}"));
                None
            }
        }
    }

    /// Forget every uploaded table.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.selected = None;
        self.columns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::export::XLSX_MIME;

    const SALES: &str = "date,amount,region\n\
        2024-01-01,100,north\n\
        2024-01-02,250,south\n\
        2024-01-03,,east\n\
        2024-01-01,100,north\n\
        2024-01-04,75.5,west\n\
        2024-01-05,300,north\n\
        2024-01-02,250,south\n\
        2024-01-06,125,east\n\
        2024-01-07,90,west\n\
        2024-01-08,60,south\n";

    fn upload(name: &str, text: &str) -> Action {
        Action::Upload(vec![UploadedFile::new(name, text.as_bytes().to_vec())])
    }

    fn loaded() -> Session {
        let mut session = Session::default();
        session.handle(upload("sales.csv", SALES));
        session
    }

    #[test]
    fn test_upload_selects_first_file() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("a.csv", b"x\n1\n".to_vec()),
            UploadedFile::new("b.csv", b"y\n2\n".to_vec()),
        ]));
        assert_eq!(session.selected.as_deref(), Some("a.csv"));
        assert_eq!(session.registry.names().collect::<Vec<_>>(), vec!["a.csv", "b.csv"]);
        assert_eq!(session.columns, vec!["x"]);
    }

    #[test]
    fn test_unsupported_file_is_reported_and_skipped() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("notes.txt", b"hello".to_vec()),
            UploadedFile::new("ok.csv", b"a\n1\n".to_vec()),
        ]));
        assert_eq!(session.registry.len(), 1);
        assert!(session.registry.get("notes.txt").is_none());
        assert_eq!(
            session.notices,
            vec![Notice {
                level: NoticeLevel::Error,
                text: "Invalid file type: .txt".into()
            }]
        );
        assert_eq!(session.selected.as_deref(), Some("ok.csv"));
    }

    #[test]
    fn test_malformed_csv_is_reported_and_skipped() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("bad.csv", b"a,b\n1,2,3\n".to_vec()),
            UploadedFile::new("good.csv", b"a,b\n1,2\n".to_vec()),
        ]));
        assert_eq!(session.registry.len(), 1);
        assert_eq!(session.notices.len(), 1);
        assert!(session.notices[0].text.starts_with("Failed to read bad.csv"));
    }

    #[test]
    fn test_fill_after_nan_spelling_uses_real_mean() {
        let mut session = Session::default();
        session.handle(upload("t.csv", "x,y\n1,a\n-nan,b\n,c\n3,d\n"));
        session.handle(Action::FillMissing);
        let table = &session.active().unwrap().table;
        assert_eq!(
            table.column(0).cloned().collect::<Vec<_>>(),
            vec![Cell::Float(1.0), Cell::Float(2.0), Cell::Float(2.0), Cell::Float(3.0)]
        );
    }

    #[test]
    fn test_empty_csv_is_reported_and_skipped() {
        let mut session = Session::default();
        session.handle(upload("e.csv", ""));
        assert!(session.registry.is_empty());
        assert!(session.selected.is_none());
        assert_eq!(session.notices.len(), 1);
        assert!(session.notices[0].text.starts_with("Failed to read e.csv"));
    }

    #[test]
    fn test_reupload_replaces_in_place() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("a.csv", b"x\n1\n".to_vec()),
            UploadedFile::new("b.csv", b"y\n2\n".to_vec()),
        ]));
        session.handle(upload("a.csv", "z\n3\n4\n"));
        assert_eq!(session.registry.names().collect::<Vec<_>>(), vec!["a.csv", "b.csv"]);
        let active = session.active().unwrap();
        assert_eq!(active.table.columns, vec!["z"]);
        assert_eq!(session.columns, vec!["z"]);
    }

    #[test]
    fn test_preview_shows_first_five_rows() {
        let session = loaded();
        let preview = session.preview().unwrap();
        assert_eq!(preview.len(), PREVIEW_ROWS);
        assert_eq!(preview, &session.active().unwrap().table.rows[..5]);

        let mut short = Session::default();
        short.handle(upload("s.csv", "a\n1\n2\n"));
        assert_eq!(short.preview().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_session_has_nothing_to_show() {
        let mut session = Session::default();
        assert!(session.preview().is_none());
        assert!(session.projected().is_none());
        assert_eq!(session.handle(Action::Download), Reply::Done);
        session.handle(Action::RemoveDuplicates);
        assert!(session.notices.is_empty());
    }

    #[test]
    fn test_sales_scenario() {
        let mut session = loaded();
        session.handle(Action::RemoveDuplicates);
        assert_eq!(session.active().unwrap().table.len(), 8);

        session.handle(Action::FillMissing);
        let expected = (100.0 + 250.0 + 75.5 + 300.0 + 125.0 + 90.0 + 60.0) / 7.0;
        assert_eq!(
            session.active().unwrap().table.rows[2][1],
            Cell::Float(expected)
        );

        session.handle(Action::ToggleColumn("date".into()));
        let projected = session.projected().unwrap();
        assert_eq!(projected.columns, vec!["amount", "region"]);
        assert_eq!(projected.len(), 8);

        session.handle(Action::SetExportFormat(ExportFormat::Excel));
        match session.handle(Action::Download) {
            Reply::Download(artifact) => {
                assert_eq!(artifact.file_name, "sales.xlsx");
                assert_eq!(artifact.mime, XLSX_MIME);
            }
            Reply::Done => panic!("expected a download"),
        }
    }

    #[test]
    fn test_cleaning_only_touches_active_table() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("a.csv", b"x\n1\n1\n".to_vec()),
            UploadedFile::new("b.csv", b"x\n1\n1\n".to_vec()),
        ]));
        session.handle(Action::RemoveDuplicates);
        assert_eq!(session.registry.get("a.csv").unwrap().table.len(), 1);
        assert_eq!(session.registry.get("b.csv").unwrap().table.len(), 2);
    }

    #[test]
    fn test_revert_restores_upload() {
        let mut session = loaded();
        session.handle(Action::RemoveDuplicates);
        session.handle(Action::Revert);
        assert_eq!(session.active().unwrap().table.len(), 10);
    }

    #[test]
    fn test_select_table_resets_columns() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("a.csv", b"x,y\n1,2\n".to_vec()),
            UploadedFile::new("b.csv", b"z\n3\n".to_vec()),
        ]));
        session.handle(Action::SelectNoColumns);
        assert!(session.columns.is_empty());
        session.handle(Action::SelectTable("b.csv".into()));
        assert_eq!(session.columns, vec!["z"]);
        session.handle(Action::SelectTable("missing.csv".into()));
        assert_eq!(session.selected.as_deref(), Some("b.csv"));
    }

    #[test]
    fn test_export_format_is_per_table() {
        let mut session = Session::default();
        session.handle(Action::Upload(vec![
            UploadedFile::new("a.csv", b"x\n1\n".to_vec()),
            UploadedFile::new("b.csv", b"x\n1\n".to_vec()),
        ]));
        session.handle(Action::SetExportFormat(ExportFormat::Excel));
        session.handle(Action::SelectTable("b.csv".into()));
        assert_eq!(session.export_format(), ExportFormat::Csv);
        session.handle(Action::SelectTable("a.csv".into()));
        assert_eq!(session.export_format(), ExportFormat::Excel);
    }

    #[test]
    fn test_notices_last_one_action() {
        let mut session = loaded();
        session.handle(Action::RemoveDuplicates);
        assert_eq!(session.notices.len(), 1);
        session.handle(Action::SetShowChart(true));
        assert!(session.notices.is_empty());
        assert!(session.show_chart);
    }

    #[test]
    fn test_clear_empties_session() {
        let mut session = loaded();
        session.handle(Action::Clear);
        assert!(session.registry.is_empty());
        assert!(session.selected.is_none());
        assert!(session.active().is_none());
    }
}
