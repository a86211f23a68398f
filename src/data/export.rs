use std::fmt;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use super::model::{Cell, Table};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Export format
// ---------------------------------------------------------------------------

/// Target format offered by the "Convert file to" radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Excel];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => ".csv",
            ExportFormat::Excel => ".xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Excel => XLSX_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Excel => write!(f, "Excel"),
        }
    }
}

// ---------------------------------------------------------------------------
// Download artifact
// ---------------------------------------------------------------------------

/// Serialized table ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
}

/// Swap the trailing extension of `original` for the one of `format`.
/// A name without an extension gets one appended.
pub fn output_file_name(original: &str, format: ExportFormat) -> String {
    let stem = match original.rfind('.') {
        Some(pos) if pos > 0 => &original[..pos],
        _ => original,
    };
    format!("{stem}{}", format.extension())
}

/// Serialize `table` as `format`, naming the result after `original_name`.
pub fn export(table: &Table, original_name: &str, format: ExportFormat) -> Result<Artifact> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(table)?,
        ExportFormat::Excel => to_xlsx(table)?,
    };
    Ok(Artifact {
        bytes,
        file_name: output_file_name(original_name, format),
        mime: format.mime(),
    })
}

/// Header row, then one record per row. Gaps are empty fields.
pub fn to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("writing CSV header")?;
    for (row_no, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(Cell::to_field))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {e}"))
}

/// Single default worksheet: header row, then typed cells. Gaps stay blank.
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col_idx, name) in table.columns.iter().enumerate() {
        let col = u16::try_from(col_idx).context("too many columns for a worksheet")?;
        sheet
            .write_string(0, col, name)
            .with_context(|| format!("writing header {name}"))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(row_idx + 1).context("too many rows for a worksheet")?;
        for (col_idx, cell) in row.iter().enumerate() {
            let c = u16::try_from(col_idx).context("too many columns for a worksheet")?;
            let written = match cell {
                Cell::Text(s) | Cell::Date(s) => sheet.write_string(r, c, s),
                Cell::Integer(i) => sheet.write_number(r, c, *i as f64),
                Cell::Float(v) => sheet.write_number(r, c, *v),
                Cell::Bool(b) => sheet.write_boolean(r, c, *b),
                Cell::Null => continue,
            };
            written.with_context(|| format!("writing cell ({r}, {c})"))?;
        }
    }

    workbook.save_to_buffer().context("saving workbook")
}
