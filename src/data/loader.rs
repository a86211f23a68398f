use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, DataType, Reader, Xlsx, open_workbook_from_rs};
use chrono::NaiveTime;

use super::model::{Cell, Table, is_uniform, promote_integers};

/// Strings read as a missing value, following the Pandas defaults.
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Uploads and errors
// ---------------------------------------------------------------------------

/// A file handed over by the picker or by drag-and-drop.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Why an upload did not make it into the registry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid file type: {0}")]
    UnsupportedType(String),
    #[error("Failed to read {name}: {reason:#}")]
    Parse { name: String, reason: anyhow::Error },
}

/// Lower-cased extension including the dot (`".csv"`), or empty.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[pos..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded file into a [`Table`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma separated, header row first
/// * `.xlsx` – first worksheet, header row first
pub fn load_upload(file: &UploadedFile) -> Result<Table, LoadError> {
    let parsed = match extension_of(&file.name).as_str() {
        ".csv" => load_csv(&file.bytes),
        ".xlsx" => load_xlsx(&file.bytes),
        other => return Err(LoadError::UnsupportedType(other.to_string())),
    };
    parsed.map_err(|reason| LoadError::Parse {
        name: file.name.clone(),
        reason,
    })
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Name blank headers `Unnamed: <i>` and suffix repeats with `.1`, `.2`, …
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };
        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{base}.{count}");
        }
        seen.insert(name.clone(), 0);
        out.push(name);
    }
    out
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Column types are inferred from the whole column; a column that mixes
/// numbers with text keeps its raw text.
fn load_csv(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        bail!("no columns to parse from file");
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let width = headers.len();
    if width == 0 {
        bail!("no columns to parse from file");
    }

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); width];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > width {
            bail!(
                "CSV row {}: expected {width} fields, saw {}",
                row_no + 1,
                record.len()
            );
        }
        for (col_idx, column) in raw_columns.iter_mut().enumerate() {
            column.push(record.get(col_idx).unwrap_or("").to_string());
        }
    }

    let data = raw_columns.iter().map(|raw| infer_column(raw)).collect();
    Ok(Table::from_columns(normalize_headers(headers), data))
}

/// Exact match, no trimming: `" NA "` is text, as in Pandas.
fn is_na(s: &str) -> bool {
    NA_MARKERS.contains(&s)
}

fn guess_cell(s: &str) -> Cell {
    if is_na(s) {
        return Cell::Null;
    }
    let t = s.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        // "NAN", "+nan" and friends parse to NaN; they are gaps, not numbers.
        return if f.is_nan() { Cell::Null } else { Cell::Float(f) };
    }
    match t {
        "true" | "True" | "TRUE" => Cell::Bool(true),
        "false" | "False" | "FALSE" => Cell::Bool(false),
        _ => Cell::Text(s.to_string()),
    }
}

fn infer_column(raw: &[String]) -> Vec<Cell> {
    let mut cells: Vec<Cell> = raw.iter().map(|s| guess_cell(s)).collect();
    if !is_uniform(&cells) {
        return raw
            .iter()
            .map(|s| {
                if is_na(s) {
                    Cell::Null
                } else {
                    Cell::Text(s.clone())
                }
            })
            .collect();
    }
    promote_integers(&mut cells);
    cells
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an `.xlsx` workbook held in memory.
fn load_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes)).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| match c {
            Data::Empty => String::new(),
            other => other.as_string().unwrap_or_else(|| other.to_string()),
        })
        .collect();
    let width = headers.len();

    let mut data: Vec<Vec<Cell>> = vec![Vec::new(); width];
    for row in rows {
        for (col_idx, column) in data.iter_mut().enumerate() {
            column.push(row.get(col_idx).map_or(Cell::Null, excel_cell));
        }
    }

    for column in &mut data {
        if is_uniform(column) {
            promote_integers(column);
        } else {
            for cell in column.iter_mut() {
                if !cell.is_null() && !matches!(cell, Cell::Text(_)) {
                    *cell = Cell::Text(cell.to_field());
                }
            }
        }
    }

    Ok(Table::from_columns(normalize_headers(headers), data))
}

/// Map a spreadsheet cell to a [`Cell`]. Whole-number floats become integers.
fn excel_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            Cell::Integer(*f as i64)
        }
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if is_na(s) => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) if Some(dt.time()) == NaiveTime::from_hms_opt(0, 0, 0) => {
                Cell::Date(dt.date().format("%Y-%m-%d").to_string())
            }
            Some(dt) => Cell::Date(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Cell::Text(cell.to_string()),
        },
        Data::Error(_) | Data::Empty => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}
