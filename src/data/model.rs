use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Cell – a single value in a table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common Pandas dtypes.
///
/// Equality and hashing compare floats by bit pattern so whole rows can be
/// used as `HashSet` keys when looking for duplicates.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date/datetime kept as text (spreadsheet date cells only).
    Date(String),
    Null,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        use Cell::*;
        match (self, other) {
            (Text(a), Text(b)) | (Date(a), Date(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Bool(a), Bool(b)) => a == b,
            (Null, Null) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Text(s) | Cell::Date(s) => s.hash(state),
            Cell::Integer(i) => i.hash(state),
            Cell::Float(f) => f.to_bits().hash(state),
            Cell::Bool(b) => b.hash(state),
            Cell::Null => {}
        }
    }
}

/// Display form used by the preview grid.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) | Cell::Date(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v:.4}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

/// Broad type family of a cell, used to decide whether a column is uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Numeric,
    Bool,
    Text,
    Date,
}

impl Cell {
    /// Interpret the cell as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn family(&self) -> Option<Family> {
        match self {
            Cell::Integer(_) | Cell::Float(_) => Some(Family::Numeric),
            Cell::Bool(_) => Some(Family::Bool),
            Cell::Text(_) => Some(Family::Text),
            Cell::Date(_) => Some(Family::Date),
            Cell::Null => None,
        }
    }

    /// Text written to a CSV field. Missing cells are empty, whole floats
    /// keep one decimal and booleans are capitalised, as Pandas writes them.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) | Cell::Date(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                format!("{v:.1}")
            }
            Cell::Float(v) => v.to_string(),
            Cell::Bool(true) => "True".to_string(),
            Cell::Bool(false) => "False".to_string(),
            Cell::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column harmonisation
// ---------------------------------------------------------------------------

/// Whether all non-null cells belong to the same [`Family`].
pub fn is_uniform(cells: &[Cell]) -> bool {
    let mut families = cells.iter().filter_map(Cell::family);
    match families.next() {
        Some(first) => families.all(|f| f == first),
        None => true,
    }
}

/// Promote integers to floats when the column also holds floats or missing
/// values; an integer column cannot represent a gap.
pub fn promote_integers(cells: &mut [Cell]) {
    let has_int = cells.iter().any(|c| matches!(c, Cell::Integer(_)));
    let needs_float = cells
        .iter()
        .any(|c| matches!(c, Cell::Float(_) | Cell::Null));
    if !(has_int && needs_float) {
        return;
    }
    for cell in cells.iter_mut() {
        if let Cell::Integer(i) = *cell {
            *cell = Cell::Float(i as f64);
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded file
// ---------------------------------------------------------------------------

/// Named columns plus row-major cells. Every row is exactly as wide as
/// `columns`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, padding short rows with `Null` and cutting long ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Build a table from column-major cells. All columns must share a length.
    pub fn from_columns(columns: Vec<String>, data: Vec<Vec<Cell>>) -> Self {
        let n_rows = data.first().map_or(0, Vec::len);
        let mut rows: Vec<Vec<Cell>> = (0..n_rows)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();
        for column in data {
            for (row, cell) in rows.iter_mut().zip(column) {
                row.push(cell);
            }
        }
        Table::new(columns, rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The first `n` rows (all of them if the table is shorter).
    pub fn head(&self, n: usize) -> &[Vec<Cell>] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// A column is numeric when it holds at least one number and nothing
    /// but numbers and gaps.
    pub fn is_numeric(&self, idx: usize) -> bool {
        let mut any_number = false;
        for cell in self.column(idx) {
            match cell {
                Cell::Integer(_) | Cell::Float(_) => any_number = true,
                Cell::Null => {}
                _ => return false,
            }
        }
        any_number
    }

    /// Indices of all numeric columns, in column order.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.width()).filter(|&i| self.is_numeric(i)).collect()
    }
}
