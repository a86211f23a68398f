use super::model::Table;

// ---------------------------------------------------------------------------
// Column selection: which columns survive into the chart and the export
// ---------------------------------------------------------------------------

/// Ordered list of chosen column names.
pub type ColumnSelection = Vec<String>;

/// Initialise a [`ColumnSelection`] with every column, in table order.
pub fn init_selection(table: &Table) -> ColumnSelection {
    table.columns.clone()
}

/// Remove `column` from the selection, or append it if absent.
pub fn toggle(selection: &mut ColumnSelection, column: &str) {
    if let Some(pos) = selection.iter().position(|c| c == column) {
        selection.remove(pos);
    } else {
        selection.push(column.to_string());
    }
}

/// Build a table holding only the selected columns, in selection order.
///
/// Names that are not (or no longer) columns of `table` are skipped, as are
/// repeats. Rows and their order are unchanged.
pub fn project(table: &Table, selection: &[String]) -> Table {
    let mut indices: Vec<usize> = Vec::with_capacity(selection.len());
    for name in selection {
        if let Some(idx) = table.column_index(name) {
            if !indices.contains(&idx) {
                indices.push(idx);
            }
        }
    }

    let columns = indices.iter().map(|&i| table.columns[i].clone()).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Table { columns, rows }
}
