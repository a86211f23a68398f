use std::collections::HashSet;

use super::model::{Cell, Table};

// ---------------------------------------------------------------------------
// Duplicate removal
// ---------------------------------------------------------------------------

/// Drop rows equal (across every column) to an earlier row, keeping the
/// first occurrence. Returns how many rows were removed.
pub fn remove_duplicates(table: &mut Table) -> usize {
    let before = table.rows.len();
    let mut seen: HashSet<Vec<Cell>> = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(row.clone()));
    before - table.rows.len()
}

// ---------------------------------------------------------------------------
// Mean imputation
// ---------------------------------------------------------------------------

/// Summary of a [`fill_missing_with_mean`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub cells: usize,
    pub columns: usize,
}

/// Mean of the non-missing values of a numeric column.
pub fn column_mean(table: &Table, idx: usize) -> Option<f64> {
    let (sum, count) = table
        .column(idx)
        .filter_map(Cell::as_f64)
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Replace gaps in every numeric column with that column's mean.
///
/// Means are taken once, before any cell is written. Non-numeric columns
/// keep their gaps.
pub fn fill_missing_with_mean(table: &mut Table) -> FillReport {
    let snapshot: &Table = table;
    let means: Vec<(usize, f64)> = snapshot
        .numeric_columns()
        .into_iter()
        .filter_map(|idx| column_mean(snapshot, idx).map(|m| (idx, m)))
        .collect();

    let mut report = FillReport::default();
    for (idx, mean) in means {
        let mut filled = 0;
        for row in &mut table.rows {
            if row[idx].is_null() {
                row[idx] = Cell::Float(mean);
                filled += 1;
            }
        }
        if filled > 0 {
            // A filled column is a float column, like an imputed Pandas series.
            for row in &mut table.rows {
                if let Cell::Integer(i) = row[idx] {
                    row[idx] = Cell::Float(i as f64);
                }
            }
            report.cells += filled;
            report.columns += 1;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    /// `sales.csv` shape: date, amount, region; 10 rows, 2 duplicates, one gap.
    fn sales() -> Table {
        let rows = vec![
            ("2024-01-01", Cell::Float(100.0), "north"),
            ("2024-01-02", Cell::Float(250.0), "south"),
            ("2024-01-03", Cell::Null, "east"),
            ("2024-01-01", Cell::Float(100.0), "north"),
            ("2024-01-04", Cell::Float(75.5), "west"),
            ("2024-01-05", Cell::Float(300.0), "north"),
            ("2024-01-02", Cell::Float(250.0), "south"),
            ("2024-01-06", Cell::Float(125.0), "east"),
            ("2024-01-07", Cell::Float(90.0), "west"),
            ("2024-01-08", Cell::Float(60.0), "south"),
        ];
        Table::new(
            vec!["date".into(), "amount".into(), "region".into()],
            rows.into_iter()
                .map(|(d, a, r)| vec![text(d), a, text(r)])
                .collect(),
        )
    }

    #[test]
    fn test_remove_duplicates_keeps_first_occurrence() {
        let mut table = sales();
        let removed = remove_duplicates(&mut table);
        assert_eq!(removed, 2);
        assert_eq!(table.len(), 8);
        assert_eq!(table.rows[0][0], text("2024-01-01"));
        assert_eq!(table.rows[3][0], text("2024-01-04"));
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let mut once = sales();
        remove_duplicates(&mut once);
        let mut twice = once.clone();
        assert_eq!(remove_duplicates(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_duplicates_preserves_distinct_rows() {
        let original = sales();
        let mut table = original.clone();
        remove_duplicates(&mut table);
        let before: HashSet<&Vec<Cell>> = original.rows.iter().collect();
        let after: HashSet<&Vec<Cell>> = table.rows.iter().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_rows_differing_only_in_gaps_are_distinct() {
        let mut table = Table::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Cell::Integer(1), Cell::Null],
                vec![Cell::Integer(1), Cell::Integer(2)],
                vec![Cell::Integer(1), Cell::Null],
            ],
        );
        assert_eq!(remove_duplicates(&mut table), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_fill_uses_mean_of_remaining_values() {
        let mut table = sales();
        remove_duplicates(&mut table);
        let expected = (100.0 + 250.0 + 75.5 + 300.0 + 125.0 + 90.0 + 60.0) / 7.0;

        let report = fill_missing_with_mean(&mut table);
        assert_eq!(report, FillReport { cells: 1, columns: 1 });
        assert_eq!(table.rows[2][1], Cell::Float(expected));
        assert!(table.column(1).all(|c| !c.is_null()));
    }

    #[test]
    fn test_fill_leaves_text_gaps() {
        let mut table = Table::new(
            vec!["n".into(), "s".into()],
            vec![
                vec![Cell::Integer(2), Cell::Null],
                vec![Cell::Null, text("x")],
                vec![Cell::Integer(4), Cell::Null],
            ],
        );
        fill_missing_with_mean(&mut table);
        assert_eq!(
            table.column(0).cloned().collect::<Vec<_>>(),
            vec![Cell::Float(2.0), Cell::Float(3.0), Cell::Float(4.0)]
        );
        assert_eq!(table.rows[0][1], Cell::Null);
        assert_eq!(table.rows[2][1], Cell::Null);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut table = sales();
        fill_missing_with_mean(&mut table);
        let snapshot = table.clone();
        assert_eq!(fill_missing_with_mean(&mut table), FillReport::default());
        assert_eq!(table, snapshot);
    }

    #[test]
    fn test_column_mean_ignores_nan() {
        let table = Table::new(
            vec!["x".into()],
            vec![vec![Cell::Float(1.0)], vec![Cell::Float(f64::NAN)], vec![Cell::Float(3.0)]],
        );
        assert_eq!(column_mean(&table, 0), Some(2.0));
    }

    #[test]
    fn test_fill_skips_all_missing_column() {
        let mut table = Table::new(
            vec!["empty".into()],
            vec![vec![Cell::Null], vec![Cell::Null]],
        );
        assert_eq!(fill_missing_with_mean(&mut table).cells, 0);
        assert!(table.column(0).all(Cell::is_null));
    }
}
