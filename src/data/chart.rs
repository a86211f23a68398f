use super::model::Table;

/// One bar series: a numeric column, one optional value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Collect every numeric column of `table` as a bar series. Rows are the
/// categories; gaps become `None` and draw no bar.
pub fn bar_series(table: &Table) -> Vec<BarSeries> {
    table
        .numeric_columns()
        .into_iter()
        .map(|idx| BarSeries {
            name: table.columns[idx].clone(),
            values: table.column(idx).map(|c| c.as_f64()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Cell;

    #[test]
    fn test_only_numeric_columns_become_series() {
        let table = Table::new(
            vec!["region".into(), "amount".into(), "units".into()],
            vec![
                vec![Cell::Text("n".into()), Cell::Float(1.5), Cell::Integer(3)],
                vec![Cell::Text("s".into()), Cell::Null, Cell::Integer(4)],
            ],
        );
        let series = bar_series(&table);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "amount");
        assert_eq!(series[0].values, vec![Some(1.5), None]);
        assert_eq!(series[1].values, vec![Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_no_numeric_columns_is_empty() {
        let table = Table::new(
            vec!["region".into()],
            vec![vec![Cell::Text("n".into())]],
        );
        assert!(bar_series(&table).is_empty());
    }
}
