//! Order-preserving row filter.

use crate::model::table::{Row, Table, TableResult};
use log::{debug, warn};

/// Test applied to each row by `filter`.
///
/// Comparison state lives in the implementor; closures capture it directly.
pub trait RowPredicate {
    fn matches(&self, row: &Row) -> bool;
}

impl<F> RowPredicate for F
where
    F: Fn(&Row) -> bool,
{
    fn matches(&self, row: &Row) -> bool {
        self(row)
    }
}

/// Keeps rows whose cell at `column` equals `value` exactly.
///
/// Missing cells never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEquals<'a> {
    pub column: usize,
    pub value: &'a str,
}

impl<'a> ColumnEquals<'a> {
    pub fn new(column: usize, value: &'a str) -> Self {
        Self { column, value }
    }
}

impl RowPredicate for ColumnEquals<'_> {
    fn matches(&self, row: &Row) -> bool {
        row.text(self.column) == Some(self.value)
    }
}

/// Returns a new table holding deep copies of the rows matching `predicate`.
///
/// The result keeps the source `num_cols` and source row order. The source
/// is only read.
///
/// # Errors
/// - `TableError::Allocation` when a copy cannot be allocated; every row
///   already copied into the result is released before returning.
pub fn filter<P: RowPredicate>(table: &Table, predicate: P) -> TableResult<Table> {
    let mut result = Table::new(table.num_cols());
    for row in table.rows() {
        if !predicate.matches(row) {
            continue;
        }
        let copy = row.try_duplicate().map_err(|err| {
            warn!("event=table_filter module=ops status=error error={}", err);
            err
        })?;
        result.push_row(copy)?;
    }
    debug!(
        "event=table_filter module=ops status=ok rows_in={} rows_out={}",
        table.num_rows(),
        result.num_rows()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::{filter, ColumnEquals, RowPredicate};
    use crate::model::table::{Row, Table};

    #[test]
    fn column_equals_ignores_missing_cells() {
        let row = Row::new(vec![Some("a".to_string()), None]);
        assert!(ColumnEquals::new(0, "a").matches(&row));
        assert!(!ColumnEquals::new(1, "").matches(&row));
        assert!(!ColumnEquals::new(7, "a").matches(&row));
    }

    #[test]
    fn filter_of_empty_table_keeps_width() {
        let table = Table::new(4);
        let result = filter(&table, |_: &Row| true).expect("filter");
        assert_eq!(result.num_cols(), 4);
        assert!(result.is_empty());
    }

    #[test]
    fn closure_predicates_capture_context() {
        let table = Table::from_records([["1"], ["5"], ["9"]]).expect("records");
        let limit = 4;
        let result = filter(&table, |row: &Row| {
            row.text(0)
                .and_then(|value| value.parse::<i32>().ok())
                .is_some_and(|value| value > limit)
        })
        .expect("filter");
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.cell(0, 0), Some("5"));
    }
}
