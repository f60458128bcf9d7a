//! In-memory table of text cells.
//!
//! # Responsibility
//! - Own every row and every cell of one table.
//! - Grow the row sequence by capacity doubling without losing stored rows.
//! - Provide the structural mutations (append, delete) and deep duplication.
//!
//! # Invariants
//! - `num_cols` is fixed at construction and never changes afterwards.
//! - Every stored row holds exactly `num_cols` cells.
//! - `capacity() >= num_rows()`; capacity starts at `INITIAL_ROW_CAPACITY`
//!   and doubles whenever an append would exceed it.
//! - No cell storage is shared between two tables.

use std::collections::TryReserveError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row capacity reserved by the first append into an empty table.
pub const INITIAL_ROW_CAPACITY: usize = 10;

/// One field of a row: present text (possibly empty) or missing.
///
/// `None` marks a position that was never populated, e.g. the trailing
/// fields of a record shorter than the table width.
pub type Cell = Option<String>;

pub type TableResult<T> = Result<T, TableError>;

/// Structural table errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Memory for a row, a cell or the row sequence could not be reserved.
    Allocation,
    /// Row index is not `< num_rows`.
    RowOutOfRange { index: usize, num_rows: usize },
    /// A row does not have exactly `num_cols` cells.
    ColumnCountMismatch { expected: usize, found: usize },
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocation => write!(f, "out of memory while building table"),
            Self::RowOutOfRange { index, num_rows } => {
                write!(f, "row index {index} out of range (table has {num_rows} rows)")
            }
            Self::ColumnCountMismatch { expected, found } => {
                write!(f, "row has {found} cells, table expects {expected}")
            }
        }
    }
}

impl Error for TableError {}

impl From<TryReserveError> for TableError {
    fn from(_: TryReserveError) -> Self {
        Self::Allocation
    }
}

/// Fixed-length sequence of owned cells.
#[derive(Debug, PartialEq, Eq)]
pub struct Row {
    cells: Box<[Cell]>,
}

impl Row {
    /// Wraps an already-sized cell vector.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells: cells.into_boxed_slice(),
        }
    }

    /// Builds a row of `len` missing cells.
    pub fn missing(len: usize) -> TableResult<Self> {
        missing_cells(len).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns cell text, `None` when the cell is missing or `col` is out of range.
    pub fn text(&self, col: usize) -> Option<&str> {
        self.cells.get(col).and_then(|cell| cell.as_deref())
    }

    /// Iterates cells as borrowed text, keeping the missing marker.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.cells.iter().map(|cell| cell.as_deref())
    }

    /// Deep copy with fresh allocations for every present cell.
    ///
    /// Nothing allocated so far survives a failure: the partial copy is
    /// dropped before the error is returned.
    pub fn try_duplicate(&self) -> TableResult<Self> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(self.cells.len())?;
        for cell in self.cells.iter() {
            cells.push(match cell {
                Some(text) => Some(copy_text(text)?),
                None => None,
            });
        }
        Ok(Self::new(cells))
    }
}

/// Exactly `len` missing cells.
pub(crate) fn missing_cells(len: usize) -> TableResult<Vec<Cell>> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(len)?;
    cells.resize(len, None);
    Ok(cells)
}

/// Copies text into a freshly allocated, exactly-sized string.
pub(crate) fn copy_text(text: &str) -> TableResult<String> {
    let mut owned = String::new();
    owned.try_reserve_exact(text.len())?;
    owned.push_str(text);
    Ok(owned)
}

/// Growable, exclusively owned sequence of rows with a fixed column count.
#[derive(Debug, PartialEq, Eq)]
pub struct Table {
    num_cols: usize,
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table. No row storage is reserved until the first append.
    pub fn new(num_cols: usize) -> Self {
        Self {
            num_cols,
            rows: Vec::new(),
        }
    }

    /// Builds a table from text records; the first record fixes the width.
    ///
    /// # Errors
    /// - `ColumnCountMismatch` when a later record has a different width.
    pub fn from_records<I, R, S>(records: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table: Option<Table> = None;
        for record in records {
            let mut cells = Vec::new();
            for value in record {
                cells.try_reserve(1)?;
                cells.push(Some(copy_text(value.as_ref())?));
            }
            let target = table.get_or_insert_with(|| Table::new(cells.len()));
            target.push_row(Row::new(cells))?;
        }
        Ok(table.unwrap_or_else(|| Table::new(0)))
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Currently reserved row slots.
    pub fn capacity(&self) -> usize {
        self.rows.capacity()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns cell text; `None` for missing cells and out-of-range positions.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.text(col))
    }

    /// Appends one row, doubling row capacity when full.
    ///
    /// # Errors
    /// - `ColumnCountMismatch` when `row.len() != num_cols`; the table is unchanged.
    /// - `Allocation` when the grown row sequence cannot be reserved; stored
    ///   rows are kept.
    pub fn push_row(&mut self, row: Row) -> TableResult<()> {
        if row.len() != self.num_cols {
            return Err(TableError::ColumnCountMismatch {
                expected: self.num_cols,
                found: row.len(),
            });
        }
        if self.rows.len() == self.rows.capacity() {
            let additional = match self.rows.capacity() {
                0 => INITIAL_ROW_CAPACITY,
                current => current,
            };
            self.rows.try_reserve_exact(additional)?;
        }
        self.rows.push(row);
        Ok(())
    }

    /// Removes the row at `index`, shifting later rows one position earlier.
    ///
    /// Capacity is not shrunk.
    ///
    /// # Errors
    /// - `RowOutOfRange` when `index >= num_rows`; the table is unchanged.
    pub fn delete_row(&mut self, index: usize) -> TableResult<Row> {
        if index >= self.rows.len() {
            return Err(TableError::RowOutOfRange {
                index,
                num_rows: self.rows.len(),
            });
        }
        Ok(self.rows.remove(index))
    }

    /// Deep copy of the whole table.
    pub fn try_duplicate(&self) -> TableResult<Self> {
        crate::ops::filter(self, |_: &Row| true)
    }
}
