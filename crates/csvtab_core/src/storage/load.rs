//! CSV ingestion into a `Table`.
//!
//! # Responsibility
//! - Read CSV input sequentially in fixed-size chunks through `PushParser`.
//! - Build rows from `on_cell` / `on_record_end` callbacks.
//! - Surface partial loads explicitly through `LoadReport`.
//!
//! # Invariants
//! - The first record fixes `num_cols`; while it is read the pending row
//!   grows by exactly one slot per cell.
//! - Later rows are allocated at `num_cols` cells, all missing, so short
//!   records leave explicit missing cells.
//! - Cells beyond `num_cols` are discarded and counted, never written.
//! - An invalid UTF-8 field stops ingestion; completed rows are kept and the
//!   record in progress is dropped.

use super::tokenizer::{PushParser, RecordSink};
use super::{ParseError, StorageError, StorageResult};
use crate::model::table::{copy_text, missing_cells, Cell, Row, Table, TableError};
use log::{error, info, warn};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::Instant;

/// Bytes handed to the tokenizer per read.
pub const READ_CHUNK_BYTES: usize = 1024;

/// Outcome of a load that produced a table.
#[derive(Debug)]
pub struct LoadReport {
    /// Every row completed before input ended or ingestion stopped.
    pub table: Table,
    /// Set when ingestion stopped early; `table` then holds a partial result.
    pub parse_error: Option<ParseError>,
    /// Records that had more cells than `num_cols` and were truncated.
    pub truncated_records: usize,
}

impl LoadReport {
    /// Returns whether the whole input was ingested.
    pub fn is_complete(&self) -> bool {
        self.parse_error.is_none()
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

/// Loads a CSV file into a new table.
///
/// # Errors
/// - `StorageError::Open` when the file cannot be opened; no table is built.
/// - `StorageError::Read` when reading fails mid-stream.
/// - `StorageError::Table(TableError::Allocation)` when memory runs out;
///   everything allocated for the table is released first.
///
/// A malformed field is not an error here: see `LoadReport::parse_error`.
pub fn load_csv(path: impl AsRef<Path>) -> StorageResult<LoadReport> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=table_load module=storage status=start");

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            error!(
                "event=table_load module=storage status=error error_code=open_failed error={}",
                err
            );
            return Err(StorageError::Open {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };

    let result = load_csv_from_reader(file);
    match &result {
        Ok(report) => {
            let status = if report.is_complete() { "ok" } else { "partial" };
            info!(
                "event=table_load module=storage status={} rows={} cols={} truncated_records={} duration_ms={}",
                status,
                report.table.num_rows(),
                report.table.num_cols(),
                report.truncated_records,
                started_at.elapsed().as_millis()
            );
        }
        Err(err) => {
            error!(
                "event=table_load module=storage status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
        }
    }
    result
}

/// Loads CSV from any byte source, reading `READ_CHUNK_BYTES` at a time.
pub fn load_csv_from_reader<R: Read>(mut reader: R) -> StorageResult<LoadReport> {
    let mut parser = PushParser::new();
    let mut builder = TableBuilder::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    let fed = loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break parser.finish(&mut builder),
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(StorageError::Read(err)),
        };
        if let Err(err) = parser.feed(&chunk[..read], &mut builder) {
            break Err(err);
        }
    };

    let parse_error = match fed {
        Ok(()) => None,
        Err(IngestError::Parse(err)) => {
            warn!(
                "event=table_load module=storage status=partial record={} field={} error_code=parse_failed",
                err.record, err.field
            );
            Some(err)
        }
        Err(IngestError::Table(err)) => return Err(StorageError::Table(err)),
    };

    let truncated_records = builder.truncated_records;
    Ok(LoadReport {
        table: builder.into_table(),
        parse_error,
        truncated_records,
    })
}

#[derive(Debug)]
enum IngestError {
    Parse(ParseError),
    Table(TableError),
}

impl From<TableError> for IngestError {
    fn from(value: TableError) -> Self {
        Self::Table(value)
    }
}

/// Callback state turning tokenizer events into table rows.
struct TableBuilder {
    table: Option<Table>,
    pending: Vec<Cell>,
    cursor: usize,
    overflowed: bool,
    records_done: usize,
    truncated_records: usize,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            table: None,
            pending: Vec::new(),
            cursor: 0,
            overflowed: false,
            records_done: 0,
            truncated_records: 0,
        }
    }

    /// 1-based number of the record currently being read.
    fn record_number(&self) -> usize {
        self.records_done + 1
    }

    fn into_table(self) -> Table {
        self.table.unwrap_or_else(|| Table::new(0))
    }
}

impl RecordSink for TableBuilder {
    type Error = IngestError;

    fn on_cell(&mut self, bytes: &[u8]) -> Result<(), IngestError> {
        let text = std::str::from_utf8(bytes).map_err(|err| {
            IngestError::Parse(ParseError {
                record: self.record_number(),
                field: self.cursor + 1,
                message: err.to_string(),
            })
        })?;

        match &self.table {
            None => {
                self.pending.try_reserve_exact(1).map_err(TableError::from)?;
                self.pending.push(Some(copy_text(text)?));
            }
            Some(table) if self.cursor < table.num_cols() => {
                self.pending[self.cursor] = Some(copy_text(text)?);
            }
            Some(_) => self.overflowed = true,
        }
        self.cursor += 1;
        Ok(())
    }

    fn on_record_end(&mut self) -> Result<(), IngestError> {
        let num_cols = match &self.table {
            Some(table) => table.num_cols(),
            None => self.cursor,
        };
        let table = self.table.get_or_insert_with(|| Table::new(num_cols));

        if self.overflowed {
            self.truncated_records += 1;
            warn!(
                "event=table_load module=storage status=truncated record={} cells={} cols={}",
                self.records_done + 1,
                self.cursor,
                num_cols
            );
        }

        let completed = std::mem::replace(&mut self.pending, missing_cells(num_cols)?);
        table.push_row(Row::new(completed))?;

        self.records_done += 1;
        self.cursor = 0;
        self.overflowed = false;
        Ok(())
    }
}
