//! CSV serialization of a `Table`.
//!
//! # Invariants
//! - A cell is quoted iff it contains `,`, `"`, CR or LF; quotes inside a
//!   quoted cell are doubled.
//! - Missing cells render as empty text.
//! - An empty cell of a one-column table is written as `""`, otherwise the
//!   line would read back as a blank line.
//! - Every row ends with a single `\n`; there is no header row.

use super::{StorageError, StorageResult};
use crate::model::table::{Row, Table};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Writes the table to `path`, replacing any existing file.
///
/// # Errors
/// - `StorageError::Write` when the file cannot be created or written.
pub fn save_csv(table: &Table, path: impl AsRef<Path>) -> StorageResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=table_save module=storage status=start");

    let written = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_csv(table, &mut writer)?;
        writer.flush()
    });

    match written {
        Ok(()) => {
            info!(
                "event=table_save module=storage status=ok rows={} cols={} duration_ms={}",
                table.num_rows(),
                table.num_cols(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=table_save module=storage status=error duration_ms={} error_code=write_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(StorageError::Write {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}

/// Renders the table as CSV into any writer.
pub fn write_csv<W: Write>(table: &Table, writer: &mut W) -> std::io::Result<()> {
    let single_column = table.num_cols() == 1;
    for row in table.rows() {
        write_row(row, single_column, writer)?;
    }
    Ok(())
}

fn write_row<W: Write>(row: &Row, single_column: bool, writer: &mut W) -> std::io::Result<()> {
    for (col, cell) in row.iter().enumerate() {
        if col > 0 {
            writer.write_all(b",")?;
        }
        let text = cell.unwrap_or("");
        if needs_quotes(text) || (single_column && text.is_empty()) {
            write_quoted(text, writer)?;
        } else {
            writer.write_all(text.as_bytes())?;
        }
    }
    writer.write_all(b"\n")
}

fn needs_quotes(text: &str) -> bool {
    text.bytes().any(|b| matches!(b, b',' | b'"' | b'\r' | b'\n'))
}

fn write_quoted<W: Write>(text: &str, writer: &mut W) -> std::io::Result<()> {
    writer.write_all(b"\"")?;
    writer.write_all(text.replace('"', "\"\"").as_bytes())?;
    writer.write_all(b"\"")
}
