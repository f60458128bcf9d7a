//! CSV file storage for tables.
//!
//! # Responsibility
//! - Build tables from CSV text (`load`) and write them back (`save`).
//! - Keep tokenizer details behind the `RecordSink` callback boundary.
//!
//! # Invariants
//! - Files are read sequentially and written by whole-file overwrite.
//! - A malformed input never discards completed rows silently: partial loads
//!   carry a `ParseError` in their `LoadReport`.

use crate::model::table::TableError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod load;
mod save;
pub mod tokenizer;

pub use load::{load_csv, load_csv_from_reader, LoadReport, READ_CHUNK_BYTES};
pub use save::{save_csv, write_csv};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    Read(std::io::Error),
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Table(TableError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open `{}`: {source}", path.display())
            }
            Self::Read(err) => write!(f, "read failed: {err}"),
            Self::Write { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Table(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Read(err) => Some(err),
            Self::Table(err) => Some(err),
        }
    }
}

impl From<TableError> for StorageError {
    fn from(value: TableError) -> Self {
        Self::Table(value)
    }
}

/// Malformed CSV input; ingestion stopped at this position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based record number.
    pub record: usize,
    /// 1-based field number within the record.
    pub field: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed CSV at record {}, field {}: {}",
            self.record, self.field, self.message
        )
    }
}

impl Error for ParseError {}
