//! Core of csvtab: an in-memory CSV table store with pluggable commands.
//! Plugin libraries link against this crate for the table model and the
//! `export_command!` macro.

pub mod config;
pub mod logging;
pub mod model;
pub mod ops;
pub mod plugin;
pub mod shell;
pub mod storage;

pub use config::{ConfigError, ShellConfig};
pub use logging::{
    default_log_level, flush_logging, init_logging, logging_status, LoggingError,
};
pub use model::table::{Cell, Row, Table, TableError, TableResult};
pub use model::TableSlot;
pub use ops::{filter, ColumnEquals, RowPredicate};
pub use plugin::{Command, CommandRegistry, PluginError, PluginResult};
pub use shell::{Shell, ShellControl, ShellError};
pub use storage::{
    load_csv, load_csv_from_reader, save_csv, write_csv, LoadReport, ParseError, StorageError,
    StorageResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
