//! Line-oriented command dispatcher over the active table.
//!
//! # Responsibility
//! - Own the active `TableSlot` and the `CommandRegistry`.
//! - Run built-in commands and hand every other name to the registry.
//! - Report user errors as output lines; nothing here ends the process.
//!
//! # Invariants
//! - Built-in names are reserved in the registry.
//! - A failed `load` keeps the previous table.
//! - Plugins are unloaded only after the table has been released.

pub mod coords;

use crate::model::table::{Table, TableError};
use crate::model::TableSlot;
use crate::ops::{filter, ColumnEquals};
use crate::plugin::{CommandRegistry, PluginError};
use crate::storage::{load_csv, save_csv, StorageError};
use coords::{column_label, parse_column, parse_range};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

/// Host command metadata used by `help` and name reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinCommand {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub const BUILTIN_COMMANDS: &[BuiltinCommand] = &[
    BuiltinCommand {
        name: "help",
        usage: "help",
        description: "lists the available commands",
    },
    BuiltinCommand {
        name: "exit",
        usage: "exit",
        description: "exits the program",
    },
    BuiltinCommand {
        name: "load",
        usage: "load <filename>",
        description: "loads the content of the file <filename> to the table",
    },
    BuiltinCommand {
        name: "save",
        usage: "save <filename>",
        description: "saves the table on the file <filename>",
    },
    BuiltinCommand {
        name: "show",
        usage: "show <col><row>:<col><row>",
        description: "shows the content of the table defined by the given coordinates",
    },
    BuiltinCommand {
        name: "filter",
        usage: "filter <column> <data>",
        description: "keeps only the lines whose <column> content equals <data>",
    },
    BuiltinCommand {
        name: "command",
        usage: "command <libfile>",
        description: "loads a new command plugin from shared object <libfile>",
    },
];

/// What the caller should do after one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellControl {
    Continue,
    Exit,
}

/// User-facing command errors.
#[derive(Debug)]
pub enum ShellError {
    NoTable,
    MissingArgument { usage: &'static str },
    InvalidColumn(String),
    InvalidRange(String),
    OutOfBounds { num_rows: usize, num_cols: usize },
    Storage(StorageError),
    Table(TableError),
    Plugin(PluginError),
    Output(std::io::Error),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTable => write!(f, "No table is currently loaded."),
            Self::MissingArgument { usage } => write!(f, "Usage: {usage}"),
            Self::InvalidColumn(value) => write!(f, "Invalid column '{value}'."),
            Self::InvalidRange(value) => {
                write!(f, "Invalid coordinates '{value}'. Usage: show A1:B5")
            }
            Self::OutOfBounds { num_rows, num_cols } => {
                if *num_cols == 0 {
                    return write!(f, "Coordinates out of bounds (table is empty).");
                }
                write!(
                    f,
                    "Coordinates out of bounds (table spans A1:{}{}).",
                    column_label(num_cols - 1),
                    num_rows
                )
            }
            Self::Storage(err) => write!(f, "{err}"),
            Self::Table(err) => write!(f, "{err}"),
            Self::Plugin(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
        }
    }
}

impl Error for ShellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Table(err) => Some(err),
            Self::Plugin(err) => Some(err),
            Self::Output(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for ShellError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<TableError> for ShellError {
    fn from(value: TableError) -> Self {
        Self::Table(value)
    }
}

impl From<PluginError> for ShellError {
    fn from(value: PluginError) -> Self {
        Self::Plugin(value)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(value: std::io::Error) -> Self {
        Self::Output(value)
    }
}

type ShellResult<T> = Result<T, ShellError>;

/// Interactive host: the active table, the command registry and an output sink.
pub struct Shell<W: Write> {
    slot: TableSlot,
    registry: CommandRegistry,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Creates a shell with room for `max_plugins` plugin commands.
    pub fn new(max_plugins: usize, out: W) -> Self {
        let registry = CommandRegistry::new(max_plugins)
            .with_reserved_names(BUILTIN_COMMANDS.iter().map(|command| command.name));
        Self {
            slot: None,
            registry,
            out,
        }
    }

    pub fn table(&self) -> Option<&Table> {
        self.slot.as_ref()
    }

    pub fn slot_mut(&mut self) -> &mut TableSlot {
        &mut self.slot
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Parses and runs one input line.
    ///
    /// Command failures are written to the output; only output write errors
    /// are returned.
    pub fn execute_line(&mut self, line: &str) -> std::io::Result<ShellControl> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ShellControl::Continue);
        }
        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (line, ""),
        };

        let result = match name {
            "help" => self.help(),
            "exit" => {
                writeln!(self.out, "Exiting program")?;
                return Ok(ShellControl::Exit);
            }
            "load" => self.load(args),
            "save" => self.save(args),
            "show" => self.show(args),
            "filter" => self.filter(args),
            "command" => self.load_command(args),
            other => self.run_plugin(other, args),
        };

        match result {
            Ok(()) => {}
            Err(ShellError::Output(err)) => return Err(err),
            Err(err) => writeln!(self.out, "Error: {err}")?,
        }
        self.out.flush()?;
        Ok(ShellControl::Continue)
    }

    /// Releases the active table, then every plugin library.
    pub fn shutdown(&mut self) -> usize {
        self.slot = None;
        let released = self.registry.unload_all();
        info!(
            "event=shell_shutdown module=shell status=ok plugins_released={}",
            released
        );
        released
    }

    fn help(&mut self) -> ShellResult<()> {
        writeln!(self.out, "List of available commands:")?;
        for command in BUILTIN_COMMANDS {
            writeln!(self.out, "{:<27} - {}", command.usage, command.description)?;
        }
        if !self.registry.is_empty() {
            writeln!(self.out)?;
            writeln!(self.out, "Loaded plugin commands:")?;
            for command in self.registry.iter() {
                writeln!(self.out, "{:<27} - {}", command.name(), command.description())?;
            }
        }
        Ok(())
    }

    fn load(&mut self, path: &str) -> ShellResult<()> {
        if path.is_empty() {
            return Err(ShellError::MissingArgument {
                usage: "load <filename>",
            });
        }
        let report = load_csv(path)?;
        let table = &report.table;
        let outcome = if report.is_complete() {
            "loaded successfully"
        } else {
            "partially loaded"
        };
        writeln!(
            self.out,
            "Table {outcome} ({} rows, {} columns).",
            table.num_rows(),
            table.num_cols()
        )?;
        if report.truncated_records > 0 {
            writeln!(
                self.out,
                "Warning: {} records had more than {} fields; extra fields were discarded.",
                report.truncated_records,
                table.num_cols()
            )?;
        }
        if let Some(err) = &report.parse_error {
            writeln!(
                self.out,
                "Warning: loading stopped early ({err}); only the rows read before it were kept."
            )?;
        }
        self.slot = Some(report.into_table());
        Ok(())
    }

    fn save(&mut self, path: &str) -> ShellResult<()> {
        let table = self.slot.as_ref().ok_or(ShellError::NoTable)?;
        if path.is_empty() {
            return Err(ShellError::MissingArgument {
                usage: "save <filename>",
            });
        }
        save_csv(table, path)?;
        writeln!(self.out, "Table saved to {path}")?;
        Ok(())
    }

    fn show(&mut self, args: &str) -> ShellResult<()> {
        let table = self.slot.as_ref().ok_or(ShellError::NoTable)?;
        if args.is_empty() {
            return Err(ShellError::MissingArgument {
                usage: "show A1:B5",
            });
        }
        let range = parse_range(args).ok_or_else(|| ShellError::InvalidRange(args.to_string()))?;
        if range.last_row >= table.num_rows() || range.last_col >= table.num_cols() {
            return Err(ShellError::OutOfBounds {
                num_rows: table.num_rows(),
                num_cols: table.num_cols(),
            });
        }

        for row in &table.rows()[range.first_row..=range.last_row] {
            let line = (range.first_col..=range.last_col)
                .map(|col| row.text(col).unwrap_or(""))
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn filter(&mut self, args: &str) -> ShellResult<()> {
        let table = self.slot.as_ref().ok_or(ShellError::NoTable)?;
        let usage = || ShellError::MissingArgument {
            usage: "filter <column> <data>",
        };
        let (column, value) = args.split_once(char::is_whitespace).ok_or_else(usage)?;
        let value = value.trim_start();
        if value.is_empty() {
            return Err(usage());
        }
        let col = parse_column(column)
            .filter(|col| *col < table.num_cols())
            .ok_or_else(|| ShellError::InvalidColumn(column.to_string()))?;

        let filtered = filter(table, ColumnEquals::new(col, value))?;
        writeln!(
            self.out,
            "Filter applied. Rows reduced from {} to {}.",
            table.num_rows(),
            filtered.num_rows()
        )?;
        self.slot = Some(filtered);
        Ok(())
    }

    fn load_command(&mut self, path: &str) -> ShellResult<()> {
        if path.is_empty() {
            return Err(ShellError::MissingArgument {
                usage: "command <libfile>",
            });
        }
        let command = self.registry.load_plugin(path)?;
        writeln!(self.out, "Plugin '{}' loaded successfully.", command.name())?;
        Ok(())
    }

    fn run_plugin(&mut self, name: &str, args: &str) -> ShellResult<()> {
        let Some(command) = self.registry.find(name) else {
            writeln!(self.out, "Unknown command: {name}")?;
            return Ok(());
        };
        // Plugin output goes to stdout; keep ours ahead of it.
        self.out.flush()?;
        command.execute(&mut self.slot, args);
        Ok(())
    }
}
