//! Runtime-loaded table commands.
//!
//! # Responsibility
//! - Define the binary contract plugin libraries export (`abi`).
//! - Isolate dynamic loading and descriptor validation (`loader`).
//! - Keep loaded commands addressable by name (`registry`).
//!
//! # Invariants
//! - A failed or rejected load leaves the registry exactly as before.
//! - A plugin library stays loaded while its command is registered.
//! - Command names are unique across plugins and reserved host names.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod abi;
pub mod loader;
pub mod registry;

pub use loader::{open_command_library, LoadedCommand};
pub use registry::{Command, CommandRegistry, DEFAULT_MAX_PLUGINS};

pub type PluginResult<T> = Result<T, PluginError>;

/// Plugin loading, registration and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    RegistryFull { max: usize },
    Open { path: PathBuf, message: String },
    MissingEntryPoint { path: PathBuf, message: String },
    NullDescriptor { path: PathBuf },
    InvalidDescriptor { path: PathBuf, reason: &'static str },
    InvalidName(String),
    ReservedName(String),
    DuplicateName(String),
    NotFound(String),
}

impl PluginError {
    /// Stable error code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RegistryFull { .. } => "registry_full",
            Self::Open { .. } => "open_failed",
            Self::MissingEntryPoint { .. } => "missing_entry_point",
            Self::NullDescriptor { .. } => "null_descriptor",
            Self::InvalidDescriptor { .. } => "invalid_descriptor",
            Self::InvalidName(_) => "invalid_name",
            Self::ReservedName(_) => "reserved_name",
            Self::DuplicateName(_) => "duplicate_name",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl Display for PluginError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegistryFull { max } => {
                write!(f, "maximum number of plugins reached ({max})")
            }
            Self::Open { path, message } => {
                write!(f, "cannot load plugin `{}`: {message}", path.display())
            }
            Self::MissingEntryPoint { path, message } => write!(
                f,
                "plugin `{}` does not export plugin_init: {message}",
                path.display()
            ),
            Self::NullDescriptor { path } => {
                write!(f, "plugin_init of `{}` returned null", path.display())
            }
            Self::InvalidDescriptor { path, reason } => {
                write!(f, "plugin `{}` has an invalid descriptor: {reason}", path.display())
            }
            Self::InvalidName(name) => write!(f, "command name is invalid: `{name}`"),
            Self::ReservedName(name) => write!(f, "command name is reserved: {name}"),
            Self::DuplicateName(name) => write!(f, "plugin '{name}' already loaded"),
            Self::NotFound(name) => write!(f, "unknown command: {name}"),
        }
    }
}

impl Error for PluginError {}
