//! Dynamic library loading boundary for command plugins.
//!
//! # Responsibility
//! - Open a plugin library, resolve its entry point and validate the
//!   descriptor it returns.
//! - Wrap the result in `LoadedCommand`, which keeps the library mapped for
//!   as long as the handler may be called.
//!
//! # Invariants
//! - All unsafe foreign calls of the plugin system live in this file and in
//!   `abi::dispatch_handler`.
//! - Every failure path drops the opened library before returning.

use super::abi::{CommandDescriptor, CommandHandler, PluginInitFn, PLUGIN_ENTRY_SYMBOL};
use super::registry::Command;
use super::{PluginError, PluginResult};
use crate::model::TableSlot;
use libloading::Library;
use std::ffi::{c_char, CStr, CString};
use std::path::{Path, PathBuf};

/// Command backed by a loaded plugin library.
pub struct LoadedCommand {
    name: String,
    description: String,
    handler: CommandHandler,
    path: PathBuf,
    // Dropped last: unmaps the code `handler` points into.
    _library: Library,
}

impl LoadedCommand {
    /// Path the library was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LoadedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedCommand")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Command for LoadedCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&self, slot: &mut TableSlot, args: &str) {
        let args = CString::new(args.replace('\0', "")).unwrap_or_default();
        // SAFETY: `handler` was resolved from `_library`, which is still
        // loaded; `slot` is exclusively borrowed for the duration of the call
        // and the handler contract forbids retaining it.
        unsafe { (self.handler)(slot as *mut TableSlot, args.as_ptr()) }
    }
}

/// Opens `path` and turns its exported descriptor into a `LoadedCommand`.
///
/// Name uniqueness and registry capacity are checked by the registry.
///
/// # Errors
/// - `PluginError::Open` when the library cannot be opened.
/// - `PluginError::MissingEntryPoint` when `plugin_init` is not exported.
/// - `PluginError::NullDescriptor` when `plugin_init` returns null.
/// - `PluginError::InvalidDescriptor` when a field is null or not UTF-8.
pub fn open_command_library(path: &Path) -> PluginResult<LoadedCommand> {
    // SAFETY: opening a library runs its initializers; plugin code is
    // trusted by contract.
    let library = unsafe { Library::new(path) }.map_err(|err| PluginError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    // SAFETY: the entry symbol is declared with the `PluginInitFn` signature
    // by the plugin interface.
    let init: PluginInitFn = unsafe { library.get::<PluginInitFn>(PLUGIN_ENTRY_SYMBOL) }
        .map(|symbol| *symbol)
        .map_err(|err| PluginError::MissingEntryPoint {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    // SAFETY: called exactly once, while `library` is loaded.
    let descriptor = unsafe { init() };
    // SAFETY: a non-null descriptor points to a static inside `library`.
    let Some(descriptor) = (unsafe { descriptor.as_ref() }) else {
        return Err(PluginError::NullDescriptor {
            path: path.to_path_buf(),
        });
    };

    let (name, description, handler) = read_descriptor(descriptor).map_err(|reason| {
        PluginError::InvalidDescriptor {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    Ok(LoadedCommand {
        name,
        description,
        handler,
        path: path.to_path_buf(),
        _library: library,
    })
}

fn read_descriptor(
    descriptor: &CommandDescriptor,
) -> Result<(String, String, CommandHandler), &'static str> {
    // SAFETY: descriptor strings are NUL-terminated statics when non-null.
    let name = unsafe { read_c_str(descriptor.name) }.ok_or("name is null or not UTF-8")?;
    let description = unsafe { read_c_str(descriptor.description) }
        .ok_or("description is null or not UTF-8")?;
    let handler = descriptor.handler.ok_or("handler is null")?;
    Ok((name, description, handler))
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .ok()
        .map(str::to_string)
}
