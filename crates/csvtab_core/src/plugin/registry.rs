//! Command registry for plugin-provided table commands.

use super::loader::open_command_library;
use super::{PluginError, PluginResult};
use crate::model::TableSlot;
use log::{error, info};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

/// Registry capacity used when none is configured.
pub const DEFAULT_MAX_PLUGINS: usize = 20;

/// Capability exposed by one registered command.
///
/// `execute` receives the host's active table slot for the duration of one
/// call; it may read the table, replace it or clear it, and must not keep the
/// reference. Its only other effect is human-readable output.
///
/// Commands loaded from a library write that output to the process stdout,
/// not to the writer a `Shell` was built with, so it cannot be captured
/// there; the shell flushes its own writer first to keep lines in order.
pub trait Command {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn execute(&self, slot: &mut TableSlot, args: &str);
}

/// Load-ordered set of commands addressable by name.
///
/// Dropping the registry (or calling `unload_all`) releases every plugin
/// library; no handler may run afterwards.
pub struct CommandRegistry {
    entries: Vec<Box<dyn Command>>,
    max_entries: usize,
    reserved_names: BTreeSet<String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PLUGINS)
    }
}

impl CommandRegistry {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
            reserved_names: BTreeSet::new(),
        }
    }

    /// Reserves host command names so no plugin can register them.
    pub fn with_reserved_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Loads one plugin library and registers its command.
    ///
    /// The registry is unchanged on every error; a library opened during a
    /// rejected call is released before returning.
    ///
    /// # Errors
    /// - `RegistryFull` before anything is opened when at capacity.
    /// - Any loader error (`Open`, `MissingEntryPoint`, `NullDescriptor`,
    ///   `InvalidDescriptor`).
    /// - `InvalidName` / `ReservedName` / `DuplicateName` from registration.
    pub fn load_plugin(&mut self, path: impl AsRef<Path>) -> PluginResult<&dyn Command> {
        let path = path.as_ref();
        let started_at = Instant::now();
        info!("event=plugin_load module=plugin status=start");

        let loaded = self
            .ensure_capacity()
            .and_then(|()| open_command_library(path));
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(
                    "event=plugin_load module=plugin status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=plugin_load module=plugin status=ok name={} path={} duration_ms={}",
            loaded.name(),
            loaded.path().display(),
            started_at.elapsed().as_millis()
        );
        self.register(Box::new(loaded))
    }

    /// Registers an already constructed command.
    ///
    /// # Errors
    /// - `RegistryFull` when at capacity.
    /// - `InvalidName` when the name is empty or contains whitespace.
    /// - `ReservedName` when the name belongs to a host command.
    /// - `DuplicateName` when a command with that name is registered.
    pub fn register(&mut self, command: Box<dyn Command>) -> PluginResult<&dyn Command> {
        let outcome = self
            .ensure_capacity()
            .and_then(|()| self.validate_name(command.name()));
        if let Err(err) = outcome {
            error!(
                "event=command_register module=plugin status=error error_code={} error={}",
                err.code(),
                err
            );
            return Err(err);
        }

        info!(
            "event=command_register module=plugin status=ok name={} registered={}",
            command.name(),
            self.entries.len() + 1
        );
        let index = self.entries.len();
        self.entries.push(command);
        Ok(self.entries[index].as_ref())
    }

    /// Finds a command by exact name.
    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        self.entries
            .iter()
            .find(|command| command.name() == name)
            .map(|command| command.as_ref())
    }

    /// Runs the named command against `slot`.
    ///
    /// # Errors
    /// - `NotFound` when no command has that name.
    pub fn invoke(&self, name: &str, slot: &mut TableSlot, args: &str) -> PluginResult<()> {
        let command = self
            .find(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        command.execute(slot, args);
        Ok(())
    }

    /// Commands in load order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.entries.iter().map(|command| command.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.contains(name)
    }

    /// Drops every registered command, releasing plugin libraries.
    ///
    /// Returns how many commands were released.
    pub fn unload_all(&mut self) -> usize {
        let released = self.entries.len();
        // Later loads are released first.
        while self.entries.pop().is_some() {}
        info!(
            "event=plugin_unload module=plugin status=ok released={}",
            released
        );
        released
    }

    fn ensure_capacity(&self) -> PluginResult<()> {
        if self.entries.len() >= self.max_entries {
            return Err(PluginError::RegistryFull {
                max: self.max_entries,
            });
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> PluginResult<()> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(PluginError::InvalidName(name.to_string()));
        }
        if self.reserved_names.contains(name) {
            return Err(PluginError::ReservedName(name.to_string()));
        }
        if self.find(name).is_some() {
            return Err(PluginError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}
