//! Binary interface between the host and command plugin libraries.
//!
//! A plugin library exports one zero-argument function named
//! `PLUGIN_ENTRY_SYMBOL` that returns a pointer to a static
//! `CommandDescriptor`. Host and plugins must be built by the same toolchain
//! against the same `csvtab_core`, because the handler receives a pointer to
//! the host's `TableSlot`.
//!
//! Plugin crates normally use `export_command!` instead of writing the
//! descriptor by hand:
//!
//! ```ignore
//! use csvtab_core::TableSlot;
//! use std::io::Write;
//!
//! fn run(slot: &mut TableSlot, args: &str, out: &mut dyn Write) {
//!     let _ = writeln!(out, "loaded={} args={args}", slot.is_some());
//! }
//!
//! csvtab_core::export_command! {
//!     name: "hello",
//!     description: "prints a greeting",
//!     run: run,
//! }
//! ```

use crate::model::TableSlot;
use std::borrow::Cow;
use std::ffi::{c_char, CStr};
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Exported entry symbol, NUL-terminated for symbol lookup.
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"plugin_init\0";

/// Handler invoked with the active table slot and the raw argument text.
///
/// `args` is a NUL-terminated UTF-8 string, possibly empty, never retained.
pub type CommandHandler = unsafe extern "C" fn(slot: *mut TableSlot, args: *const c_char);

/// Signature of the exported entry point.
pub type PluginInitFn = unsafe extern "C" fn() -> *const CommandDescriptor;

/// Descriptor returned by a plugin entry point.
///
/// Both strings are NUL-terminated and must live as long as the library.
#[repr(C)]
pub struct CommandDescriptor {
    pub name: *const c_char,
    pub description: *const c_char,
    pub handler: Option<CommandHandler>,
}

// Descriptors are immutable statics inside the plugin library.
unsafe impl Sync for CommandDescriptor {}

/// Command body signature used with `export_command!`.
pub type CommandRun = fn(slot: &mut TableSlot, args: &str, out: &mut dyn Write);

/// Adapts a raw handler call to a safe `CommandRun`.
///
/// Output goes to stdout. A panic inside `run` is caught and reported
/// instead of unwinding into the host.
///
/// # Safety
/// `slot` must be null or valid for exclusive access during the call, and
/// `args` must be null or point to a NUL-terminated string.
pub unsafe fn dispatch_handler(slot: *mut TableSlot, args: *const c_char, run: CommandRun) {
    // SAFETY: the caller guarantees `slot` is null or exclusively borrowed.
    let Some(slot) = (unsafe { slot.as_mut() }) else {
        return;
    };
    let args: Cow<'_, str> = if args.is_null() {
        Cow::Borrowed("")
    } else {
        // SAFETY: the caller guarantees a NUL-terminated string.
        unsafe { CStr::from_ptr(args) }.to_string_lossy()
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = catch_unwind(AssertUnwindSafe(|| run(slot, args.trim(), &mut out)));
    if outcome.is_err() {
        let _ = writeln!(out, "Error: command failed unexpectedly.");
    }
    let _ = out.flush();
}

/// Exports a command from a plugin crate built as `cdylib`.
///
/// Generates the static descriptor, the `extern "C"` handler shim and the
/// `plugin_init` entry point.
#[macro_export]
macro_rules! export_command {
    (name: $name:literal, description: $description:literal, run: $run:path $(,)?) => {
        unsafe extern "C" fn __csvtab_command_handler(
            slot: *mut $crate::TableSlot,
            args: *const ::std::ffi::c_char,
        ) {
            // SAFETY: the host passes its exclusively borrowed slot and a
            // NUL-terminated argument string for the duration of this call.
            unsafe { $crate::plugin::abi::dispatch_handler(slot, args, $run) }
        }

        static __CSVTAB_COMMAND_DESCRIPTOR: $crate::plugin::abi::CommandDescriptor =
            $crate::plugin::abi::CommandDescriptor {
                name: concat!($name, "\0").as_ptr().cast::<::std::ffi::c_char>(),
                description: concat!($description, "\0")
                    .as_ptr()
                    .cast::<::std::ffi::c_char>(),
                handler: Some(__csvtab_command_handler),
            };

        #[no_mangle]
        pub extern "C" fn plugin_init() -> *const $crate::plugin::abi::CommandDescriptor {
            &__CSVTAB_COMMAND_DESCRIPTOR
        }
    };
}
