//! Table data model.
//!
//! # Responsibility
//! - Define the row/cell representation shared by ingestion, serialization,
//!   table operations and plugin handlers.
//!
//! # Invariants
//! - Every cell is text or missing; there are no typed columns.
//! - The host owns the active table through one `TableSlot`.

pub mod table;

use table::Table;

/// The single slot holding the active table; empty when nothing is loaded.
///
/// Handlers borrow it mutably for the duration of one call and may read it,
/// replace it or clear it.
pub type TableSlot = Option<Table>;
