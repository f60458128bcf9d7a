//! Table operations built on the row/cell store.
//!
//! # Responsibility
//! - Produce new tables from existing ones without touching the source.
//!
//! # Invariants
//! - Results never share cell storage with their source.

pub mod filter;

pub use filter::{filter, ColumnEquals, RowPredicate};
