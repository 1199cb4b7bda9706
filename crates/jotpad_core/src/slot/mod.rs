//! Key-value slot storage for serialized collections.
//!
//! # Responsibility
//! - Define the single-slot persistence contract used by the note store.
//! - Isolate SQLite details from store orchestration.
//!
//! # Invariants
//! - A write fully replaces the previous slot value.
//! - Reading a never-written slot yields `None`, not an error.

pub mod memory;
pub mod slot_store;
