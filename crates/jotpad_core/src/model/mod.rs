//! Domain model for user notes.
//!
//! # Responsibility
//! - Define the canonical note record persisted in the notes slot.
//! - Keep list/detail display derivations next to the record.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
