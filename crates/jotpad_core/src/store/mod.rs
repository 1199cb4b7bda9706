//! Note collection ownership.
//!
//! # Responsibility
//! - Own the in-memory collection and every mutation applied to it.
//! - Keep UI/FFI layers decoupled from slot and codec details.

pub mod note_store;
