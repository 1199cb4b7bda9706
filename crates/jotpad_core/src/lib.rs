//! Core domain logic for Jotpad.
//! This crate is the single owner of the note collection and its rules.

pub mod clock;
pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod session;
pub mod slot;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{decode_collection, encode_collection, CodecError, DecodedCollection};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::note::{Note, NoteId, NotePatch, DEFAULT_NOTE_TITLE};
pub use session::{NotesSession, SessionError, Shortcut, TITLE_MAX_CHARS};
pub use slot::memory::MemorySlotStore;
pub use slot::slot_store::{SlotError, SlotResult, SlotStore, SqliteSlotStore};
pub use store::note_store::{
    load_collection, persist_collection, NoteStore, StoreConfig, StoreError, StoreResult,
    DEFAULT_SLOT_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
