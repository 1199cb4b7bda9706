//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note store operations to Dart via FRB as flat functions.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each call loads, mutates and persists under one process-wide lock, so
//!   no mutation is applied to a stale collection.

use jotpad_core::db::open_db;
use jotpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NotePatch, NoteStore, SqliteSlotStore,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const NOTES_DB_FILE_NAME: &str = "jotpad_notes.sqlite3";
const NOTES_DB_PATH_ENV: &str = "JOTPAD_DB_PATH";
static NOTES_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the notes database path for this process.
///
/// Must run before the first notes call to take effect. Calling again with
/// the same path is a no-op; a different path is rejected.
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_notes_db_path(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = NOTES_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "notes db path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Note projection for list and detail views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    /// Title to render; `Untitled` when `title` is empty.
    pub display_title: String,
    pub content: String,
    /// One-line list preview of `content`.
    pub snippet: String,
    /// Epoch milliseconds of the last save.
    pub last_edited: i64,
}

/// Response envelope for list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesQueryResponse {
    pub ok: bool,
    /// Matching notes, most recently edited first.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Response envelope for single-note lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteGetResponse {
    pub ok: bool,
    /// `None` when no note has the requested id.
    pub note: Option<NoteItem>,
    pub message: String,
}

/// Response envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Id of the created/affected note.
    pub note_id: Option<String>,
    /// Whether the target note existed (false for no-op update/delete).
    pub applied: bool,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: String, applied: bool) -> Self {
        Self {
            ok: true,
            note_id: Some(note_id),
            applied,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            applied: false,
            message: message.into(),
        }
    }
}

/// Creates a blank note and returns its id.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_create() -> NoteActionResponse {
    match with_note_store(|store| store.create().map_err(|err| err.to_string())) {
        Ok(note_id) => NoteActionResponse::success("Note created.", note_id, true),
        Err(err) => NoteActionResponse::failure(format!("notes_create failed: {err}")),
    }
}

/// Saves title and/or content into an existing note.
///
/// Unknown ids are not an error; the response reports `applied = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_update(
    note_id: String,
    title: Option<String>,
    content: Option<String>,
) -> NoteActionResponse {
    let patch = NotePatch { title, content };
    match with_note_store(|store| {
        store
            .update(note_id.as_str(), &patch)
            .map_err(|err| err.to_string())
    }) {
        Ok(true) => NoteActionResponse::success("Note saved.", note_id, true),
        Ok(false) => NoteActionResponse::success("Note not found.", note_id, false),
        Err(err) => NoteActionResponse::failure(format!("notes_update failed: {err}")),
    }
}

/// Deletes a note permanently.
///
/// Unknown ids are not an error; the response reports `applied = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: String) -> NoteActionResponse {
    match with_note_store(|store| store.delete(note_id.as_str()).map_err(|err| err.to_string())) {
        Ok(true) => NoteActionResponse::success("Note deleted.", note_id, true),
        Ok(false) => NoteActionResponse::success("Note not found.", note_id, false),
        Err(err) => NoteActionResponse::failure(format!("notes_delete failed: {err}")),
    }
}

/// Lists notes matching `search` (case-insensitive), newest edit first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_query(search: String) -> NotesQueryResponse {
    let result = with_note_store(|store| {
        Ok(store
            .query(search.as_str())
            .into_iter()
            .map(to_note_item)
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No notes found.".to_string()
            } else {
                format!("Found {} note(s).", items.len())
            };
            NotesQueryResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => NotesQueryResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_query failed: {err}"),
        },
    }
}

/// Looks up the selected note by id.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_get(note_id: String) -> NoteGetResponse {
    match with_note_store(|store| Ok(store.get(note_id.as_str()).map(to_note_item))) {
        Ok(Some(note)) => NoteGetResponse {
            ok: true,
            note: Some(note),
            message: "Note found.".to_string(),
        },
        Ok(None) => NoteGetResponse {
            ok: true,
            note: None,
            message: "Note not found.".to_string(),
        },
        Err(err) => NoteGetResponse {
            ok: false,
            note: None,
            message: format!("notes_get failed: {err}"),
        },
    }
}

fn resolve_notes_db_path() -> PathBuf {
    NOTES_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(NOTES_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(NOTES_DB_FILE_NAME)
        })
        .clone()
}

fn with_note_store<T>(
    f: impl FnOnce(&mut NoteStore<SqliteSlotStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    // The slot is only ever replaced whole; a poisoned lock is safe to reuse.
    let _guard = STORE_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=ffi_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    });
    let db_path = resolve_notes_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("notes DB open failed: {err}"))?;
    let slot =
        SqliteSlotStore::try_new(&conn).map_err(|err| format!("notes slot init failed: {err}"))?;
    let mut store = NoteStore::open(slot);
    f(&mut store)
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.clone(),
        title: note.title.clone(),
        display_title: note.display_title().to_string(),
        content: note.content.clone(),
        snippet: note.snippet(),
        last_edited: note.last_edited,
    }
}
