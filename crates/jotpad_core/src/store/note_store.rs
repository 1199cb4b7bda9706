//! Note store: the single owner of the note collection.
//!
//! # Responsibility
//! - Load the collection once from its slot and persist it after each mutation.
//! - Provide create/update/delete/get/query use-cases.
//!
//! # Invariants
//! - No two notes share an id.
//! - Every successful mutation rewrites the whole slot.
//! - Operations on unknown ids are silent no-ops and do not persist.
//! - Query results are ordered by `last_edited DESC` using a stable sort.
//! - Logs carry ids and counts only, never note text.

use crate::clock::{Clock, SystemClock};
use crate::codec::{decode_collection, encode_collection, CodecError};
use crate::model::note::{Note, NoteId, NotePatch};
use crate::slot::slot_store::{SlotError, SlotStore};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key the collection lives under unless configured otherwise.
pub const DEFAULT_SLOT_KEY: &str = "notes";
const NOTE_ID_PREFIX: &str = "note_";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to persist the collection after a mutation.
///
/// The in-memory mutation stays applied; the slot keeps its previous value.
#[derive(Debug)]
pub enum StoreError {
    Encode(CodecError),
    Slot(SlotError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Slot(err) => write!(f, "failed to persist notes: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Slot(err) => Some(err),
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Encode(value)
    }
}

impl From<SlotError> for StoreError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Slot key holding the serialized collection.
    pub slot_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

/// Reads the persisted collection from `key`.
///
/// Missing, unreadable or malformed data yields an empty collection; the
/// cause is logged and never returned.
pub fn load_collection<S: SlotStore + ?Sized>(slot: &S, key: &str) -> Vec<Note> {
    let raw = match slot.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("event=notes_load module=store status=empty reason=missing_slot");
            return Vec::new();
        }
        Err(err) => {
            warn!("event=notes_load module=store status=empty reason=slot_read_failed error={err}");
            return Vec::new();
        }
    };

    match decode_collection(&raw) {
        Ok(decoded) => {
            if decoded.duplicates_dropped > 0 {
                warn!(
                    "event=notes_load module=store status=degraded duplicates_dropped={}",
                    decoded.duplicates_dropped
                );
            }
            info!(
                "event=notes_load module=store status=ok schema_version={} count={}",
                decoded.schema_version,
                decoded.notes.len()
            );
            decoded.notes
        }
        Err(err) => {
            warn!("event=notes_load module=store status=empty reason=decode_failed error={err}");
            Vec::new()
        }
    }
}

/// Encodes `notes` and overwrites the slot at `key`.
pub fn persist_collection<S: SlotStore + ?Sized>(
    slot: &mut S,
    key: &str,
    notes: &[Note],
) -> StoreResult<()> {
    let encoded = encode_collection(notes)?;
    slot.write(key, &encoded)?;
    debug!(
        "event=notes_persist module=store status=ok count={} bytes={}",
        notes.len(),
        encoded.len()
    );
    Ok(())
}

/// Owner of the note collection, generic over slot storage and time source.
pub struct NoteStore<S: SlotStore, C: Clock = SystemClock> {
    slot: S,
    clock: C,
    config: StoreConfig,
    notes: Vec<Note>,
}

impl<S: SlotStore> NoteStore<S, SystemClock> {
    /// Opens the store on the default slot key with wall-clock time.
    pub fn open(slot: S) -> Self {
        Self::open_with(slot, SystemClock, StoreConfig::default())
    }
}

impl<S: SlotStore, C: Clock> NoteStore<S, C> {
    /// Opens the store and loads the persisted collection once.
    pub fn open_with(slot: S, clock: C, config: StoreConfig) -> Self {
        let notes = load_collection(&slot, &config.slot_key);
        Self {
            slot,
            clock,
            config,
            notes,
        }
    }

    /// Creates a blank note at the head of the collection and returns its id.
    ///
    /// Ids are `note_<millis>`; a `_<n>` suffix disambiguates notes created
    /// within the same millisecond.
    pub fn create(&mut self) -> StoreResult<NoteId> {
        let now = self.clock.now_ms();
        let id = self.next_note_id(now);
        self.notes.insert(0, Note::new(id.clone(), now));
        info!(
            "event=note_create module=store status=ok note_id={id} count={}",
            self.notes.len()
        );
        self.persist()?;
        Ok(id)
    }

    /// Applies `patch` to the note with `id` and refreshes its timestamp.
    ///
    /// Returns `Ok(false)` without persisting when no such note exists.
    pub fn update(&mut self, id: &str, patch: &NotePatch) -> StoreResult<bool> {
        let now = self.clock.now_ms();
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_update module=store status=skipped reason=not_found note_id={id}");
            return Ok(false);
        };
        note.apply_patch(patch, now);
        info!("event=note_update module=store status=ok note_id={id} last_edited={now}");
        self.persist()?;
        Ok(true)
    }

    /// Removes the note with `id`.
    ///
    /// Returns `Ok(false)` without persisting when no such note exists.
    pub fn delete(&mut self, id: &str) -> StoreResult<bool> {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            debug!("event=note_delete module=store status=skipped reason=not_found note_id={id}");
            return Ok(false);
        }
        info!(
            "event=note_delete module=store status=ok note_id={id} count={}",
            self.notes.len()
        );
        self.persist()?;
        Ok(true)
    }

    /// Notes whose title or content contains `search_term`, ignoring case,
    /// most recently edited first. An empty term matches every note.
    pub fn query(&self, search_term: &str) -> Vec<&Note> {
        let needle = search_term.to_lowercase();
        let mut hits = self
            .notes
            .iter()
            .filter(|note| note.matches_lowercase(&needle))
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| b.last_edited.cmp(&a.last_edited));
        hits
    }

    /// Looks up one note by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All notes in storage order (newest creation first).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Consumes the store and hands back its slot storage.
    pub fn into_slot(self) -> S {
        self.slot
    }

    fn persist(&mut self) -> StoreResult<()> {
        persist_collection(&mut self.slot, &self.config.slot_key, &self.notes).map_err(|err| {
            warn!("event=notes_persist module=store status=error error={err}");
            err
        })
    }

    fn next_note_id(&self, now_ms: i64) -> NoteId {
        let base = format!("{NOTE_ID_PREFIX}{now_ms}");
        if !self.contains(&base) {
            return base;
        }
        let mut suffix: u64 = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.contains(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
