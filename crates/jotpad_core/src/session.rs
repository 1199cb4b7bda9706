//! Presentation-layer state driving a [`NoteStore`].
//!
//! # Responsibility
//! - Hold selection, search term and edit-mode flag outside the store.
//! - Map UI stimuli (new note, save, exit edit) onto store operations.
//! - Enforce UI-level title rules before saving.
//!
//! # Invariants
//! - The store is passed into every call; the session never owns it.
//! - Deleting the selected note moves selection to the first remaining note.
//! - Title rules apply here only; the store accepts any title.

use crate::clock::Clock;
use crate::model::note::{Note, NoteId, NotePatch};
use crate::slot::slot_store::SlotStore;
use crate::store::note_store::{NoteStore, StoreError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum title length accepted by the editor, in characters.
pub const TITLE_MAX_CHARS: usize = 128;

#[derive(Debug)]
pub enum SessionError {
    /// Title is empty after trimming.
    EmptyTitle,
    TitleTooLong { max: usize, actual: usize },
    /// An edit was requested without a selected note.
    NoSelection,
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::TitleTooLong { max, actual } => {
                write!(f, "note title has {actual} characters; at most {max} allowed")
            }
            Self::NoSelection => write!(f, "no note is selected"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// User-triggered shortcuts the host UI forwards to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortcut {
    /// Global: create a note and start editing it.
    NewNote,
    /// Global: leave edit mode without saving.
    ExitEdit,
    /// Editor: save the current edit.
    Save { title: String, content: String },
}

/// Selection, search and edit-mode state for one UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesSession {
    selected: Option<NoteId>,
    search: String,
    editing: bool,
}

impl NotesSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Creates a note, selects it and enters edit mode.
    ///
    /// A failed persist still leaves the new note in the store, so it is
    /// selected before the error is returned.
    pub fn new_note<S: SlotStore, C: Clock>(
        &mut self,
        store: &mut NoteStore<S, C>,
    ) -> Result<NoteId, SessionError> {
        let len_before = store.len();
        match store.create() {
            Ok(id) => {
                self.selected = Some(id.clone());
                self.editing = true;
                Ok(id)
            }
            Err(err) => {
                if store.len() > len_before {
                    if let Some(head) = store.notes().first() {
                        self.selected = Some(head.id.clone());
                        self.editing = true;
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Selects a note for viewing and leaves edit mode.
    pub fn select(&mut self, id: impl Into<NoteId>) {
        self.selected = Some(id.into());
        self.editing = false;
    }

    /// Enters edit mode for the selected note.
    pub fn edit(&mut self) -> Result<(), SessionError> {
        if self.selected.is_none() {
            return Err(SessionError::NoSelection);
        }
        self.editing = true;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
    }

    /// Saves title/content into the selected note and leaves edit mode.
    ///
    /// On a validation error the session stays in edit mode.
    pub fn save<S: SlotStore, C: Clock>(
        &mut self,
        store: &mut NoteStore<S, C>,
        title: &str,
        content: &str,
    ) -> Result<(), SessionError> {
        let Some(id) = self.selected.clone() else {
            return Err(SessionError::NoSelection);
        };
        let title = validate_title(title)?;
        let applied = store.update(&id, &NotePatch::new(title, content))?;
        if !applied {
            debug!("event=session_save module=session status=skipped reason=not_found note_id={id}");
        }
        self.editing = false;
        Ok(())
    }

    /// Deletes a note; reselects the first remaining note when it was selected.
    ///
    /// The selection follows the store even when persisting the delete fails.
    pub fn delete<S: SlotStore, C: Clock>(
        &mut self,
        store: &mut NoteStore<S, C>,
        id: &str,
    ) -> Result<(), SessionError> {
        let result = store.delete(id);
        if self.selected.as_deref() == Some(id) && !store.contains(id) {
            self.selected = store.notes().first().map(|note| note.id.clone());
            self.editing = false;
        }
        result?;
        Ok(())
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Notes matching the current search, most recently edited first.
    pub fn visible_notes<'s, S: SlotStore, C: Clock>(
        &self,
        store: &'s NoteStore<S, C>,
    ) -> Vec<&'s Note> {
        store.query(&self.search)
    }

    /// The selected note, if it still exists.
    pub fn selected_note<'s, S: SlotStore, C: Clock>(
        &self,
        store: &'s NoteStore<S, C>,
    ) -> Option<&'s Note> {
        self.selected.as_deref().and_then(|id| store.get(id))
    }

    /// Dispatches one UI shortcut.
    pub fn handle_shortcut<S: SlotStore, C: Clock>(
        &mut self,
        store: &mut NoteStore<S, C>,
        shortcut: Shortcut,
    ) -> Result<(), SessionError> {
        match shortcut {
            Shortcut::NewNote => self.new_note(store).map(|_| ()),
            Shortcut::ExitEdit => {
                self.cancel_edit();
                Ok(())
            }
            Shortcut::Save { title, content } => self.save(store, &title, &content),
        }
    }
}

/// Trims `title` and checks the editor's title rules.
pub fn validate_title(title: &str) -> Result<&str, SessionError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(SessionError::EmptyTitle);
    }
    let actual = trimmed.chars().count();
    if actual > TITLE_MAX_CHARS {
        return Err(SessionError::TitleTooLong {
            max: TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{validate_title, SessionError, TITLE_MAX_CHARS};

    #[test]
    fn validate_title_trims_and_bounds_length() {
        assert_eq!(validate_title("  Plan  ").unwrap(), "Plan");
        assert!(matches!(validate_title(" \t"), Err(SessionError::EmptyTitle)));

        let long = "t".repeat(TITLE_MAX_CHARS + 1);
        assert!(matches!(
            validate_title(&long),
            Err(SessionError::TitleTooLong { actual, .. }) if actual == TITLE_MAX_CHARS + 1
        ));
        assert!(validate_title(&"t".repeat(TITLE_MAX_CHARS)).is_ok());
    }
}
