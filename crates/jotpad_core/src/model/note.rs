//! Note domain model.
//!
//! # Responsibility
//! - Define the four-field note record and its serialized shape.
//! - Provide patch application and search matching.
//! - Derive list previews (`display_title`, `snippet`).
//!
//! # Invariants
//! - `id` never changes after creation.
//! - `last_edited` is refreshed by every applied patch.
//! - Serialized field names are `id`, `title`, `content`, `lastEdited`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Opaque note identifier, unique within one collection.
pub type NoteId = String;

/// Title assigned to freshly created notes.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";
/// Label shown in place of an empty title.
pub const EMPTY_TITLE_LABEL: &str = "Untitled";

const SNIPPET_MAX_CHARS: usize = 60;
const SNIPPET_ELLIPSIS: &str = "...";

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\n|\r").expect("valid line break regex"));

/// One user-authored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Plain text, newline-delimited.
    pub content: String,
    /// Unix epoch milliseconds of the last save. Sole sort key.
    pub last_edited: i64,
}

/// Partial replacement for a note's editable fields.
///
/// `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    /// Patch replacing both title and content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

impl Note {
    /// Creates a blank note stamped at `now_ms`.
    pub fn new(id: impl Into<NoteId>, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            last_edited: now_ms,
        }
    }

    /// Applies `patch` and stamps `last_edited = now_ms`.
    ///
    /// Titles are stored trimmed; content is stored verbatim.
    pub fn apply_patch(&mut self, patch: &NotePatch, now_ms: i64) {
        if let Some(title) = patch.title.as_deref() {
            self.title = title.trim().to_string();
        }
        if let Some(content) = patch.content.as_deref() {
            self.content = content.to_string();
        }
        self.last_edited = now_ms;
    }

    /// Returns whether title or content contains `needle_lower`.
    ///
    /// `needle_lower` must already be lowercased; an empty needle matches.
    pub fn matches_lowercase(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }

    /// Title for list/detail headers.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            EMPTY_TITLE_LABEL
        } else {
            self.title.as_str()
        }
    }

    /// Single-line preview of the content for list rows.
    ///
    /// Line breaks become spaces, the first 60 chars are kept and trimmed, and
    /// `...` is appended when the content is longer than that.
    pub fn snippet(&self) -> String {
        let flattened = LINE_BREAK_RE.replace_all(&self.content, " ");
        let head = flattened.chars().take(SNIPPET_MAX_CHARS).collect::<String>();
        let mut snippet = head.trim().to_string();
        if self.content.chars().count() > SNIPPET_MAX_CHARS {
            snippet.push_str(SNIPPET_ELLIPSIS);
        }
        snippet
    }
}
