//! Store configuration.
//!
//! # Invariants
//! - Notes and tags live under two independent, fixed keys.
//! - The welcome note is seeded only when the persisted note list is empty at
//!   load time.

use crate::model::note::{NoteId, RawNote, RawNoteData};

/// Default key holding the persisted `RawNote` array.
pub const DEFAULT_NOTES_KEY: &str = "NOTES";
/// Default key holding the persisted `Tag` array.
pub const DEFAULT_TAGS_KEY: &str = "TAGS";

pub const WELCOME_NOTE_ID: &str = "welcome-note";
pub const WELCOME_NOTE_TITLE: &str = "Welcome!";
pub const WELCOME_NOTE_MARKDOWN: &str = "This is your first note.";

/// Key layout and bootstrap policy for `NoteStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub notes_key: String,
    pub tags_key: String,
    /// Seed the welcome note when no notes are persisted.
    pub seed_welcome_note: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            notes_key: DEFAULT_NOTES_KEY.to_string(),
            tags_key: DEFAULT_TAGS_KEY.to_string(),
            seed_welcome_note: true,
        }
    }
}

impl StoreConfig {
    /// Uses `prefix` for both keys, e.g. `alice:NOTES` / `alice:TAGS`.
    pub fn with_key_prefix(prefix: &str) -> Self {
        Self {
            notes_key: format!("{prefix}:{DEFAULT_NOTES_KEY}"),
            tags_key: format!("{prefix}:{DEFAULT_TAGS_KEY}"),
            ..Self::default()
        }
    }
}

/// Builds the note seeded into an empty store.
pub fn welcome_note() -> RawNote {
    let mut data = RawNoteData::new(WELCOME_NOTE_TITLE, WELCOME_NOTE_MARKDOWN);
    data.sessions = Some(Vec::new());
    RawNote::with_id(NoteId::new(WELCOME_NOTE_ID), data)
}
