//! Title/tag filtering over resolved notes.
//!
//! # Invariants
//! - An empty title query matches every title.
//! - Title matching is a case-insensitive substring test.
//! - Every selected tag must be present on the note (AND semantics); an empty
//!   selection matches every note.
//! - Input order is preserved.

use crate::model::note::Note;
use crate::model::tag::TagId;

/// Filter criteria for note list views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub title: String,
    pub tag_ids: Vec<TagId>,
}

impl NoteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, query: impl Into<String>) -> Self {
        self.title = query.into();
        self
    }

    pub fn tag(mut self, tag_id: TagId) -> Self {
        self.tag_ids.push(tag_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.tag_ids.is_empty()
    }

    pub fn matches(&self, note: &Note) -> bool {
        self.matches_title(&note.title) && self.tag_ids.iter().all(|tag_id| note.has_tag(tag_id))
    }

    fn matches_title(&self, title: &str) -> bool {
        self.title.is_empty() || title.to_lowercase().contains(&self.title.to_lowercase())
    }
}

/// Returns the notes matching `filter`, keeping their order.
pub fn filter_notes(notes: &[Note], filter: &NoteFilter) -> Vec<Note> {
    if filter.is_empty() {
        return notes.to_vec();
    }
    notes
        .iter()
        .filter(|note| filter.matches(note))
        .cloned()
        .collect()
}
